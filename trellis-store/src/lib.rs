#![forbid(unsafe_code)]

pub mod postgres;
pub mod store;

pub use crate::postgres::run_migrations;
pub use crate::postgres::PostgresRunStore;
pub use crate::store::{Domain, NewRun, RunFilter, RunRecord, RunStore, StoreError};
