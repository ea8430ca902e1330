mod trait_store;
pub mod types;

pub use trait_store::{RunStore, StoreError};
pub use types::{Domain, NewRun, RunFilter, RunRecord};
