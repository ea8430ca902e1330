#![forbid(unsafe_code)]

pub mod error;
pub mod parser;
pub mod types;

pub use crate::error::{DefinitionError, ParseError, ValidationError};
pub use crate::parser::parse_definition_str;
pub use crate::types::{Definition, Node, NodeResult, RunStatus};
