use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse definition as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A node id referenced by the graph does not resolve to a node, or a node
/// was reached twice within one run. Discovered lazily during traversal, not
/// at submission time; nodes executed before the bad reference keep their
/// side effects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("entry point node not found: {0}")]
    EntryPointNotFound(String),
    #[error("next node not found: {0}")]
    NextNotFound(String),
    #[error("node already executed in this run: {0}")]
    AlreadyExecuted(String),
}

/// A node's configuration was rejected by its executor before any external
/// call was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
