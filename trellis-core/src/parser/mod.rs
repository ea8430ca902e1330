use crate::error::ParseError;
use crate::types::Definition;

/// Parse a definition from JSON text.
///
/// Validation here is structural only: the input must be a well-formed
/// definition shape. Whether referenced node ids exist is checked lazily
/// during traversal, and node config is checked by the executor registered
/// for the node's type. This keeps node types extensible without a central
/// config schema.
pub fn parse_definition_str(input: &str) -> Result<Definition, ParseError> {
    Ok(serde_json::from_str::<Definition>(input)?)
}
