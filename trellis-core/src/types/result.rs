use serde_json::{Map, Value as JsonValue};

/// The outcome an executor reports for one node.
///
/// `success: false` is a *logical* failure: the executor completed but
/// judged the result unacceptable. Infrastructure failures are reported
/// through the executor's error return instead, which keeps them subject to
/// the runtime's retry policy.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, JsonValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NodeResult {
    pub fn success(data: Map<String, JsonValue>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
