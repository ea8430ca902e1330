use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

/// One typed step in a definition graph. `config` is opaque here; only the
/// executor registered for `node_type` knows its shape.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Node {
    pub id: String,

    #[serde(rename = "type")]
    pub node_type: String,

    #[serde(default)]
    pub config: JsonValue,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next: Vec<String>,
}

/// A user-defined step graph: nodes keyed by id, plus named entry points.
/// Immutable once a run starts; stored as a snapshot alongside the run
/// record and never mutated in place.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Definition {
    pub name: String,

    pub version: String,

    #[serde(default)]
    pub nodes: BTreeMap<String, Node>,

    #[serde(default)]
    #[serde(rename = "entryPoints")]
    pub entry_points: Vec<String>,
}
