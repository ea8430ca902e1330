use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use trellis_core::{Definition, DefinitionError, Node, NodeResult, ValidationError};
use trellis_engine::executor::{ExecutionError, NodeExecutor};
use trellis_engine::orchestrator::{Orchestrator, RunError};
use trellis_engine::registry::ExecutorRegistry;
use trellis_engine::runtime::{ActivityDispatcher, ActivityOptions, RunContext, RuntimeError};

// Dispatcher that is never exercised: the test executor does no activity calls.
struct NoopDispatcher;

#[async_trait]
impl ActivityDispatcher for NoopDispatcher {
    async fn execute_activity(
        &self,
        _name: &str,
        _input: JsonValue,
        _options: &ActivityOptions,
    ) -> Result<JsonValue, RuntimeError> {
        Ok(JsonValue::Null)
    }
}

// Records the order nodes execute in; nodes carry their id in config.
struct RecordingExecutor {
    executed: Arc<Mutex<Vec<String>>>,
    fail_ids: Vec<String>,
}

#[async_trait]
impl NodeExecutor for RecordingExecutor {
    async fn execute(
        &self,
        _ctx: &RunContext,
        config: &JsonValue,
    ) -> Result<NodeResult, ExecutionError> {
        let tag = config["tag"].as_str().unwrap_or_default().to_string();
        self.executed.lock().unwrap().push(tag.clone());
        if self.fail_ids.contains(&tag) {
            return Ok(NodeResult::failure("boom"));
        }
        Ok(NodeResult {
            success: true,
            data: None,
            error: None,
        })
    }

    fn validate_config(&self, _config: &JsonValue) -> Result<(), ValidationError> {
        Ok(())
    }
}

fn node(id: &str, next: &[&str]) -> Node {
    Node {
        id: id.to_string(),
        node_type: "test".to_string(),
        config: json!({"tag": id}),
        next: next.iter().map(|s| s.to_string()).collect(),
    }
}

fn definition(nodes: Vec<Node>, entry_points: &[&str]) -> Definition {
    Definition {
        name: "graph".to_string(),
        version: "1".to_string(),
        nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
        entry_points: entry_points.iter().map(|s| s.to_string()).collect(),
    }
}

fn harness(fail_ids: &[&str]) -> (Orchestrator, Arc<Mutex<Vec<String>>>, RunContext) {
    let executed = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ExecutorRegistry::new();
    registry.register(
        "test",
        Arc::new(RecordingExecutor {
            executed: executed.clone(),
            fail_ids: fail_ids.iter().map(|s| s.to_string()).collect(),
        }),
    );
    let orchestrator = Orchestrator::new(Arc::new(registry));
    let ctx = RunContext::new("run-1", Arc::new(NoopDispatcher));
    (orchestrator, executed, ctx)
}

#[tokio::test]
async fn executes_entry_then_immediate_next_in_order() {
    let (orchestrator, executed, ctx) = harness(&[]);
    let def = definition(
        vec![node("a", &["b", "c"]), node("b", &[]), node("c", &[])],
        &["a"],
    );

    orchestrator.execute(&ctx, &def).await.unwrap();
    assert_eq!(*executed.lock().unwrap(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn traversal_stops_one_hop_past_entry() {
    // a -> b -> c: only the entry node and its immediate next run.
    let (orchestrator, executed, ctx) = harness(&[]);
    let def = definition(
        vec![node("a", &["b"]), node("b", &["c"]), node("c", &[])],
        &["a"],
    );

    orchestrator.execute(&ctx, &def).await.unwrap();
    assert_eq!(*executed.lock().unwrap(), vec!["a", "b"]);
}

#[tokio::test]
async fn entry_points_processed_sequentially() {
    let (orchestrator, executed, ctx) = harness(&[]);
    let def = definition(
        vec![node("a", &["b"]), node("b", &[]), node("x", &[])],
        &["a", "x"],
    );

    orchestrator.execute(&ctx, &def).await.unwrap();
    assert_eq!(*executed.lock().unwrap(), vec!["a", "b", "x"]);
}

#[tokio::test]
async fn missing_entry_point_aborts_before_anything_runs() {
    let (orchestrator, executed, ctx) = harness(&[]);
    let def = definition(vec![node("a", &[])], &["ghost"]);

    let err = orchestrator.execute(&ctx, &def).await.unwrap_err();
    assert!(matches!(
        err,
        RunError::Definition(DefinitionError::EntryPointNotFound(ref id)) if id == "ghost"
    ));
    assert!(executed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn dangling_next_reference_aborts_after_entry_ran() {
    // The missing reference is discovered lazily; the entry node's side
    // effects stand.
    let (orchestrator, executed, ctx) = harness(&[]);
    let def = definition(vec![node("a", &["ghost"])], &["a"]);

    let err = orchestrator.execute(&ctx, &def).await.unwrap_err();
    assert!(matches!(
        err,
        RunError::Definition(DefinitionError::NextNotFound(ref id)) if id == "ghost"
    ));
    assert_eq!(*executed.lock().unwrap(), vec!["a"]);
}

#[tokio::test]
async fn unsupported_node_type_fails_the_run() {
    let (orchestrator, _executed, ctx) = harness(&[]);
    let mut def = definition(vec![node("a", &[])], &["a"]);
    def.nodes.get_mut("a").unwrap().node_type = "docker".to_string();

    let err = orchestrator.execute(&ctx, &def).await.unwrap_err();
    assert!(matches!(err, RunError::UnsupportedNodeType(ref t) if t == "docker"));
}

#[tokio::test]
async fn first_failing_node_aborts_the_run() {
    let (orchestrator, executed, ctx) = harness(&["a"]);
    let def = definition(vec![node("a", &["b"]), node("b", &[])], &["a"]);

    let err = orchestrator.execute(&ctx, &def).await.unwrap_err();
    match err {
        RunError::NodeFailed { node_id, message } => {
            assert_eq!(node_id, "a");
            assert_eq!(message, "boom");
        }
        other => panic!("expected NodeFailed, got {other:?}"),
    }
    // b never ran.
    assert_eq!(*executed.lock().unwrap(), vec!["a"]);
}

#[tokio::test]
async fn node_reached_twice_fails_instead_of_re_executing() {
    // Self edge.
    let (orchestrator, executed, ctx) = harness(&[]);
    let def = definition(vec![node("a", &["a"])], &["a"]);

    let err = orchestrator.execute(&ctx, &def).await.unwrap_err();
    assert!(matches!(
        err,
        RunError::Definition(DefinitionError::AlreadyExecuted(ref id)) if id == "a"
    ));
    assert_eq!(*executed.lock().unwrap(), vec!["a"]);

    // Same node listed as two entry points.
    let (orchestrator, executed, ctx) = harness(&[]);
    let def = definition(vec![node("a", &[])], &["a", "a"]);
    let err = orchestrator.execute(&ctx, &def).await.unwrap_err();
    assert!(matches!(
        err,
        RunError::Definition(DefinitionError::AlreadyExecuted(_))
    ));
    assert_eq!(*executed.lock().unwrap(), vec!["a"]);
}
