//! Execution events consumed by the viewer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event type tags emitted by the execution engine.
///
/// The set is open-ended: tags not listed here still flow through the
/// viewer and are shown with the default renderer.
pub mod types {
    pub const RUN_STARTED: &str = "run_started";
    pub const RUN_FINISHED: &str = "run_finished";
    pub const RUN_ERROR: &str = "run_error";
    pub const STEP_STARTED: &str = "step_started";
    pub const STEP_FINISHED: &str = "step_finished";
    pub const NODE_STATUS_CHANGED: &str = "node_status_changed";
    pub const LLM_CALL_STARTED: &str = "llm_call_started";
    pub const LLM_CALL_COMPLETED: &str = "llm_call_completed";
    pub const TOOL_INVOKED: &str = "tool_invoked";
    pub const TOOL_RETURNED: &str = "tool_returned";
    pub const NODE_CREATED: &str = "node_created";
    pub const PLAN_RECEIVED: &str = "plan_received";
    pub const NODE_ADDED: &str = "node_added";
    pub const EDGE_ADDED: &str = "edge_added";
    pub const INNER_GRAPH_BUILT: &str = "inner_graph_built";
    pub const NODE_RESULT_AVAILABLE: &str = "node_result_available";
}

/// A single execution event.
///
/// Events are created by the producer and never modified afterwards; the
/// viewer only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "event_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(alias = "type")]
    pub event_type: String,
    #[serde(default)]
    pub run_id: String,
    #[serde(default)]
    pub payload: Value,
}

impl Event {
    pub fn new(
        id: impl Into<String>,
        timestamp: impl Into<String>,
        event_type: impl Into<String>,
        run_id: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp: timestamp.into(),
            event_type: event_type.into(),
            run_id: run_id.into(),
            payload,
        }
    }

    /// Short wall-clock form of the timestamp for list rows.
    ///
    /// RFC 3339 timestamps are shown as local `HH:MM:SS`; anything else is
    /// returned unchanged.
    pub fn display_time(&self) -> String {
        match chrono::DateTime::parse_from_rfc3339(&self.timestamp) {
            Ok(ts) => ts
                .with_timezone(&chrono::Local)
                .format("%H:%M:%S")
                .to_string(),
            Err(_) => self.timestamp.clone(),
        }
    }
}
