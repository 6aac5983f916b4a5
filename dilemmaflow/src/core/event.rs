//! Pipeline event type emitted on every controller transition.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An event emitted by the stage controller.
///
/// Events are consumed by event sinks for logging, monitoring, or audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    /// The event type (e.g., "stage.generated", "stage.approved").
    #[serde(rename = "type")]
    pub event_type: String,

    /// When the event occurred (ISO 8601).
    pub timestamp: String,

    /// The event payload data.
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl PipelineEvent {
    /// Creates a new pipeline event.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: crate::utils::iso_timestamp(),
            data: HashMap::new(),
        }
    }

    /// Adds a data field to the event.
    #[must_use]
    pub fn add_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Returns the data as a JSON object.
    #[must_use]
    pub fn data_value(&self) -> serde_json::Value {
        serde_json::Value::Object(self.data.clone().into_iter().collect())
    }

    /// Creates an "input.submitted" event.
    #[must_use]
    pub fn input_submitted(stage_name: &str, input_chars: usize) -> Self {
        Self::new("input.submitted")
            .add_data("stage", serde_json::json!(stage_name))
            .add_data("input_chars", serde_json::json!(input_chars))
    }

    /// Creates a "stage.generated" event.
    #[must_use]
    pub fn generated(stage_name: &str, duration_ms: f64, prompt_chars: usize) -> Self {
        Self::new("stage.generated")
            .add_data("stage", serde_json::json!(stage_name))
            .add_data("duration_ms", serde_json::json!(duration_ms))
            .add_data("prompt_chars", serde_json::json!(prompt_chars))
    }

    /// Creates a "stage.generation_failed" event.
    #[must_use]
    pub fn generation_failed(stage_name: &str, error: &str) -> Self {
        Self::new("stage.generation_failed")
            .add_data("stage", serde_json::json!(stage_name))
            .add_data("error", serde_json::json!(error))
    }

    /// Creates a "stage.refined" event.
    #[must_use]
    pub fn refined(stage_name: &str, feedback: &str, succeeded: bool) -> Self {
        Self::new("stage.refined")
            .add_data("stage", serde_json::json!(stage_name))
            .add_data("feedback", serde_json::json!(feedback))
            .add_data("succeeded", serde_json::json!(succeeded))
    }

    /// Creates a "stage.approved" event.
    #[must_use]
    pub fn approved(stage_name: &str, next_stage: Option<&str>) -> Self {
        Self::new("stage.approved")
            .add_data("stage", serde_json::json!(stage_name))
            .add_data("next_stage", serde_json::json!(next_stage))
    }

    /// Creates a "pipeline.completed" event.
    #[must_use]
    pub fn completed(stage_count: usize) -> Self {
        Self::new("pipeline.completed").add_data("stages", serde_json::json!(stage_count))
    }

    /// Creates a "branch.selected" event.
    #[must_use]
    pub fn branch_selected(source_stage: &str, label: &str) -> Self {
        Self::new("branch.selected")
            .add_data("source_stage", serde_json::json!(source_stage))
            .add_data("label", serde_json::json!(label))
    }

    /// Creates a "branch.cleared" event.
    #[must_use]
    pub fn branch_cleared() -> Self {
        Self::new("branch.cleared")
    }
}
