//! Error types for the dilemmaflow pipeline.
//!
//! Every failure in the core resolves to either a rejected operation (state
//! unchanged) or a degraded-but-consistent state. Nothing here is meant to
//! terminate the process.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for dilemmaflow operations.
#[derive(Debug, Error)]
pub enum DilemmaflowError {
    /// User input or a catalog definition violated a precondition.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The operation is not valid in the controller's current phase.
    #[error("{0}")]
    Transition(#[from] TransitionError),

    /// The generation backend failed.
    #[error("{0}")]
    Generation(#[from] GenerationError),

    /// Report export failed.
    #[error("{0}")]
    Export(#[from] ExportError),

    /// A stage response did not carry the expected structured payload.
    #[error("{0}")]
    StructuredOutput(#[from] StructuredOutputError),

    /// Configuration could not be loaded.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DilemmaflowError {
    /// Returns true if the error rejected an operation without touching state.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Transition(_))
    }
}

/// Metadata about an error for presentation-layer diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Error code (e.g., "INPUT-EMPTY").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::json!(self.code));
        map.insert("summary".to_string(), serde_json::json!(self.summary));

        if let Some(ref hint) = self.fix_hint {
            map.insert("fix_hint".to_string(), serde_json::json!(hint));
        }
        if !self.context.is_empty() {
            map.insert("context".to_string(), serde_json::json!(self.context));
        }

        map
    }
}

/// Error raised when user input or a definition violates a precondition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// The error message.
    pub message: String,
    /// The offending field, if any.
    pub field: Option<String>,
    /// Structured error info.
    pub error_info: Option<ErrorInfo>,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
            error_info: None,
        }
    }

    /// Sets the offending field.
    #[must_use]
    pub fn for_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Sets the error info.
    #[must_use]
    pub fn with_error_info(mut self, info: ErrorInfo) -> Self {
        self.error_info = Some(info);
        self
    }

    /// Returns the error code, if one was attached.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.error_info.as_ref().map(|info| info.code.as_str())
    }

    /// The story text was empty or whitespace-only.
    #[must_use]
    pub fn empty_input() -> Self {
        Self::new("Please enter the story before continuing.")
            .for_field("story")
            .with_error_info(
                ErrorInfo::new("INPUT-EMPTY", "Story input is empty")
                    .with_fix_hint("Provide the full story or context as non-blank text."),
            )
    }

    /// The refinement feedback was empty or whitespace-only.
    #[must_use]
    pub fn empty_feedback(stage: &str) -> Self {
        Self::new("Please enter feedback before refining.")
            .for_field("feedback")
            .with_error_info(
                ErrorInfo::new("FEEDBACK-EMPTY", "Refinement feedback is empty")
                    .with_context_entry("stage", stage),
            )
    }

    /// The named stage is not part of the catalog.
    #[must_use]
    pub fn unknown_stage(stage: &str) -> Self {
        Self::new(format!("Unknown stage '{stage}'"))
            .for_field("stage")
            .with_error_info(
                ErrorInfo::new("STAGE-UNKNOWN", "Stage is not in the catalog")
                    .with_context_entry("stage", stage),
            )
    }

    /// The named stage is not the one under the cursor.
    #[must_use]
    pub fn stage_not_current(stage: &str, current: &str) -> Self {
        Self::new(format!(
            "Stage '{stage}' is not the current stage '{current}'"
        ))
        .for_field("stage")
        .with_error_info(
            ErrorInfo::new("STAGE-NOT-CURRENT", "Only the current stage accepts decisions")
                .with_context_entry("stage", stage)
                .with_context_entry("current", current),
        )
    }

    /// The stage does not offer selectable options.
    #[must_use]
    pub fn not_branchable(stage: &str) -> Self {
        Self::new(format!("Stage '{stage}' does not offer selectable options"))
            .for_field("source_stage")
            .with_error_info(
                ErrorInfo::new("BRANCH-NOT-BRANCHABLE", "Selections can only come from branchable stages")
                    .with_context_entry("stage", stage),
            )
    }

    /// The selection's source stage has not produced output yet.
    #[must_use]
    pub fn branch_source_pending(stage: &str) -> Self {
        Self::new(format!("Stage '{stage}' has no output to select from yet"))
            .for_field("source_stage")
            .with_error_info(
                ErrorInfo::new("BRANCH-SOURCE-PENDING", "Selection source has no record")
                    .with_context_entry("stage", stage)
                    .with_fix_hint("Generate the stage before selecting one of its options."),
            )
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!("ValidationError"));
        map.insert("message".to_string(), serde_json::json!(self.message));
        if let Some(ref field) = self.field {
            map.insert("field".to_string(), serde_json::json!(field));
        }
        if let Some(ref info) = self.error_info {
            let info_map: serde_json::Map<String, serde_json::Value> =
                info.to_dict().into_iter().collect();
            map.insert("error_info".to_string(), serde_json::Value::Object(info_map));
        }
        map
    }
}

/// Error raised when an operation is not valid in the current phase.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The operation does not apply to the current phase.
    #[error("Cannot {operation} while {phase}")]
    InvalidPhase {
        /// The rejected operation.
        operation: String,
        /// The phase the controller was in.
        phase: String,
    },

    /// The pipeline has already completed.
    #[error("Cannot {operation}: all stages are completed")]
    Finished {
        /// The rejected operation.
        operation: String,
    },
}

impl TransitionError {
    /// Creates an invalid phase error.
    #[must_use]
    pub fn invalid_phase(operation: impl Into<String>, phase: impl ToString) -> Self {
        Self::InvalidPhase {
            operation: operation.into(),
            phase: phase.to_string(),
        }
    }

    /// Creates a finished error.
    #[must_use]
    pub fn finished(operation: impl Into<String>) -> Self {
        Self::Finished {
            operation: operation.into(),
        }
    }
}

/// Errors produced by a generation backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The backend answered but carried no usable text.
    #[error("Backend returned no usable text")]
    EmptyResponse,

    /// The request could not be sent or completed.
    #[error("Backend request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("Backend returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The backend response could not be decoded.
    #[error("Backend response could not be decoded: {0}")]
    Decode(String),
}

/// Errors raised while exporting a report.
#[derive(Debug, Error)]
pub enum ExportError {
    /// There are no records to export.
    #[error("Nothing to export: the stage log is empty")]
    EmptyLog,

    /// Writing the report failed.
    #[error("Error saving file {}: {source}", path.display())]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The report could not be serialized.
    #[error("Report serialization failed: {0}")]
    Serialization(String),
}

/// Errors raised by the structured payload decode step.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StructuredOutputError {
    /// No JSON object was found in the text.
    #[error("No JSON object found in model output")]
    NoJsonFound,

    /// A JSON-looking block failed to parse.
    #[error("Could not parse JSON: {0}")]
    InvalidJson(String),

    /// The expected top-level key is absent.
    #[error("Expected key '{key}' not found in model output")]
    MissingKey {
        /// The key that was expected.
        key: String,
    },
}

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("Missing required environment variable {name}")]
    MissingEnv {
        /// Variable name.
        name: String,
    },

    /// A configuration value could not be interpreted.
    #[error("Invalid value for {key}: {reason}")]
    Invalid {
        /// The configuration key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },
}
