//! Stage records: one prompt/response/feedback triple per stage.

use serde::{Deserialize, Serialize};

/// Response stored for the input stage; it is never backend-generated.
pub const STORY_ACKNOWLEDGEMENT: &str = "✅ Story saved successfully.";

/// Response stored when initial generation yields no usable text.
pub const GENERATION_ERROR_MARKER: &str = "Error: No valid response.";

/// Response stored when a refinement yields no usable text.
pub const REFINEMENT_ERROR_MARKER: &str = "Error: No refined response.";

/// One entry of the pipeline's append-only log.
///
/// Records are only ever mutated in place by refinement; the stage name and
/// prompt are fixed once the record is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    stage_name: String,
    prompt: String,
    response: String,
    #[serde(default)]
    feedback: String,
}

impl StageRecord {
    /// Creates a record with empty feedback.
    #[must_use]
    pub fn new(
        stage_name: impl Into<String>,
        prompt: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            prompt: prompt.into(),
            response: response.into(),
            feedback: String::new(),
        }
    }

    /// The stage this record belongs to.
    #[must_use]
    pub fn stage_name(&self) -> &str {
        &self.stage_name
    }

    /// The exact text sent to the backend, or the raw user input.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The current response.
    #[must_use]
    pub fn response(&self) -> &str {
        &self.response
    }

    /// The last refinement instruction applied, empty if none.
    #[must_use]
    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    /// Returns true if a refinement has been applied.
    #[must_use]
    pub fn has_feedback(&self) -> bool {
        !self.feedback.is_empty()
    }

    /// Returns true if the response is one of the error markers.
    #[must_use]
    pub fn is_error_marker(&self) -> bool {
        self.response == GENERATION_ERROR_MARKER || self.response == REFINEMENT_ERROR_MARKER
    }

    /// Renders the block this record contributes to later prompts.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("### Step: {}\n{}", self.stage_name, self.response)
    }

    /// Overwrites the response and feedback. No history is kept.
    pub(crate) fn apply_refinement(&mut self, response: String, feedback: String) {
        self.response = response;
        self.feedback = feedback;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_empty_feedback() {
        let record = StageRecord::new("Focus Generation", "prompt", "response");
        assert_eq!(record.feedback(), "");
        assert!(!record.has_feedback());
        assert!(!record.is_error_marker());
    }

    #[test]
    fn test_summary_format() {
        let record = StageRecord::new("Tension Matrix", "p", "{\"tensions\": []}");
        assert_eq!(record.summary(), "### Step: Tension Matrix\n{\"tensions\": []}");
    }

    #[test]
    fn test_apply_refinement_overwrites() {
        let mut record = StageRecord::new("A", "p", "first");
        record.apply_refinement("second".to_string(), "shorter".to_string());

        assert_eq!(record.response(), "second");
        assert_eq!(record.feedback(), "shorter");
        assert_eq!(record.prompt(), "p");
    }

    #[test]
    fn test_error_markers_detected() {
        assert!(StageRecord::new("A", "p", GENERATION_ERROR_MARKER).is_error_marker());
        assert!(StageRecord::new("A", "p", REFINEMENT_ERROR_MARKER).is_error_marker());
    }

    #[test]
    fn test_feedback_defaults_when_missing_in_json() {
        let json = r#"{"stage_name":"A","prompt":"p","response":"r"}"#;
        let record: StageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.feedback(), "");
    }
}
