//! Branch selections: one user-picked item out of a multi-option stage.

use serde::{Deserialize, Serialize};

const LABEL_KEYS: [&str; 3] = ["title", "value_proposition", "focus"];

/// A sub-item the user picked from a prior stage's structured output.
///
/// When applicable, its serialized form replaces the prior-outputs
/// concatenation in later prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchSelection {
    source_stage: String,
    label: String,
    item: serde_json::Value,
}

impl BranchSelection {
    /// Creates a selection of `item` taken from `source_stage`.
    ///
    /// The label is taken from the item's `title`, `value_proposition` or
    /// `focus` field when present.
    #[must_use]
    pub fn new(source_stage: impl Into<String>, item: serde_json::Value) -> Self {
        let label = LABEL_KEYS
            .iter()
            .find_map(|key| item.get(*key).and_then(serde_json::Value::as_str))
            .unwrap_or("Selected option")
            .to_string();

        Self {
            source_stage: source_stage.into(),
            label,
            item,
        }
    }

    /// Overrides the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// The stage the item was picked from.
    #[must_use]
    pub fn source_stage(&self) -> &str {
        &self.source_stage
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The selected item.
    #[must_use]
    pub fn item(&self) -> &serde_json::Value {
        &self.item
    }

    /// Pretty-printed JSON of the item.
    #[must_use]
    pub fn serialized(&self) -> String {
        serde_json::to_string_pretty(&self.item).unwrap_or_else(|_| self.item.to_string())
    }

    /// The block substituted for the prior outputs in prompts.
    #[must_use]
    pub fn render_context(&self) -> String {
        format!("### Selected from: {}\n{}", self.source_stage, self.serialized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_from_title() {
        let selection = BranchSelection::new("SWOT Analysis", json!({"title": "Solar kiosks", "S": []}));
        assert_eq!(selection.label(), "Solar kiosks");
    }

    #[test]
    fn test_label_fallback() {
        let selection = BranchSelection::new("SWOT Analysis", json!({"S": ["cheap"]}));
        assert_eq!(selection.label(), "Selected option");

        let selection = selection.with_label("Option 2");
        assert_eq!(selection.label(), "Option 2");
    }

    #[test]
    fn test_render_context() {
        let selection = BranchSelection::new("SWOT Analysis", json!({"title": "X"}));
        assert_eq!(
            selection.render_context(),
            "### Selected from: SWOT Analysis\n{\n  \"title\": \"X\"\n}"
        );
    }
}
