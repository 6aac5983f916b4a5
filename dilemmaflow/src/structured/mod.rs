//! Optional decoding of stage responses into typed payloads.
//!
//! The controller stores responses as opaque text. Presentation layers that
//! want structure (the canvas view, SWOT option pickers) decode here; a
//! failure is reported to the caller and never touches the stage log.

mod payloads;

pub use payloads::{
    default_canvas, listify, normalize_block_key, BmcEntry, BusinessModelCanvas, BusinessPlan,
    Dilemma, Financials, FocusArea, Issue, IssueGroup, Milestone, Risk, SwotEntry, Tension,
    ValueProposition, CANVAS_BLOCKS,
};

use crate::catalog::stage_names;
use crate::errors::StructuredOutputError;
use crate::state::BranchSelection;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::OnceLock;

fn json_object_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("object pattern is valid"))
}

/// Carves the outermost `{ ... }` block out of model text.
///
/// The match is greedy: it spans from the first `{` to the last `}`, which
/// strips prose and code fences around a single JSON object.
///
/// # Errors
///
/// Returns [`StructuredOutputError::NoJsonFound`] if there is no such block.
pub fn extract_json_object(text: &str) -> Result<&str, StructuredOutputError> {
    json_object_regex()
        .find(text)
        .map(|m| m.as_str())
        .ok_or(StructuredOutputError::NoJsonFound)
}

/// Parses the JSON object embedded in `text`.
///
/// # Errors
///
/// Fails if no object is found or it is not valid JSON.
pub fn parse_object(text: &str) -> Result<Value, StructuredOutputError> {
    let raw = extract_json_object(text)?;
    serde_json::from_str(raw).map_err(|e| StructuredOutputError::InvalidJson(e.to_string()))
}

/// Decodes the value under top-level `key` of the object in `text`.
///
/// # Errors
///
/// Fails if no object is found, the JSON is invalid, `key` is absent, or the
/// value does not have the shape of `T`.
pub fn decode_payload<T: DeserializeOwned>(text: &str, key: &str) -> Result<T, StructuredOutputError> {
    let mut object = parse_object(text)?;
    let value = object
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| StructuredOutputError::MissingKey {
            key: key.to_string(),
        })?;
    serde_json::from_value(value).map_err(|e| StructuredOutputError::InvalidJson(e.to_string()))
}

/// Decodes the canvases of a Business Model Canvas response.
///
/// # Errors
///
/// See [`decode_payload`].
pub fn canvases(text: &str) -> Result<Vec<BmcEntry>, StructuredOutputError> {
    decode_payload(text, "bmc")
}

/// Decodes the entries of a SWOT Analysis response.
///
/// # Errors
///
/// See [`decode_payload`].
pub fn swot_entries(text: &str) -> Result<Vec<SwotEntry>, StructuredOutputError> {
    decode_payload(text, "swot")
}

/// Turns each SWOT entry into a selectable branch option.
///
/// Entries without a title are labelled `Option {n}`.
///
/// # Errors
///
/// See [`decode_payload`].
pub fn swot_options(text: &str) -> Result<Vec<BranchSelection>, StructuredOutputError> {
    let items: Vec<Value> = decode_payload(text, "swot")?;
    Ok(items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let titled = item.get("title").and_then(Value::as_str).is_some();
            let selection = BranchSelection::new(stage_names::SWOT_ANALYSIS, item);
            if titled {
                selection
            } else {
                selection.with_label(format!("Option {}", index + 1))
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SWOT: &str = r#"Here you go:
```json
{"swot": [
  {"title": "Solar kiosks", "S": ["cheap"], "W": [], "O": [], "T": [], "recommendation": "pilot"},
  {"S": "fast; local"}
]}
```
Hope this helps."#;

    #[test]
    fn test_extract_strips_prose() {
        let raw = extract_json_object("Sure! {\"a\": {\"b\": 1}} done").unwrap();
        assert_eq!(raw, "{\"a\": {\"b\": 1}}");
        assert_eq!(extract_json_object("no json"), Err(StructuredOutputError::NoJsonFound));
    }

    #[test]
    fn test_invalid_and_missing() {
        assert!(matches!(parse_object("{not json}"), Err(StructuredOutputError::InvalidJson(_))));
        assert_eq!(
            decode_payload::<Vec<Tension>>("{\"other\": []}", "tensions"),
            Err(StructuredOutputError::MissingKey {
                key: "tensions".to_string()
            })
        );
    }

    #[test]
    fn test_decode_focuses() {
        let focuses: Vec<FocusArea> = decode_payload(
            r#"{"focuses": [{"driver": "People", "focus": "Jobs", "rationale": "r"}]}"#,
            "focuses",
        )
        .unwrap();
        assert_eq!(focuses[0].driver, "People");
    }

    #[test]
    fn test_decode_issue_groups() {
        let groups: Vec<IssueGroup> = decode_payload(
            r#"{"issues_by_focus": [{"focus": "Jobs", "driver": "People",
                "issues": [{"issue": "Seasonal work", "explain": "e"}, {"issue": "Low pay"}]}]}"#,
            "issues_by_focus",
        )
        .unwrap();
        assert_eq!(groups[0].focus, "Jobs");
        assert_eq!(groups[0].issues.len(), 2);
        assert_eq!(groups[0].issues[1].issue, "Low pay");
        assert_eq!(groups[0].issues[1].explain, "");
    }

    #[test]
    fn test_decode_dilemmas() {
        let dilemmas: Vec<Dilemma> = decode_payload(
            r#"{"dilemmas": [{"title": "Growth vs soil", "drivers": "Planet, Prosperity", "score": 8}]}"#,
            "dilemmas",
        )
        .unwrap();
        assert_eq!(dilemmas[0].title, "Growth vs soil");
        assert_eq!(dilemmas[0].drivers, vec!["Planet", "Prosperity"]);
        assert_eq!(dilemmas[0].score, Some(8.0));
    }

    #[test]
    fn test_decode_value_propositions() {
        let props: Vec<ValueProposition> = decode_payload(
            r#"{"value_propositions": [{"title": "Co-op", "explain": "x",
                "dilemmas": ["Growth vs soil"], "benefits": "shared cost; local jobs"}]}"#,
            "value_propositions",
        )
        .unwrap();
        assert_eq!(props[0].dilemmas, vec!["Growth vs soil"]);
        assert_eq!(props[0].benefits, vec!["shared cost", "local jobs"]);
    }

    #[test]
    fn test_swot_entries_and_options() {
        let entries = swot_entries(SWOT).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].strengths, vec!["fast", "local"]);

        let options = swot_options(SWOT).unwrap();
        assert_eq!(options[0].label(), "Solar kiosks");
        assert_eq!(options[1].label(), "Option 2");
        assert_eq!(options[0].source_stage(), "SWOT Analysis");
    }

    #[test]
    fn test_canvases() {
        let entries = canvases(
            r#"{"bmc": [{"value_proposition": "Kiosk", "canvas": {"Channels": "web, shop"}}]}"#,
        )
        .unwrap();
        assert_eq!(entries[0].value_proposition, "Kiosk");
        assert_eq!(entries[0].canvas.channels, vec!["web", "shop"]);
    }
}
