//! Prompt construction from the catalog and the pipeline state.
//!
//! A stage prompt is its template rendered with the story as context and
//! either the full prior-output concatenation or, when a branch selection
//! applies to the stage, the selection's serialized form.

use crate::catalog::StageCatalog;
use crate::core::StageRecord;
use crate::state::{BranchSelection, PipelineState};

/// Leading instruction of every refinement prompt.
pub const REFINE_INSTRUCTION: &str = "Refine the following output based on this feedback.";

/// Concatenates record summaries in log order, separated by a blank line.
#[must_use]
pub fn prior_outputs(log: &[StageRecord]) -> String {
    log.iter()
        .map(StageRecord::summary)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Returns true if `selection` replaces the prior outputs for the stage at
/// `position`: the selection must come from an earlier stage.
#[must_use]
pub fn selection_applies(catalog: &StageCatalog, selection: &BranchSelection, position: usize) -> bool {
    catalog
        .position(selection.source_stage())
        .is_some_and(|source| position > source)
}

/// Builds the generation prompt for the stage at `position`.
///
/// Returns `None` for the input stage or an out-of-range position.
#[must_use]
pub fn build_stage_prompt(
    catalog: &StageCatalog,
    state: &PipelineState,
    position: usize,
) -> Option<String> {
    let template = catalog.get(position)?.template()?;

    let prior = match state.branch_selection() {
        Some(selection) if selection_applies(catalog, selection, position) => {
            selection.render_context()
        }
        _ => prior_outputs(state.log()),
    };

    Some(template.render(state.initial_input(), &prior))
}

/// Builds the refinement prompt from the feedback and the current response.
#[must_use]
pub fn build_refinement_prompt(feedback: &str, current_response: &str) -> String {
    format!("{REFINE_INSTRUCTION}\n\nFeedback:\n{feedback}\n\nOriginal Output:\n{current_response}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;
    use crate::catalog::{PromptTemplate, StageDefinition};
    use crate::core::STORY_ACKNOWLEDGEMENT;
    use pretty_assertions::assert_eq;

    fn catalog() -> StageCatalog {
        CatalogBuilder::new()
            .input_stage("Input")
            .definition(
                StageDefinition::generated("Options", PromptTemplate::new("List options"))
                    .branchable(),
            )
            .stage("Plan", "Plan it")
            .build()
            .unwrap()
    }

    fn state_with_options() -> PipelineState {
        let mut state = PipelineState::new();
        state.set_initial_input("a bakery".to_string());
        state.push_record(StageRecord::new("Input", "a bakery", STORY_ACKNOWLEDGEMENT));
        state.advance_cursor();
        state.push_record(StageRecord::new("Options", "p", "{\"options\": []}"));
        state.advance_cursor();
        state
    }

    #[test]
    fn test_prior_outputs_join() {
        let log = vec![
            StageRecord::new("Input", "s", "ok"),
            StageRecord::new("A", "p", "rA"),
        ];
        assert_eq!(prior_outputs(&log), "### Step: Input\nok\n\n### Step: A\nrA");
    }

    #[test]
    fn test_input_stage_has_no_prompt() {
        let state = PipelineState::new();
        assert!(build_stage_prompt(&catalog(), &state, 0).is_none());
        assert!(build_stage_prompt(&catalog(), &state, 9).is_none());
    }

    #[test]
    fn test_stage_prompt_uses_full_history() {
        let state = state_with_options();
        let prompt = build_stage_prompt(&catalog(), &state, 2).unwrap();

        assert_eq!(
            prompt,
            format!(
                "Plan it\n\nContext:\na bakery\n\nPrevious Outputs:\n### Step: Input\n{STORY_ACKNOWLEDGEMENT}\n\n### Step: Options\n{{\"options\": []}}"
            )
        );
    }

    #[test]
    fn test_branch_selection_replaces_history() {
        let mut state = state_with_options();
        state.set_branch_selection(BranchSelection::new(
            "Options",
            serde_json::json!({"title": "Croissants"}),
        ));

        let prompt = build_stage_prompt(&catalog(), &state, 2).unwrap();
        assert!(prompt.contains("### Selected from: Options"));
        assert!(prompt.contains("Croissants"));
        assert!(!prompt.contains("### Step: Input"));
    }

    #[test]
    fn test_selection_does_not_apply_to_source_or_earlier() {
        let catalog = catalog();
        let selection = BranchSelection::new("Options", serde_json::json!({}));
        assert!(!selection_applies(&catalog, &selection, 1));
        assert!(selection_applies(&catalog, &selection, 2));

        let unknown = BranchSelection::new("Elsewhere", serde_json::json!({}));
        assert!(!selection_applies(&catalog, &unknown, 2));
    }

    #[test]
    fn test_refinement_prompt_layout() {
        assert_eq!(
            build_refinement_prompt("shorter", "rA"),
            "Refine the following output based on this feedback.\n\nFeedback:\nshorter\n\nOriginal Output:\nrA"
        );
    }
}
