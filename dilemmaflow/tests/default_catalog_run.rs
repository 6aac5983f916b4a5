//! End-to-end run of the default catalog through the public API.

use dilemmaflow::catalog::stage_names;
use dilemmaflow::prelude::*;
use dilemmaflow::structured::{canvases, swot_options};
use dilemmaflow::testing::{assert_log_cursor_coupling, ScriptedBackend, TestHarness};

const SWOT: &str = r#"{"swot": [
  {"title": "Bread beer", "S": ["zero waste"], "W": ["licensing"], "O": [], "T": [], "recommendation": "pilot"},
  {"title": "Crouton box", "S": ["cheap"], "W": [], "O": [], "T": [], "recommendation": "test"}
]}"#;

const BMC: &str = r#"```json
{"bmc": [{"value_proposition": "Crouton box", "canvas": {"Key Partners": "Bakeries; Cafes", "channels": ["web"]}}]}
```"#;

fn scripted() -> ScriptedBackend {
    ScriptedBackend::with_responses([
        r#"{"focuses": []}"#,
        r#"{"issues_by_focus": []}"#,
        r#"{"tensions": []}"#,
        r#"{"dilemmas": []}"#,
        r#"{"value_propositions": []}"#,
        SWOT,
        BMC,
        r#"{"business_plan": {"executive_summary": "Sell croutons"}}"#,
    ])
}

#[tokio::test]
async fn test_story_to_business_plan() {
    let mut h = TestHarness::with_backend(StageCatalog::dilemma_triangle(), scripted());
    h.start("A bakery throws away 20% of its bread every day.").await.unwrap();

    while h.controller.current_stage().name() != stage_names::SWOT_ANALYSIS {
        h.approve_current().await.unwrap();
        assert_log_cursor_coupling(h.controller.state());
    }

    let swot = h.controller.state().current_record().unwrap().response().to_string();
    let options = swot_options(&swot).unwrap();
    assert_eq!(options.len(), 2);
    h.controller.select_branch(options[1].clone()).await.unwrap();

    h.approve_current().await.unwrap();
    let canvas_prompt = h.backend.last_prompt().unwrap();
    assert!(canvas_prompt.contains("### Selected from: SWOT Analysis"));
    assert!(canvas_prompt.contains("Crouton box"));
    assert!(!canvas_prompt.contains("Bread beer"));

    h.approve_current().await.unwrap();
    let plan_prompt = h.backend.last_prompt().unwrap();
    assert!(plan_prompt.contains("### Selected from: SWOT Analysis"));

    let phase = h.controller.approve(stage_names::BUSINESS_PLAN).await.unwrap();
    assert_eq!(phase, ControllerPhase::Completed);
    assert_eq!(h.controller.state().log().len(), 9);
    assert_eq!(h.backend.call_count(), 8);

    let bmc = h
        .controller
        .state()
        .record_for(stage_names::BUSINESS_MODEL_CANVAS)
        .unwrap();
    let entries = canvases(bmc.response()).unwrap();
    assert_eq!(entries[0].canvas.key_partners, vec!["Bakeries", "Cafes"]);

    let dir = tempfile::tempdir().unwrap();
    let path = ReportExporter::default()
        .write(h.controller.state().log(), dir.path(), ReportFormat::Text)
        .unwrap();
    let report = std::fs::read_to_string(path).unwrap();
    assert!(report.starts_with("## Story Input\n### Prompt:\nA bakery"));
    assert!(report.contains("## Business Plan\n"));
    assert!(!report.contains("### Feedback:"));
}
