//! Prompt templates and the default Dilemma Triangle instructions.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Placeholder replaced with the initial story.
pub const CONTEXT_PLACEHOLDER: &str = "{{context}}";

/// Placeholder replaced with the prior outputs (or the branch selection).
pub const PRIOR_OUTPUTS_PLACEHOLDER: &str = "{{prior_outputs}}";

const STANDARD_SUFFIX: &str = "\n\nContext:\n{{context}}\n\nPrevious Outputs:\n{{prior_outputs}}";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{(context|prior_outputs)\}\}").expect("placeholder pattern is valid")
    })
}

/// A prompt template with `{{context}}` and `{{prior_outputs}}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    /// Creates a template.
    ///
    /// Instructions that name neither placeholder get the standard
    /// `Context:` / `Previous Outputs:` suffix appended.
    #[must_use]
    pub fn new(instructions: impl Into<String>) -> Self {
        let mut text = instructions.into();
        if !text.contains(CONTEXT_PLACEHOLDER) && !text.contains(PRIOR_OUTPUTS_PLACEHOLDER) {
            text.push_str(STANDARD_SUFFIX);
        }
        Self { text }
    }

    /// Returns the raw template text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Substitutes both placeholders in a single pass.
    ///
    /// Placeholder-like text inside `context` or `prior_outputs` is left
    /// untouched.
    #[must_use]
    pub fn render(&self, context: &str, prior_outputs: &str) -> String {
        placeholder_regex()
            .replace_all(&self.text, |caps: &Captures<'_>| match &caps[1] {
                "context" => context.to_string(),
                _ => prior_outputs.to_string(),
            })
            .into_owned()
    }
}

pub(crate) const FOCUS_GENERATION: &str = r#"You are given the user's story below. Apply the Dilemma Triangle methodology (People, Planet, Prosperity) to extract focus areas.
For each driver, produce 1–3 specific focus areas and a short rationale (1–2 sentences).
Return JSON:
{
  "focuses": [
    {"driver":"People","focus":"...","rationale":"..."},
    {"driver":"Planet","focus":"...","rationale":"..."},
    {"driver":"Prosperity","focus":"...","rationale":"..."}
  ]
}"#;

pub(crate) const ISSUES_GENERATION: &str = r#"Given the focus areas (and drivers), list 3–6 issues for each focus area that stem from it.
Return JSON:
{
  "issues_by_focus": [
    {"focus":"...","driver":"...","issues":[{"issue":"...","explain":"..."}]}
  ]
}"#;

pub(crate) const TENSION_MATRIX: &str = r#"Given the issues across focuses, generate a tension matrix describing conflicts or tradeoffs between issues.
Return JSON:
{
  "tensions":[
    {"issue_a":"...","issue_b":"...","tension":"...","why":"..."}
  ]
}"#;

pub(crate) const DILEMMAS_AND_RANKING: &str = r#"From the tension matrix, generate dilemmas phrased as tradeoffs.
Each dilemma should include a title, description, affected drivers, and an importance score (1–10).
Return JSON:
{
  "dilemmas":[
    {"title":"...","description":"...","drivers":["People","Planet"],"score":8}
  ]
}"#;

pub(crate) const VALUE_PROPOSITIONS: &str = r#"For the top dilemmas, propose 2–5 concrete value propositions (solutions) addressing the dilemmas while balancing drivers.
Return JSON:
{
  "value_propositions":[
    {"title":"...","explain":"...","dilemmas":["..."],"benefits":["..."]}
  ]
}"#;

pub(crate) const SWOT_ANALYSIS: &str = r#"Perform a SWOT analysis on each provided value proposition.
Return JSON:
{
  "swot":[
    {"title":"...","S":["..."],"W":["..."],"O":["..."],"T":["..."],"recommendation":"..."}
  ]
}"#;

pub(crate) const BUSINESS_MODEL_CANVAS: &str = r#"Generate a Business Model Canvas (9 blocks) for each value proposition.
Return only valid JSON and nothing else:
{
  "bmc":[
    {"value_proposition":"...","canvas":{
      "key_partners":["..."],
      "key_activities":["..."],
      "key_resources":["..."],
      "value_propositions":["..."],
      "customer_relationships":["..."],
      "channels":["..."],
      "customer_segments":["..."],
      "revenue_streams":["..."],
      "cost_structure":["..."]
    }}
  ]
}"#;

pub(crate) const BUSINESS_PLAN: &str = r#"Using the Business Model Canvas and everything before it, write a concise business plan.
Return JSON:
{
  "business_plan":{
    "executive_summary":"...",
    "problem":"...",
    "solution":"...",
    "target_market":"...",
    "go_to_market":["..."],
    "operations":["..."],
    "financials":{"revenue_model":"...","cost_drivers":["..."],"funding_needs":"..."},
    "milestones":[{"title":"...","timeframe":"..."}],
    "risks":[{"risk":"...","mitigation":"..."}]
  }
}"#;
