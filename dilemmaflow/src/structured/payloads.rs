//! Typed payloads for the default catalog's stage outputs.
//!
//! Every field is lenient: missing values default, and list-like fields
//! accept either a JSON array or a delimited string.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

fn list_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\n,;]").expect("separator pattern is valid"))
}

/// Coerces a JSON value into a list of strings.
///
/// Arrays pass through (non-string items are rendered as JSON). Strings are
/// split on newlines, commas and semicolons, and each piece is trimmed of
/// bullets, dashes and whitespace. Anything else is an empty list.
#[must_use]
pub fn listify(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Value::String(text) => list_separator()
            .split(text)
            .map(|piece| piece.trim_matches(|c: char| c == '-' || c == '•' || c.is_whitespace()))
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn de_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(listify(&value))
}

/// One focus area under a Dilemma Triangle driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusArea {
    /// People, Planet or Prosperity.
    pub driver: String,
    /// The focus area.
    pub focus: String,
    /// Why it matters.
    pub rationale: String,
}

/// A single issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
    /// The issue.
    pub issue: String,
    /// Explanation.
    pub explain: String,
}

/// Issues stemming from one focus area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueGroup {
    /// The focus area.
    pub focus: String,
    /// Its driver.
    pub driver: String,
    /// The issues.
    pub issues: Vec<Issue>,
}

/// A tension between two issues.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tension {
    /// First issue.
    pub issue_a: String,
    /// Second issue.
    pub issue_b: String,
    /// The tension.
    pub tension: String,
    /// Why they conflict.
    pub why: String,
}

/// A dilemma phrased as a tradeoff.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dilemma {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Affected drivers.
    #[serde(deserialize_with = "de_list")]
    pub drivers: Vec<String>,
    /// Importance score, 1 to 10.
    pub score: Option<f64>,
}

/// A proposed solution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueProposition {
    /// Title.
    pub title: String,
    /// Explanation.
    pub explain: String,
    /// Dilemmas it addresses.
    #[serde(deserialize_with = "de_list")]
    pub dilemmas: Vec<String>,
    /// Benefits.
    #[serde(deserialize_with = "de_list")]
    pub benefits: Vec<String>,
}

/// SWOT analysis of one value proposition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwotEntry {
    /// The value proposition analysed.
    pub title: String,
    /// Strengths.
    #[serde(rename = "S", deserialize_with = "de_list")]
    pub strengths: Vec<String>,
    /// Weaknesses.
    #[serde(rename = "W", deserialize_with = "de_list")]
    pub weaknesses: Vec<String>,
    /// Opportunities.
    #[serde(rename = "O", deserialize_with = "de_list")]
    pub opportunities: Vec<String>,
    /// Threats.
    #[serde(rename = "T", deserialize_with = "de_list")]
    pub threats: Vec<String>,
    /// Overall recommendation.
    pub recommendation: String,
}

/// The nine canvas block keys, in canvas reading order.
pub const CANVAS_BLOCKS: [(&str, &str); 9] = [
    ("key_partners", "Key Partners"),
    ("key_activities", "Key Activities"),
    ("key_resources", "Key Resources"),
    ("value_propositions", "Value Propositions"),
    ("customer_relationships", "Customer Relationships"),
    ("channels", "Channels"),
    ("customer_segments", "Customer Segments"),
    ("revenue_streams", "Revenue Streams"),
    ("cost_structure", "Cost Structure"),
];

/// A Business Model Canvas.
///
/// Deserialization normalizes block keys (`"Key Partners"` and
/// `key_partners` are the same block) and ignores unknown keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct BusinessModelCanvas {
    /// Key partners.
    pub key_partners: Vec<String>,
    /// Key activities.
    pub key_activities: Vec<String>,
    /// Key resources.
    pub key_resources: Vec<String>,
    /// Value propositions.
    pub value_propositions: Vec<String>,
    /// Customer relationships.
    pub customer_relationships: Vec<String>,
    /// Channels.
    pub channels: Vec<String>,
    /// Customer segments.
    pub customer_segments: Vec<String>,
    /// Revenue streams.
    pub revenue_streams: Vec<String>,
    /// Cost structure.
    pub cost_structure: Vec<String>,
}

impl BusinessModelCanvas {
    /// The block items for a normalized key.
    #[must_use]
    pub fn block(&self, key: &str) -> Option<&[String]> {
        let items = match key {
            "key_partners" => &self.key_partners,
            "key_activities" => &self.key_activities,
            "key_resources" => &self.key_resources,
            "value_propositions" => &self.value_propositions,
            "customer_relationships" => &self.customer_relationships,
            "channels" => &self.channels,
            "customer_segments" => &self.customer_segments,
            "revenue_streams" => &self.revenue_streams,
            "cost_structure" => &self.cost_structure,
            _ => return None,
        };
        Some(items)
    }

    fn block_mut(&mut self, key: &str) -> Option<&mut Vec<String>> {
        let items = match key {
            "key_partners" => &mut self.key_partners,
            "key_activities" => &mut self.key_activities,
            "key_resources" => &mut self.key_resources,
            "value_propositions" => &mut self.value_propositions,
            "customer_relationships" => &mut self.customer_relationships,
            "channels" => &mut self.channels,
            "customer_segments" => &mut self.customer_segments,
            "revenue_streams" => &mut self.revenue_streams,
            "cost_structure" => &mut self.cost_structure,
            _ => return None,
        };
        Some(items)
    }

    /// `(display title, items)` for each block, in canvas order.
    pub fn blocks(&self) -> impl Iterator<Item = (&'static str, &[String])> + '_ {
        CANVAS_BLOCKS
            .iter()
            .map(move |(key, title)| (*title, self.block(key).unwrap_or_default()))
    }

    /// Returns true if every block is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks().all(|(_, items)| items.is_empty())
    }
}

/// Lower-cases a block key and joins words with underscores.
#[must_use]
pub fn normalize_block_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

impl From<Map<String, Value>> for BusinessModelCanvas {
    fn from(map: Map<String, Value>) -> Self {
        let mut canvas = Self::default();
        for (key, value) in &map {
            if let Some(block) = canvas.block_mut(&normalize_block_key(key)) {
                *block = listify(value);
            }
        }
        canvas
    }
}

/// The placeholder canvas shown before any canvas is generated.
#[must_use]
pub fn default_canvas() -> BusinessModelCanvas {
    let one = |text: &str| vec![text.to_string()];
    BusinessModelCanvas {
        key_partners: one("Main partners & suppliers"),
        key_activities: one("Most important activities"),
        key_resources: one("Key assets & resources"),
        value_propositions: one("What value do we deliver?"),
        customer_relationships: one("What type of relationships?"),
        channels: one("How do we reach customers?"),
        customer_segments: one("Who are the customers?"),
        revenue_streams: one("How do we earn revenue?"),
        cost_structure: one("Major cost drivers"),
    }
}

/// A canvas generated for one value proposition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BmcEntry {
    /// The value proposition the canvas describes.
    pub value_proposition: String,
    /// The nine blocks.
    pub canvas: BusinessModelCanvas,
}

/// Financial outline of the business plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Financials {
    /// How money comes in.
    pub revenue_model: String,
    /// Main costs.
    #[serde(deserialize_with = "de_list")]
    pub cost_drivers: Vec<String>,
    /// Funding required.
    pub funding_needs: String,
}

/// A dated plan milestone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Milestone {
    /// What is reached.
    pub title: String,
    /// When.
    pub timeframe: String,
}

/// A risk and its mitigation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Risk {
    /// The risk.
    pub risk: String,
    /// How it is mitigated.
    pub mitigation: String,
}

/// The final business plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessPlan {
    /// Executive summary.
    pub executive_summary: String,
    /// Problem statement.
    pub problem: String,
    /// Proposed solution.
    pub solution: String,
    /// Target market.
    pub target_market: String,
    /// Go-to-market steps.
    #[serde(deserialize_with = "de_list")]
    pub go_to_market: Vec<String>,
    /// Operations.
    #[serde(deserialize_with = "de_list")]
    pub operations: Vec<String>,
    /// Financial outline.
    pub financials: Financials,
    /// Milestones.
    pub milestones: Vec<Milestone>,
    /// Risks.
    pub risks: Vec<Risk>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_listify_string() {
        assert_eq!(
            listify(&json!("- rent\n• wages; energy,  ")),
            vec!["rent", "wages", "energy"]
        );
    }

    #[test]
    fn test_listify_array_and_other() {
        assert_eq!(listify(&json!(["a", 2])), vec!["a", "2"]);
        assert!(listify(&json!(null)).is_empty());
        assert!(listify(&json!({"k": "v"})).is_empty());
    }

    #[test]
    fn test_canvas_key_normalization() {
        let canvas: BusinessModelCanvas = serde_json::from_value(json!({
            "Key Partners": ["Farmers"],
            "cost_structure": "Rent; Staff",
            "Unrelated": ["ignored"]
        }))
        .unwrap();

        assert_eq!(canvas.key_partners, vec!["Farmers"]);
        assert_eq!(canvas.cost_structure, vec!["Rent", "Staff"]);
        assert!(canvas.channels.is_empty());
        assert!(!canvas.is_empty());
    }

    #[test]
    fn test_canvas_blocks_order() {
        let titles: Vec<&str> = default_canvas().blocks().map(|(title, _)| title).collect();
        assert_eq!(titles.first(), Some(&"Key Partners"));
        assert_eq!(titles.last(), Some(&"Cost Structure"));
        assert_eq!(titles.len(), 9);
        assert!(BusinessModelCanvas::default().is_empty());
    }

    #[test]
    fn test_swot_entry_letters() {
        let entry: SwotEntry = serde_json::from_value(json!({
            "title": "Kiosk",
            "S": ["cheap"],
            "W": "slow, small",
            "recommendation": "go"
        }))
        .unwrap();

        assert_eq!(entry.strengths, vec!["cheap"]);
        assert_eq!(entry.weaknesses, vec!["slow", "small"]);
        assert!(entry.threats.is_empty());
    }

    #[test]
    fn test_business_plan_defaults() {
        let plan: BusinessPlan = serde_json::from_value(json!({
            "executive_summary": "Bake bread",
            "financials": {"revenue_model": "sales"}
        }))
        .unwrap();
        assert_eq!(plan.executive_summary, "Bake bread");
        assert_eq!(plan.financials.revenue_model, "sales");
        assert!(plan.risks.is_empty());
    }
}
