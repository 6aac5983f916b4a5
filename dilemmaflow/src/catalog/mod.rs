//! The stage catalog: an ordered, fixed list of named stages.
//!
//! The first stage takes the user's story verbatim. Every later stage is
//! bound to a [`PromptTemplate`] that tells the backend what to produce and
//! in what shape. Catalogs are validated once at construction and are
//! immutable afterwards.

mod builder;
mod templates;

pub use builder::CatalogBuilder;
pub use templates::{PromptTemplate, CONTEXT_PLACEHOLDER, PRIOR_OUTPUTS_PLACEHOLDER};

use crate::errors::{ErrorInfo, ValidationError};
use std::collections::HashMap;

/// Names of the default Dilemma Triangle stages, in execution order.
pub mod stage_names {
    /// The story input stage.
    pub const STORY_INPUT: &str = "Story Input";
    /// Focus areas per driver.
    pub const FOCUS_GENERATION: &str = "Focus Generation";
    /// Issues per focus area.
    pub const ISSUES_GENERATION: &str = "Issues Generation";
    /// Conflicts between issues.
    pub const TENSION_MATRIX: &str = "Tension Matrix";
    /// Ranked dilemmas.
    pub const DILEMMAS_AND_RANKING: &str = "Dilemmas & Ranking";
    /// Candidate solutions.
    pub const VALUE_PROPOSITIONS: &str = "Value Propositions";
    /// SWOT per value proposition.
    pub const SWOT_ANALYSIS: &str = "SWOT Analysis";
    /// Nine-block canvas per value proposition.
    pub const BUSINESS_MODEL_CANVAS: &str = "Business Model Canvas";
    /// Narrative business plan.
    pub const BUSINESS_PLAN: &str = "Business Plan";
}

/// Definition of one stage in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDefinition {
    name: String,
    template: Option<PromptTemplate>,
    payload_key: Option<String>,
    branchable: bool,
}

impl StageDefinition {
    /// Creates the input stage, which has no template.
    #[must_use]
    pub fn input(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: None,
            payload_key: None,
            branchable: false,
        }
    }

    /// Creates a backend-generated stage.
    #[must_use]
    pub fn generated(name: impl Into<String>, template: PromptTemplate) -> Self {
        Self {
            name: name.into(),
            template: Some(template),
            payload_key: None,
            branchable: false,
        }
    }

    /// Sets the top-level JSON key the template asks the backend for.
    #[must_use]
    pub fn with_payload_key(mut self, key: impl Into<String>) -> Self {
        self.payload_key = Some(key.into());
        self
    }

    /// Marks the stage as a multi-option stage the user can branch from.
    #[must_use]
    pub fn branchable(mut self) -> Self {
        self.branchable = true;
        self
    }

    /// The stage name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The prompt template, `None` for the input stage.
    #[must_use]
    pub fn template(&self) -> Option<&PromptTemplate> {
        self.template.as_ref()
    }

    /// The expected top-level payload key, if declared.
    #[must_use]
    pub fn payload_key(&self) -> Option<&str> {
        self.payload_key.as_deref()
    }

    /// Whether a branch selection may be taken from this stage.
    #[must_use]
    pub fn is_branchable(&self) -> bool {
        self.branchable
    }
}

/// An ordered, validated list of stage definitions.
#[derive(Debug, Clone)]
pub struct StageCatalog {
    stages: Vec<StageDefinition>,
    index: HashMap<String, usize>,
}

impl StageCatalog {
    /// Creates a catalog from definitions in execution order.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the catalog has fewer than two stages,
    /// a blank or duplicate name, a templated first stage, an untemplated
    /// later stage, or a branchable first stage.
    pub fn new(stages: Vec<StageDefinition>) -> Result<Self, ValidationError> {
        if stages.len() < 2 {
            return Err(catalog_error(
                "CATALOG-TOO-SHORT",
                "A catalog needs an input stage and at least one generated stage",
                None,
            ));
        }

        let mut index = HashMap::with_capacity(stages.len());
        for (position, stage) in stages.iter().enumerate() {
            if stage.name.trim().is_empty() {
                return Err(catalog_error(
                    "CATALOG-BLANK-NAME",
                    "Stage name cannot be empty or whitespace-only",
                    None,
                ));
            }
            if index.insert(stage.name.clone(), position).is_some() {
                return Err(catalog_error(
                    "CATALOG-DUPLICATE",
                    &format!("Stage '{}' appears more than once", stage.name),
                    Some(&stage.name),
                ));
            }

            let is_input = position == 0;
            if is_input && stage.template.is_some() {
                return Err(catalog_error(
                    "CATALOG-INPUT-TEMPLATE",
                    &format!("Input stage '{}' cannot have a prompt template", stage.name),
                    Some(&stage.name),
                ));
            }
            if !is_input && stage.template.is_none() {
                return Err(catalog_error(
                    "CATALOG-MISSING-TEMPLATE",
                    &format!("Stage '{}' needs a prompt template", stage.name),
                    Some(&stage.name),
                ));
            }
            if is_input && stage.branchable {
                return Err(catalog_error(
                    "CATALOG-INPUT-BRANCHABLE",
                    "The input stage cannot be branchable",
                    Some(&stage.name),
                ));
            }
        }

        Ok(Self { stages, index })
    }

    /// Returns a builder for a custom catalog.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// The default Dilemma Triangle to business plan catalog.
    ///
    /// Built through [`StageCatalog::new`], so it passes the same checks as a
    /// custom catalog.
    #[must_use]
    pub fn dilemma_triangle() -> Self {
        Self::new(default_stages()).expect("default stage catalog is valid")
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false: a validated catalog has at least two stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Index of the last stage.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.stages.len() - 1
    }

    /// Returns the stage at `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&StageDefinition> {
        self.stages.get(position)
    }

    /// Returns the position of the stage named `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Returns the stage named `name`.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&StageDefinition> {
        self.position(name).and_then(|position| self.stages.get(position))
    }

    /// The input stage.
    #[must_use]
    pub fn input_stage(&self) -> &StageDefinition {
        &self.stages[0]
    }

    /// Stage names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(StageDefinition::name).collect()
    }

    /// Iterates over stages in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &StageDefinition> {
        self.stages.iter()
    }
}

impl Default for StageCatalog {
    fn default() -> Self {
        Self::dilemma_triangle()
    }
}

fn catalog_error(code: &str, message: &str, stage: Option<&str>) -> ValidationError {
    let mut info = ErrorInfo::new(code, message);
    if let Some(stage) = stage {
        info = info.with_context_entry("stage", stage);
    }
    ValidationError::new(message)
        .for_field("catalog")
        .with_error_info(info)
}

fn default_stages() -> Vec<StageDefinition> {
    use self::stage_names as n;

    vec![
        StageDefinition::input(n::STORY_INPUT),
        StageDefinition::generated(n::FOCUS_GENERATION, PromptTemplate::new(templates::FOCUS_GENERATION))
            .with_payload_key("focuses"),
        StageDefinition::generated(n::ISSUES_GENERATION, PromptTemplate::new(templates::ISSUES_GENERATION))
            .with_payload_key("issues_by_focus"),
        StageDefinition::generated(n::TENSION_MATRIX, PromptTemplate::new(templates::TENSION_MATRIX))
            .with_payload_key("tensions"),
        StageDefinition::generated(
            n::DILEMMAS_AND_RANKING,
            PromptTemplate::new(templates::DILEMMAS_AND_RANKING),
        )
        .with_payload_key("dilemmas"),
        StageDefinition::generated(n::VALUE_PROPOSITIONS, PromptTemplate::new(templates::VALUE_PROPOSITIONS))
            .with_payload_key("value_propositions"),
        StageDefinition::generated(n::SWOT_ANALYSIS, PromptTemplate::new(templates::SWOT_ANALYSIS))
            .with_payload_key("swot")
            .branchable(),
        StageDefinition::generated(
            n::BUSINESS_MODEL_CANVAS,
            PromptTemplate::new(templates::BUSINESS_MODEL_CANVAS),
        )
        .with_payload_key("bmc"),
        StageDefinition::generated(n::BUSINESS_PLAN, PromptTemplate::new(templates::BUSINESS_PLAN))
            .with_payload_key("business_plan"),
    ]
}
