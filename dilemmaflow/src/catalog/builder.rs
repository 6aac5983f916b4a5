//! Fluent builder for custom stage catalogs.

use super::{PromptTemplate, StageCatalog, StageDefinition};
use crate::errors::ValidationError;

/// A fluent catalog builder.
///
/// Validation is deferred to [`CatalogBuilder::build`], which applies the
/// same rules as [`StageCatalog::new`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    stages: Vec<StageDefinition>,
}

impl CatalogBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the input stage.
    #[must_use]
    pub fn input_stage(mut self, name: impl Into<String>) -> Self {
        self.stages.push(StageDefinition::input(name));
        self
    }

    /// Adds a generated stage with the given instructions.
    #[must_use]
    pub fn stage(mut self, name: impl Into<String>, instructions: impl Into<String>) -> Self {
        self.stages
            .push(StageDefinition::generated(name, PromptTemplate::new(instructions)));
        self
    }

    /// Adds a fully specified stage definition.
    #[must_use]
    pub fn definition(mut self, definition: StageDefinition) -> Self {
        self.stages.push(definition);
        self
    }

    /// Number of stages added so far.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Builds and validates the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the stages do not form a valid catalog.
    pub fn build(self) -> Result<StageCatalog, ValidationError> {
        StageCatalog::new(self.stages)
    }
}
