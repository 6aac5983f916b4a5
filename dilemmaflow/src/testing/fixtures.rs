//! Test fixtures for controller testing.

use std::sync::Arc;

use super::mocks::ScriptedBackend;
use crate::backend::GenerationBackend;
use crate::catalog::{CatalogBuilder, PromptTemplate, StageCatalog, StageDefinition};
use crate::controller::StageController;
use crate::errors::DilemmaflowError;
use crate::events::CollectingEventSink;

/// The minimal linear catalog `[Input, A, B]`.
#[must_use]
pub fn three_stage_catalog() -> StageCatalog {
    CatalogBuilder::new()
        .input_stage("Input")
        .stage("A", "Write A")
        .stage("B", "Write B")
        .build()
        .unwrap_or_else(|e| panic!("fixture catalog is valid: {e}"))
}

/// `[Input, Options, Plan]` where `Options` is branchable.
#[must_use]
pub fn branching_catalog() -> StageCatalog {
    CatalogBuilder::new()
        .input_stage("Input")
        .definition(
            StageDefinition::generated("Options", PromptTemplate::new("List options"))
                .with_payload_key("options")
                .branchable(),
        )
        .stage("Plan", "Plan the chosen option")
        .build()
        .unwrap_or_else(|e| panic!("fixture catalog is valid: {e}"))
}

/// A controller wired to a scripted backend and a collecting sink.
pub struct TestHarness {
    /// The controller under test.
    pub controller: StageController,
    /// The backend the controller calls.
    pub backend: Arc<ScriptedBackend>,
    /// Every event the controller emitted.
    pub events: Arc<CollectingEventSink>,
}

impl TestHarness {
    /// Creates a harness over `catalog` with an empty scripted backend.
    #[must_use]
    pub fn new(catalog: StageCatalog) -> Self {
        Self::with_backend(catalog, ScriptedBackend::new())
    }

    /// Creates a harness over `catalog` with a prepared backend.
    #[must_use]
    pub fn with_backend(catalog: StageCatalog, backend: ScriptedBackend) -> Self {
        let backend = Arc::new(backend);
        let events = Arc::new(CollectingEventSink::new());
        let controller = StageController::new(
            Arc::new(catalog),
            Arc::clone(&backend) as Arc<dyn GenerationBackend>,
        )
        .with_event_sink(events.clone());

        Self {
            controller,
            backend,
            events,
        }
    }

    /// Harness over [`three_stage_catalog`].
    #[must_use]
    pub fn three_stage() -> Self {
        Self::new(three_stage_catalog())
    }

    /// Submits `story` and generates the first generated stage.
    ///
    /// # Errors
    ///
    /// Propagates controller errors.
    pub async fn start(&mut self, story: &str) -> Result<(), DilemmaflowError> {
        self.controller.submit_input(story).await?;
        self.controller.ensure_generated().await?;
        Ok(())
    }

    /// Approves the cursor stage and generates the next one, if any.
    ///
    /// # Errors
    ///
    /// Propagates controller errors.
    pub async fn approve_current(&mut self) -> Result<(), DilemmaflowError> {
        let stage = self.controller.current_stage().name().to_string();
        self.controller.approve(&stage).await?;
        self.controller.ensure_generated().await?;
        Ok(())
    }
}
