//! The stage controller: the pipeline's state machine.
//!
//! A [`StageController`] owns one [`PipelineState`] and advances it through
//! the catalog one stage at a time:
//!
//! ```text
//! AwaitingInput ──submit_input──▶ AwaitingGeneration(1)
//! AwaitingGeneration(k) ──ensure_generated──▶ AwaitingUserDecision(k)
//! AwaitingUserDecision(k) ──refine──▶ AwaitingUserDecision(k)
//! AwaitingUserDecision(k) ──approve──▶ AwaitingGeneration(k+1) | Completed
//! ```
//!
//! Every mutating operation takes `&mut self`, so a controller never runs two
//! operations at once. The backend call is the only suspension point.


use crate::backend::{usable_text, GenerationBackend};
use crate::catalog::{StageCatalog, StageDefinition};
use crate::core::{
    ControllerPhase, PipelineEvent, StageRecord, GENERATION_ERROR_MARKER,
    REFINEMENT_ERROR_MARKER, STORY_ACKNOWLEDGEMENT,
};
use crate::errors::{DilemmaflowError, TransitionError, ValidationError};
use crate::events::{EventSink, NoOpEventSink};
use crate::observability::SpanTimer;
use crate::prompt::{build_refinement_prompt, build_stage_prompt};
use crate::state::{BranchSelection, PipelineState};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of [`StageController::ensure_generated`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// A record was appended for `stage`.
    Generated {
        /// Catalog position of the generated stage.
        stage: usize,
        /// False if the record holds the generation error marker.
        succeeded: bool,
    },
    /// The cursor stage already had a record; nothing changed.
    AlreadyPresent,
}

/// Drives one pipeline session through the stage catalog.
pub struct StageController {
    catalog: Arc<StageCatalog>,
    state: PipelineState,
    backend: Arc<dyn GenerationBackend>,
    sink: Arc<dyn EventSink>,
}

impl fmt::Debug for StageController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageController")
            .field("stages", &self.catalog.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl StageController {
    /// Creates a controller with a fresh state and no event sink.
    #[must_use]
    pub fn new(catalog: Arc<StageCatalog>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            catalog,
            state: PipelineState::new(),
            backend,
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Binds the fresh state to a known session id.
    #[must_use]
    pub fn with_session_id(mut self, session_id: Uuid) -> Self {
        self.state = PipelineState::with_session_id(session_id);
        self
    }

    /// The stage catalog.
    #[must_use]
    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    /// Read-only view of the pipeline state.
    #[must_use]
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> ControllerPhase {
        self.state.phase()
    }

    /// Index of the cursor stage.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.state.cursor()
    }

    /// The stage under the cursor.
    #[must_use]
    pub fn current_stage(&self) -> &StageDefinition {
        self.catalog
            .get(self.state.cursor())
            .unwrap_or_else(|| self.catalog.input_stage())
    }

    /// Returns true once the last stage has been approved.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Records the story and completes the input stage.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] outside `AwaitingInput` and a
    /// [`ValidationError`] for blank text. State is unchanged on error.
    pub async fn submit_input(&mut self, text: &str) -> Result<(), DilemmaflowError> {
        let phase = self.phase();
        if phase != ControllerPhase::AwaitingInput {
            return Err(TransitionError::invalid_phase("submit input", phase).into());
        }

        let story = text.trim();
        if story.is_empty() {
            return Err(ValidationError::empty_input().into());
        }

        let stage_name = self.catalog.input_stage().name().to_string();
        self.state.set_initial_input(story.to_string());
        self.state
            .push_record(StageRecord::new(&stage_name, story, STORY_ACKNOWLEDGEMENT));
        self.state.advance_cursor();

        info!(
            session_id = %self.state.session_id(),
            stage = %stage_name,
            input_chars = story.len(),
            "story submitted"
        );
        self.sink
            .emit(&PipelineEvent::input_submitted(&stage_name, story.len()))
            .await;
        Ok(())
    }

    /// Generates the cursor stage's record if it does not exist yet.
    ///
    /// The backend is called at most once per stage. A failed or empty
    /// answer is stored as the generation error marker and is not retried.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] in `AwaitingInput`.
    pub async fn ensure_generated(&mut self) -> Result<GenerationOutcome, DilemmaflowError> {
        let position = match self.phase() {
            ControllerPhase::AwaitingGeneration { stage } => stage,
            ControllerPhase::AwaitingUserDecision { .. } | ControllerPhase::Completed => {
                return Ok(GenerationOutcome::AlreadyPresent);
            }
            phase @ ControllerPhase::AwaitingInput => {
                return Err(TransitionError::invalid_phase("generate", phase).into());
            }
        };

        let stage_name = self.current_stage().name().to_string();
        let prompt = build_stage_prompt(&self.catalog, &self.state, position)
            .ok_or_else(|| ValidationError::unknown_stage(&stage_name))?;
        debug!(stage = %stage_name, prompt_chars = prompt.len(), "generating stage");

        let timer = SpanTimer::start(&stage_name);
        let result = usable_text(self.backend.generate(&prompt).await);
        let duration_ms = timer.finish();

        let (response, event, succeeded) = match result {
            Ok(text) => {
                info!(stage = %stage_name, duration_ms, "stage generated");
                let event = PipelineEvent::generated(&stage_name, duration_ms, prompt.len());
                (text, event, true)
            }
            Err(error) => {
                warn!(stage = %stage_name, %error, "generation failed, storing error marker");
                let event = PipelineEvent::generation_failed(&stage_name, &error.to_string());
                (GENERATION_ERROR_MARKER.to_string(), event, false)
            }
        };

        self.state
            .push_record(StageRecord::new(&stage_name, prompt, response));
        self.sink.emit(&event).await;

        Ok(GenerationOutcome::Generated {
            stage: position,
            succeeded,
        })
    }

    /// Regenerates the cursor stage's response from user feedback.
    ///
    /// The response and feedback are overwritten in place. A failed
    /// refinement stores the refinement error marker and still records the
    /// feedback.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] unless a decision is pending, and a
    /// [`ValidationError`] if `stage` is not the cursor stage or the feedback
    /// is blank. State is unchanged on error.
    pub async fn refine(&mut self, stage: &str, feedback: &str) -> Result<(), DilemmaflowError> {
        self.check_decision("refine", stage)?;

        if feedback.trim().is_empty() {
            return Err(ValidationError::empty_feedback(stage).into());
        }

        let current_response = self
            .state
            .current_record()
            .map(|record| record.response().to_string())
            .ok_or_else(|| TransitionError::invalid_phase("refine", self.phase()))?;
        let prompt = build_refinement_prompt(feedback, &current_response);

        let timer = SpanTimer::start(stage);
        let result = usable_text(self.backend.generate(&prompt).await);
        let duration_ms = timer.finish();

        let (response, succeeded) = match result {
            Ok(text) => {
                info!(stage = %stage, duration_ms, "stage refined");
                (text, true)
            }
            Err(error) => {
                warn!(stage = %stage, %error, "refinement failed, storing error marker");
                (REFINEMENT_ERROR_MARKER.to_string(), false)
            }
        };

        if let Some(record) = self.state.current_record_mut() {
            record.apply_refinement(response, feedback.to_string());
        }
        self.sink
            .emit(&PipelineEvent::refined(stage, feedback, succeeded))
            .await;
        Ok(())
    }

    /// Accepts the cursor stage and moves to the next one.
    ///
    /// Approving the last stage finishes the pipeline; the cursor stays put.
    /// Returns the phase after the transition.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] unless a decision is pending, and a
    /// [`ValidationError`] if `stage` is not the cursor stage.
    pub async fn approve(&mut self, stage: &str) -> Result<ControllerPhase, DilemmaflowError> {
        self.check_decision("approve", stage)?;

        let position = self.state.cursor();
        if position < self.catalog.last_index() {
            self.state.advance_cursor();
            let next = self.current_stage().name().to_string();
            info!(stage = %stage, next_stage = %next, "stage approved");
            self.sink
                .emit(&PipelineEvent::approved(stage, Some(next.as_str())))
                .await;
        } else {
            self.state.mark_finished();
            info!(stage = %stage, stages = self.catalog.len(), "pipeline completed");
            self.sink.emit(&PipelineEvent::approved(stage, None)).await;
            self.sink
                .emit(&PipelineEvent::completed(self.catalog.len()))
                .await;
        }

        Ok(self.phase())
    }

    /// Pins one option of a branchable stage for later prompts.
    ///
    /// The last selection wins. Cursor and log are never touched.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the source stage is unknown, not
    /// branchable, or has no record yet.
    pub async fn select_branch(&mut self, selection: BranchSelection) -> Result<(), DilemmaflowError> {
        let source = selection.source_stage();
        let definition = self
            .catalog
            .by_name(source)
            .ok_or_else(|| ValidationError::unknown_stage(source))?;
        if !definition.is_branchable() {
            return Err(ValidationError::not_branchable(source).into());
        }
        if self.state.record_for(source).is_none() {
            return Err(ValidationError::branch_source_pending(source).into());
        }

        info!(source_stage = %source, label = %selection.label(), "branch selected");
        let event = PipelineEvent::branch_selected(source, selection.label());
        self.state.set_branch_selection(selection);
        self.sink.emit(&event).await;
        Ok(())
    }

    /// Drops the active branch selection, returning it.
    pub async fn clear_branch(&mut self) -> Option<BranchSelection> {
        let cleared = self.state.clear_branch_selection();
        if cleared.is_some() {
            info!("branch selection cleared");
            self.sink.emit(&PipelineEvent::branch_cleared()).await;
        }
        cleared
    }

    /// Checks that a decision on `stage` is pending.
    fn check_decision(&self, operation: &str, stage: &str) -> Result<(), DilemmaflowError> {
        match self.phase() {
            ControllerPhase::AwaitingUserDecision { .. } => {}
            ControllerPhase::Completed => return Err(TransitionError::finished(operation).into()),
            phase => return Err(TransitionError::invalid_phase(operation, phase).into()),
        }

        if self.catalog.position(stage).is_none() {
            return Err(ValidationError::unknown_stage(stage).into());
        }
        let current = self.current_stage().name();
        if current != stage {
            return Err(ValidationError::stage_not_current(stage, current).into());
        }
        Ok(())
    }
}
