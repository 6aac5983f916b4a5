//! Pipeline state: the session's mutable record.
//!
//! A [`PipelineState`] is owned by exactly one controller. Its fields are
//! read-only to everyone else; the crate-private mutators keep the
//! cursor/log coupling intact:
//!
//! - `cursor` never decreases
//! - `log.len()` is always `cursor` or `cursor + 1`
//! - records are only appended, never removed or reordered

mod branch;

pub use branch::BranchSelection;

use crate::core::{ControllerPhase, StageRecord};
use crate::utils::{generate_uuid, now_utc, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The mutable record of one pipeline session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    session_id: Uuid,
    created_at: Timestamp,
    cursor: usize,
    log: Vec<StageRecord>,
    initial_input: String,
    branch_selection: Option<BranchSelection>,
    finished: bool,
}

impl PipelineState {
    /// Creates a fresh state: cursor 0, empty log, empty input.
    #[must_use]
    pub fn new() -> Self {
        Self::with_session_id(generate_uuid())
    }

    /// Creates a fresh state for a known session id.
    #[must_use]
    pub fn with_session_id(session_id: Uuid) -> Self {
        Self {
            session_id,
            created_at: now_utc(),
            cursor: 0,
            log: Vec::new(),
            initial_input: String::new(),
            branch_selection: None,
            finished: false,
        }
    }

    /// The session this state belongs to.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// When the session started.
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Index of the stage awaiting generation or a user decision.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The ordered stage log.
    #[must_use]
    pub fn log(&self) -> &[StageRecord] {
        &self.log
    }

    /// The record at catalog position `position`, if generated.
    #[must_use]
    pub fn record(&self, position: usize) -> Option<&StageRecord> {
        self.log.get(position)
    }

    /// The record for the stage named `stage_name`, if generated.
    #[must_use]
    pub fn record_for(&self, stage_name: &str) -> Option<&StageRecord> {
        self.log.iter().find(|record| record.stage_name() == stage_name)
    }

    /// The record for the cursor stage, if it exists.
    #[must_use]
    pub fn current_record(&self) -> Option<&StageRecord> {
        self.log.get(self.cursor)
    }

    /// The story text, empty until the input stage is submitted.
    #[must_use]
    pub fn initial_input(&self) -> &str {
        &self.initial_input
    }

    /// The active branch selection, if any.
    #[must_use]
    pub fn branch_selection(&self) -> Option<&BranchSelection> {
        self.branch_selection.as_ref()
    }

    /// True once the last stage has been approved.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The controller phase implied by this state.
    #[must_use]
    pub fn phase(&self) -> ControllerPhase {
        ControllerPhase::derive(self.cursor, self.log.len(), self.finished)
    }

    /// Returns true if the cursor stage still needs a record.
    #[must_use]
    pub fn needs_generation(&self) -> bool {
        !self.finished && self.cursor > 0 && self.log.len() == self.cursor
    }

    pub(crate) fn set_initial_input(&mut self, text: String) {
        self.initial_input = text;
    }

    /// Appends the record for the cursor stage.
    pub(crate) fn push_record(&mut self, record: StageRecord) {
        debug_assert_eq!(self.log.len(), self.cursor, "log must be one behind the cursor");
        self.log.push(record);
    }

    pub(crate) fn current_record_mut(&mut self) -> Option<&mut StageRecord> {
        self.log.get_mut(self.cursor)
    }

    pub(crate) fn advance_cursor(&mut self) {
        debug_assert_eq!(self.log.len(), self.cursor + 1, "cursor stage must have a record");
        self.cursor += 1;
    }

    pub(crate) fn mark_finished(&mut self) {
        self.finished = true;
    }

    pub(crate) fn set_branch_selection(&mut self, selection: BranchSelection) {
        self.branch_selection = Some(selection);
    }

    pub(crate) fn clear_branch_selection(&mut self) -> Option<BranchSelection> {
        self.branch_selection.take()
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = PipelineState::new();
        assert_eq!(state.cursor(), 0);
        assert!(state.log().is_empty());
        assert_eq!(state.initial_input(), "");
        assert!(state.branch_selection().is_none());
        assert!(!state.is_finished());
        assert_eq!(state.phase(), ControllerPhase::AwaitingInput);
    }

    #[test]
    fn test_push_and_advance() {
        let mut state = PipelineState::new();
        state.push_record(StageRecord::new("Input", "story", "ok"));
        assert_eq!(state.phase(), ControllerPhase::AwaitingUserDecision { stage: 0 });

        state.advance_cursor();
        assert!(state.needs_generation());
        assert_eq!(state.phase(), ControllerPhase::AwaitingGeneration { stage: 1 });
        assert!(state.current_record().is_none());
        assert_eq!(state.record_for("Input").map(StageRecord::prompt), Some("story"));
    }

    #[test]
    fn test_session_id_is_kept() {
        let id = generate_uuid();
        let state = PipelineState::with_session_id(id);
        assert_eq!(state.session_id(), id);
    }

    #[test]
    fn test_branch_selection_set_and_clear() {
        let mut state = PipelineState::new();
        state.set_branch_selection(BranchSelection::new("SWOT Analysis", serde_json::json!({"title": "A"})));
        assert_eq!(state.branch_selection().map(BranchSelection::label), Some("A"));

        let cleared = state.clear_branch_selection();
        assert!(cleared.is_some());
        assert!(state.branch_selection().is_none());
    }
}
