//! Core domain model types for dilemmaflow.
//!
//! This module contains the fundamental types used throughout the crate:
//! - Stage records, the append-only log entries
//! - Controller phases of the pipeline state machine
//! - Pipeline events for observability

mod event;
mod phase;
mod record;

pub use event::PipelineEvent;
pub use phase::ControllerPhase;
pub use record::{
    StageRecord, GENERATION_ERROR_MARKER, REFINEMENT_ERROR_MARKER, STORY_ACKNOWLEDGEMENT,
};
