//! # Dilemmaflow
//!
//! A human-in-the-loop staged ideation pipeline. A user's story is walked
//! through a fixed sequence of model-generated stages (focus areas, issues,
//! tensions, dilemmas, value propositions, SWOT, business model canvas,
//! business plan). Each stage is generated once, may be refined from user
//! feedback, and must be approved before the next one runs.
//!
//! - **Stage catalog**: ordered stage definitions with prompt templates
//! - **Stage controller**: the state machine owning one session's log
//! - **Generation backends**: a trait seam, with a Gemini implementation
//! - **Structured decode**: optional typed views over stage responses
//! - **Export**: plain-text, JSON and canvas reports
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dilemmaflow::prelude::*;
//! use std::sync::Arc;
//!
//! let backend = Arc::new(GeminiBackend::new(GeminiConfig::new(api_key))?);
//! let mut controller = StageController::new(Arc::new(StageCatalog::dilemma_triangle()), backend);
//!
//! controller.submit_input("A bakery that wastes no bread").await?;
//! controller.ensure_generated().await?;
//! controller.refine("Focus Generation", "Focus on the neighbourhood").await?;
//! controller.approve("Focus Generation").await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod backend;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod core;
pub mod errors;
pub mod events;
pub mod export;
pub mod observability;
pub mod prompt;
pub mod session;
pub mod state;
pub mod structured;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    #[cfg(feature = "gemini")]
    pub use crate::backend::GeminiBackend;
    pub use crate::backend::GenerationBackend;
    pub use crate::catalog::{stage_names, CatalogBuilder, PromptTemplate, StageCatalog, StageDefinition};
    pub use crate::config::{AppConfig, GeminiConfig};
    pub use crate::controller::{GenerationOutcome, StageController};
    pub use crate::core::{ControllerPhase, PipelineEvent, StageRecord};
    pub use crate::errors::{
        ConfigError, DilemmaflowError, ExportError, GenerationError, StructuredOutputError,
        TransitionError, ValidationError,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::export::{ReportExporter, ReportFormat};
    pub use crate::observability::init_tracing;
    pub use crate::session::{SessionRegistry, SharedController};
    pub use crate::state::{BranchSelection, PipelineState};
    pub use crate::utils::{generate_uuid, iso_timestamp, Timestamp};
}
