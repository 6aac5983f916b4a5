//! Testing utilities for dilemmaflow pipelines.
//!
//! This module provides:
//! - Scripted and failing generation backends
//! - Catalog fixtures and a controller harness
//! - Assertions over pipeline state and emitted events

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_event_types, assert_log_cursor_coupling, assert_log_in_catalog_order, assert_record,
};
pub use fixtures::{branching_catalog, three_stage_catalog, TestHarness};
pub use mocks::{FailingBackend, ScriptedBackend};
