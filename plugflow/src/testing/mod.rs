//! Testing utilities for plugflow pipelines.
//!
//! This module provides:
//! - Mock plugins with observable side effects
//! - Assertions for stage errors and recorded metadata

mod assertions;
mod mocks;

pub use assertions::{assert_no_errors, assert_recorded_indices, assert_stage_failed};
pub use mocks::{CountingPlugin, FailingPlugin, RecordingPlugin};
