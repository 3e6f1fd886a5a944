//! Test assertions for pipeline runs.

use crate::context::Context;
use crate::errors::StageError;

/// Asserts that a stage error was raised by the plugin at `index`.
pub fn assert_stage_failed(error: &StageError, index: usize) {
    assert_eq!(
        error.index, index,
        "Expected failure at index {}, got {}: {}",
        index, error.index, error
    );
}

/// Asserts that the context collected no stage errors.
pub fn assert_no_errors<D>(ctx: &Context<D>) {
    assert!(
        !ctx.has_errors(),
        "Expected no errors, got: {:?}",
        ctx.errors().iter().map(ToString::to_string).collect::<Vec<_>>()
    );
}

/// Asserts that the metadata array under `key` holds exactly `expected`.
pub fn assert_recorded_indices<D>(ctx: &Context<D>, key: &str, expected: &[usize]) {
    let recorded: Vec<usize> = match ctx.get_as(key) {
        Ok(Some(recorded)) => recorded,
        Ok(None) => Vec::new(),
        Err(e) => panic!("Metadata '{key}' is not a list of indices: {e}"),
    };
    assert_eq!(
        recorded, expected,
        "Expected indices {:?} under '{}', got {:?}",
        expected, key, recorded
    );
}
