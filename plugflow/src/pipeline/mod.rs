//! Pipeline building and execution.
//!
//! This module provides:
//! - The sequential [`Pipeline`] executor
//! - [`ErrorStrategy`] failure handling modes
//! - Serializable [`PipelineSpec`] configuration

mod executor;
mod spec;
mod strategy;

pub use executor::Pipeline;
pub use spec::PipelineSpec;
pub use strategy::ErrorStrategy;
