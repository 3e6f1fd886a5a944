//! # Plugflow
//!
//! Sequential plugin pipelines over a shared, per-run context.
//!
//! Plugflow provides:
//!
//! - **Plugins**: single-method units of work that transform a [`Context`](context::Context)
//! - **Context carrier**: a primary payload plus metadata and state bags and collected errors
//! - **Pipelines**: ordered plugin chains with an abort-or-continue error strategy
//! - **Registry**: a thread-safe name directory that builds pipelines from name lists
//!
//! ## Quick Start
//!
//! ```rust
//! use plugflow::prelude::*;
//!
//! let pipeline: Pipeline<String> = Pipeline::new(ErrorStrategy::AbortOnError).with_plugin(
//!     FnPlugin::new("greeter", |ctx: &mut Context<String>| {
//!         let greeting = format!("Hello, {}!", ctx.data());
//!         ctx.set_data(greeting);
//!         Ok(())
//!     }),
//! );
//!
//! let mut ctx = Context::new("World".to_string());
//! pipeline.execute(&mut ctx)?;
//! assert_eq!(ctx.data(), "Hello, World!");
//! # Ok::<(), plugflow::errors::StageError>(())
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

pub mod context;
pub mod errors;
pub mod observability;
pub mod pipeline;
pub mod plugin;
pub mod registry;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::{Context, ValueBag};
    pub use crate::errors::{ConfigError, PlugflowError, PluginError, RegistryError, StageError};
    pub use crate::observability::{init_tracing, LoggingConfig};
    pub use crate::pipeline::{ErrorStrategy, Pipeline, PipelineSpec};
    pub use crate::plugin::{FnPlugin, NoOpPlugin, Plugin};
    pub use crate::registry::PluginRegistry;
}
