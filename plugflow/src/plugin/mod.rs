//! Plugin trait and implementations.
//!
//! Plugins are the units of work in a plugflow pipeline.

use crate::context::Context;
use crate::errors::PluginError;
use serde_json::Value;
use std::fmt::Debug;

/// Trait for pipeline plugins.
///
/// A plugin reads and writes the context it is handed and reports success or
/// failure. Mutations made before a failure are not rolled back.
///
/// One instance may be installed in several pipelines and run concurrently
/// against different contexts, so implementations should not keep mutable
/// state of their own.
pub trait Plugin<D = Value>: Send + Sync {
    /// Returns the name of the plugin.
    ///
    /// Defaults to the implementing type's name.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        let path = full.split('<').next().unwrap_or(full);
        path.rsplit("::").next().unwrap_or(path)
    }

    /// Executes the plugin.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The context of the current run
    fn execute(&self, ctx: &mut Context<D>) -> Result<(), PluginError>;
}

/// A simple function-based plugin.
pub struct FnPlugin<F> {
    name: String,
    func: F,
}

impl<F> FnPlugin<F> {
    /// Creates a new function-based plugin.
    pub fn new<D>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut Context<D>) -> Result<(), PluginError> + Send + Sync,
    {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnPlugin<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnPlugin")
            .field("name", &self.name)
            .finish()
    }
}

impl<D, F> Plugin<D> for FnPlugin<F>
where
    F: Fn(&mut Context<D>) -> Result<(), PluginError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: &mut Context<D>) -> Result<(), PluginError> {
        (self.func)(ctx)
    }
}

/// A plugin that does nothing.
#[derive(Debug, Clone)]
pub struct NoOpPlugin {
    name: String,
}

impl NoOpPlugin {
    /// Creates a new no-op plugin.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl<D> Plugin<D> for NoOpPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, _ctx: &mut Context<D>) -> Result<(), PluginError> {
        Ok(())
    }
}
