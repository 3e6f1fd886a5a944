//! Sequential pipeline executor.
//!
//! Runs plugins strictly in insertion order on the caller's thread.

use super::ErrorStrategy;
use crate::context::Context;
use crate::errors::StageError;
use crate::plugin::Plugin;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, debug_span, trace, warn};

/// An ordered chain of plugins sharing one error strategy.
///
/// A pipeline holds no per-run state. `execute` takes `&self`, so one
/// instance can serve many runs, including concurrent runs on different
/// contexts. Appending requires `&mut self` and therefore cannot overlap a run.
pub struct Pipeline<D = Value> {
    name: Option<String>,
    plugins: Vec<Arc<dyn Plugin<D>>>,
    strategy: ErrorStrategy,
    metadata: HashMap<String, Value>,
}

impl<D> Pipeline<D> {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new(strategy: ErrorStrategy) -> Self {
        Self {
            name: None,
            plugins: Vec::new(),
            strategy,
            metadata: HashMap::new(),
        }
    }

    /// Creates an empty named pipeline.
    #[must_use]
    pub fn named(name: impl Into<String>, strategy: ErrorStrategy) -> Self {
        Self::new(strategy).with_name(name)
    }

    /// Sets the pipeline name used in logs.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attaches descriptive metadata to the pipeline.
    ///
    /// Pipeline metadata is never copied into a run's context.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Appends a shared plugin and returns the pipeline for chaining.
    pub fn use_plugin(&mut self, plugin: Arc<dyn Plugin<D>>) -> &mut Self {
        self.plugins.push(plugin);
        self
    }

    /// Appends a plugin.
    #[must_use]
    pub fn with_plugin<P>(mut self, plugin: P) -> Self
    where
        P: Plugin<D> + 'static,
    {
        self.use_plugin(Arc::new(plugin));
        self
    }

    /// Appends a shared plugin.
    #[must_use]
    pub fn with_shared(mut self, plugin: Arc<dyn Plugin<D>>) -> Self {
        self.use_plugin(plugin);
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the pipeline metadata.
    #[must_use]
    pub const fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    /// Returns the error strategy.
    #[must_use]
    pub const fn strategy(&self) -> ErrorStrategy {
        self.strategy
    }

    /// Returns the number of plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if no plugins were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Returns the plugin names in execution order.
    #[must_use]
    pub fn plugin_names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.name().to_string()).collect()
    }

    /// Runs every plugin in order against `ctx`.
    ///
    /// Under [`ErrorStrategy::AbortOnError`] the first failure stops the run
    /// and is returned; the context keeps the mutations made so far. Under
    /// [`ErrorStrategy::ContinueOnError`] each failure is recorded in
    /// [`Context::errors`] and this method returns `Ok(())`.
    ///
    /// Running twice against the same context runs every plugin twice; no
    /// idempotence is implied.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] carrying the failing plugin's index and cause
    /// under [`ErrorStrategy::AbortOnError`].
    pub fn execute(&self, ctx: &mut Context<D>) -> Result<(), StageError> {
        let span = debug_span!(
            "pipeline.execute",
            pipeline = self.name.as_deref().unwrap_or("anonymous"),
            run_id = %ctx.run_id(),
            strategy = %self.strategy,
            plugins = self.plugins.len()
        );
        let _guard = span.enter();

        for (index, plugin) in self.plugins.iter().enumerate() {
            let started = Instant::now();
            trace!(index, plugin = plugin.name(), "Plugin started");

            let cause = match plugin.execute(ctx) {
                Ok(()) => {
                    debug!(
                        index,
                        plugin = plugin.name(),
                        elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
                        "Plugin completed"
                    );
                    continue;
                }
                Err(cause) => cause,
            };

            let error = StageError::new(index, plugin.name(), cause);
            match self.strategy {
                ErrorStrategy::AbortOnError => {
                    warn!(
                        index,
                        plugin = plugin.name(),
                        error = %error.source,
                        skipped = self.plugins.len() - index - 1,
                        "Plugin failed, aborting pipeline"
                    );
                    return Err(error);
                }
                ErrorStrategy::ContinueOnError => {
                    warn!(
                        index,
                        plugin = plugin.name(),
                        error = %error.source,
                        "Plugin failed, continuing"
                    );
                    ctx.add_error(error);
                }
            }
        }

        debug!(errors = ctx.errors().len(), "Pipeline completed");
        Ok(())
    }
}

impl<D> Default for Pipeline<D> {
    fn default() -> Self {
        Self::new(ErrorStrategy::default())
    }
}

impl<D> Clone for Pipeline<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            plugins: self.plugins.clone(),
            strategy: self.strategy,
            metadata: self.metadata.clone(),
        }
    }
}

impl<D> std::fmt::Debug for Pipeline<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("plugins", &self.plugin_names())
            .field("strategy", &self.strategy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PluginError;
    use crate::plugin::{FnPlugin, NoOpPlugin};
    use serde_json::json;

    fn greeter() -> FnPlugin<impl Fn(&mut Context<String>) -> Result<(), PluginError> + Send + Sync> {
        FnPlugin::new("greeter", |ctx: &mut Context<String>| {
            let greeting = format!("Hello, {}!", ctx.data());
            ctx.set_data(greeting);
            Ok(())
        })
    }

    #[test]
    fn test_empty_pipeline_succeeds() {
        let pipeline: Pipeline<()> = Pipeline::new(ErrorStrategy::AbortOnError);
        let mut ctx = Context::new(());

        assert!(pipeline.is_empty());
        assert!(pipeline.execute(&mut ctx).is_ok());
        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_hello_world() {
        let pipeline: Pipeline<String> =
            Pipeline::new(ErrorStrategy::AbortOnError).with_plugin(greeter());
        let mut ctx = Context::new("World".to_string());

        pipeline.execute(&mut ctx).unwrap();
        assert_eq!(ctx.data(), "Hello, World!");
    }

    #[test]
    fn test_use_plugin_chains() {
        let mut pipeline: Pipeline<()> = Pipeline::named("chain", ErrorStrategy::ContinueOnError);
        pipeline
            .use_plugin(Arc::new(NoOpPlugin::new("first")))
            .use_plugin(Arc::new(NoOpPlugin::new("second")));

        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.name(), Some("chain"));
        assert_eq!(pipeline.strategy(), ErrorStrategy::ContinueOnError);
        assert_eq!(pipeline.plugin_names(), vec!["first", "second"]);
    }

    #[test]
    fn test_partial_mutation_survives_abort() {
        let pipeline: Pipeline = Pipeline::new(ErrorStrategy::AbortOnError)
            .with_plugin(FnPlugin::new("writes", |ctx: &mut Context| {
                ctx.set("written", true);
                Err(PluginError::message("after write"))
            }))
            .with_plugin(FnPlugin::new("never", |ctx: &mut Context| {
                ctx.set("never", true);
                Ok(())
            }));

        let mut ctx = Context::new(json!(null));
        let err = pipeline.execute(&mut ctx).unwrap_err();

        assert_eq!(err.index, 0);
        assert_eq!(err.plugin, "writes");
        assert_eq!(ctx.get("written"), Some(&json!(true)));
        assert_eq!(ctx.get("never"), None);
        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_clone_shares_plugins() {
        let pipeline: Pipeline<String> =
            Pipeline::new(ErrorStrategy::AbortOnError).with_plugin(greeter());
        let copy = pipeline.clone();

        let mut ctx = Context::new("Rust".to_string());
        copy.execute(&mut ctx).unwrap();
        assert_eq!(ctx.data(), "Hello, Rust!");
        assert_eq!(pipeline.len(), copy.len());
    }

    #[test]
    fn test_pipeline_metadata() {
        let pipeline: Pipeline = Pipeline::default().with_metadata("owner", json!("moderation"));
        let mut ctx = Context::new(json!(null));
        pipeline.execute(&mut ctx).unwrap();

        assert_eq!(pipeline.metadata().get("owner"), Some(&json!("moderation")));
        assert_eq!(pipeline.clone().metadata().len(), 1);
        assert!(ctx.metadata().is_empty());
    }

    #[test]
    fn test_debug_lists_plugin_names() {
        let pipeline: Pipeline<()> =
            Pipeline::default().with_plugin(NoOpPlugin::new("noop"));
        let debug = format!("{pipeline:?}");

        assert!(debug.contains("noop"));
        assert!(debug.contains("AbortOnError"));
    }
}
