//! Plugin registry for composing pipelines by name.

use crate::errors::{PlugflowError, RegistryError};
use crate::pipeline::{ErrorStrategy, Pipeline, PipelineSpec};
use crate::plugin::Plugin;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A thread-safe directory of named plugins.
///
/// Lookups share a read lock and may run concurrently; registration takes
/// the write lock. The registry is usually populated once at startup and
/// shared behind an `Arc`.
pub struct PluginRegistry<D = Value> {
    plugins: RwLock<HashMap<String, Arc<dyn Plugin<D>>>>,
}

impl<D> PluginRegistry<D> {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(HashMap::new()),
        }
    }

    /// Binds `name` to `plugin`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if the name is already bound;
    /// the existing binding is left unchanged.
    pub fn register(
        &self,
        name: impl Into<String>,
        plugin: Arc<dyn Plugin<D>>,
    ) -> Result<(), RegistryError> {
        match self.plugins.write().entry(name.into()) {
            Entry::Occupied(entry) => {
                warn!(plugin = %entry.key(), "Plugin name already registered");
                Err(RegistryError::duplicate_name(entry.key().clone()))
            }
            Entry::Vacant(entry) => {
                debug!(plugin = %entry.key(), "Plugin registered");
                entry.insert(plugin);
                Ok(())
            }
        }
    }

    /// Registers a plugin under its own [`Plugin::name`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if the name is already bound.
    pub fn register_plugin<P>(&self, plugin: P) -> Result<(), RegistryError>
    where
        P: Plugin<D> + 'static,
    {
        let name = plugin.name().to_string();
        self.register(name, Arc::new(plugin))
    }

    /// Looks up a plugin by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no plugin is bound to the name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Plugin<D>>, RegistryError> {
        self.plugins
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(name))
    }

    /// Removes a plugin, returning it.
    ///
    /// Pipelines already built keep their own reference to the plugin.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no plugin is bound to the name.
    pub fn unregister(&self, name: &str) -> Result<Arc<dyn Plugin<D>>, RegistryError> {
        let removed = self
            .plugins
            .write()
            .remove(name)
            .ok_or_else(|| RegistryError::not_found(name))?;
        debug!(plugin = %name, "Plugin unregistered");
        Ok(removed)
    }

    /// Checks if a plugin is bound to the name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.read().contains_key(name)
    }

    /// Lists registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.plugins.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }

    /// Builds a pipeline by resolving `names` in order.
    ///
    /// Resolution stops at the first unknown name and the partial pipeline
    /// is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Build`] wrapping the [`RegistryError::NotFound`]
    /// of the first unresolved name.
    pub fn build_pipeline<I, S>(
        &self,
        names: I,
        strategy: ErrorStrategy,
    ) -> Result<Pipeline<D>, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pipeline = Pipeline::new(strategy);

        for (step, name) in names.into_iter().enumerate() {
            let name = name.as_ref();
            let plugin = self
                .get(name)
                .map_err(|source| RegistryError::build(step, name, source))?;
            pipeline.use_plugin(plugin);
        }

        debug!(plugins = pipeline.len(), %strategy, "Pipeline built");
        Ok(pipeline)
    }

    /// Validates `spec` and builds the named pipeline it describes.
    ///
    /// The spec's metadata is carried onto the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`PlugflowError::Config`] if the spec is invalid, or
    /// [`PlugflowError::Registry`] if a plugin name does not resolve.
    pub fn build_from_spec(&self, spec: &PipelineSpec) -> Result<Pipeline<D>, PlugflowError> {
        spec.validate()?;
        let pipeline = self
            .build_pipeline(&spec.plugins, spec.strategy)?
            .with_name(spec.name.clone());
        Ok(spec
            .metadata
            .iter()
            .fold(pipeline, |pipeline, (key, value)| {
                pipeline.with_metadata(key.clone(), value.clone())
            }))
    }
}

impl<D> Default for PluginRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> std::fmt::Debug for PluginRegistry<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::errors::{ConfigError, PluginError};
    use crate::plugin::{FnPlugin, NoOpPlugin};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::error::Error as _;

    fn tagging(tag: &'static str) -> Arc<dyn Plugin> {
        Arc::new(FnPlugin::new(tag, move |ctx: &mut Context| {
            ctx.metadata_mut().push("tags", tag)?;
            Ok(())
        }))
    }

    #[test]
    fn test_registry_creation() {
        let registry: PluginRegistry = PluginRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.names().is_empty());
    }

    #[test]
    fn test_register_and_get() {
        let registry = PluginRegistry::new();
        registry.register("a", tagging("a")).unwrap();

        assert!(registry.contains("a"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a").unwrap().name(), "a");
    }

    #[test]
    fn test_duplicate_name_keeps_first_binding() {
        let registry = PluginRegistry::new();
        registry.register("x", tagging("first")).unwrap();

        let err = registry.register("x", tagging("second")).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(err.name(), "x");

        assert_eq!(registry.get("x").unwrap().name(), "first");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let registry: PluginRegistry = PluginRegistry::new();
        let err = registry.get("missing").err().unwrap();

        assert!(err.is_not_found());
        assert_eq!(err.name(), "missing");
    }

    #[test]
    fn test_register_plugin_uses_own_name() {
        let registry: PluginRegistry<()> = PluginRegistry::new();
        registry.register_plugin(NoOpPlugin::new("noop")).unwrap();

        assert_eq!(registry.names(), vec!["noop".to_string()]);
        assert!(registry.register_plugin(NoOpPlugin::new("noop")).is_err());
    }

    #[test]
    fn test_unregister() {
        let registry = PluginRegistry::new();
        registry.register("a", tagging("a")).unwrap();

        let removed = registry.unregister("a").unwrap();
        assert_eq!(removed.name(), "a");
        assert!(!registry.contains("a"));
        assert!(registry.unregister("a").err().unwrap().is_not_found());
    }

    #[test]
    fn test_names_are_sorted() {
        let registry = PluginRegistry::new();
        for name in ["c", "a", "b"] {
            registry.register(name, tagging("t")).unwrap();
        }
        assert_eq!(registry.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_build_pipeline_in_order() {
        let registry = PluginRegistry::new();
        registry.register("a", tagging("a")).unwrap();
        registry.register("b", tagging("b")).unwrap();

        let pipeline = registry
            .build_pipeline(["b", "a", "b"], ErrorStrategy::AbortOnError)
            .unwrap();
        assert_eq!(pipeline.plugin_names(), vec!["b", "a", "b"]);

        let mut ctx = Context::new(json!(null));
        pipeline.execute(&mut ctx).unwrap();
        assert_eq!(ctx.get("tags"), Some(&json!(["b", "a", "b"])));
    }

    #[test]
    fn test_build_pipeline_missing_name() {
        let registry = PluginRegistry::new();
        registry.register("a", tagging("a")).unwrap();
        registry.register("b", tagging("b")).unwrap();

        let err = registry
            .build_pipeline(["a", "missing", "b"], ErrorStrategy::AbortOnError)
            .err()
            .unwrap();

        assert!(err.is_build());
        assert_eq!(err.name(), "missing");
        assert!(matches!(err, RegistryError::Build { step: 1, .. }));
        assert!(err.to_string().contains("missing"));

        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "plugin 'missing' not found in registry");
    }

    #[test]
    fn test_build_empty_pipeline() {
        let registry: PluginRegistry = PluginRegistry::new();
        let pipeline = registry
            .build_pipeline(Vec::<String>::new(), ErrorStrategy::ContinueOnError)
            .unwrap();

        assert!(pipeline.is_empty());
        assert_eq!(pipeline.strategy(), ErrorStrategy::ContinueOnError);
    }

    #[test]
    fn test_build_from_spec() {
        let registry = PluginRegistry::new();
        registry.register("a", tagging("a")).unwrap();

        let spec = PipelineSpec::new("tagger", ErrorStrategy::ContinueOnError)
            .unwrap()
            .with_plugins(["a", "a"])
            .with_metadata("version", json!(3));
        let pipeline = registry.build_from_spec(&spec).unwrap();

        assert_eq!(pipeline.name(), Some("tagger"));
        assert_eq!(pipeline.metadata().get("version"), Some(&json!(3)));
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.strategy(), ErrorStrategy::ContinueOnError);
    }

    #[test]
    fn test_build_from_spec_errors() {
        let registry: PluginRegistry = PluginRegistry::new();

        let mut invalid = PipelineSpec::new("ok", ErrorStrategy::AbortOnError).unwrap();
        invalid.name = String::new();
        let err = registry.build_from_spec(&invalid).unwrap_err();
        assert!(matches!(err, PlugflowError::Config(ConfigError::Invalid(_))));

        let unresolved = PipelineSpec::new("p", ErrorStrategy::AbortOnError)
            .unwrap()
            .with_plugins(["ghost"]);
        let err = registry.build_from_spec(&unresolved).unwrap_err();
        assert!(matches!(err, PlugflowError::Registry(RegistryError::Build { .. })));
    }

    #[test]
    fn test_registered_plugin_failure_is_wrapped() {
        let registry = PluginRegistry::new();
        registry
            .register(
                "fails",
                Arc::new(FnPlugin::new("fails", |_ctx: &mut Context| {
                    Err(PluginError::message("boom"))
                })),
            )
            .unwrap();

        let pipeline = registry
            .build_pipeline(["fails"], ErrorStrategy::AbortOnError)
            .unwrap();
        let err = pipeline.execute(&mut Context::new(json!(null))).unwrap_err();
        assert_eq!(err.to_string(), "plugin 0 (fails) failed: boom");
    }
}
