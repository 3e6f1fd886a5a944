//! Mock plugins for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::context::Context;
use crate::errors::PluginError;
use crate::plugin::Plugin;

/// A plugin that increments a shared counter each time it runs.
#[derive(Debug, Clone)]
pub struct CountingPlugin {
    name: String,
    counter: Arc<AtomicUsize>,
}

impl CountingPlugin {
    /// Creates a counting plugin with its own counter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_counter(name, Arc::new(AtomicUsize::new(0)))
    }

    /// Creates a counting plugin sharing `counter`.
    #[must_use]
    pub fn with_counter(name: impl Into<String>, counter: Arc<AtomicUsize>) -> Self {
        Self {
            name: name.into(),
            counter,
        }
    }

    /// Returns the shared counter.
    #[must_use]
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.counter)
    }

    /// Returns the number of recorded runs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }
}

impl<D> Plugin<D> for CountingPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, _ctx: &mut Context<D>) -> Result<(), PluginError> {
        self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A plugin that always fails with a fixed message.
#[derive(Debug)]
pub struct FailingPlugin {
    name: String,
    message: String,
    calls: AtomicUsize,
}

impl FailingPlugin {
    /// Creates a new failing plugin.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns the number of times the plugin was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<D> Plugin<D> for FailingPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, _ctx: &mut Context<D>) -> Result<(), PluginError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(PluginError::message(self.message.clone()))
    }
}

/// A plugin that appends its index to a metadata array.
///
/// A chain of recording plugins with indices `0..n` leaves `[0, 1, .., n-1]`
/// under the key when run in order.
#[derive(Debug, Clone)]
pub struct RecordingPlugin {
    index: usize,
    key: String,
}

impl RecordingPlugin {
    /// Creates a plugin recording `index` under the default `"order"` key.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self::with_key(index, "order")
    }

    /// Creates a plugin recording `index` under `key`.
    #[must_use]
    pub fn with_key(index: usize, key: impl Into<String>) -> Self {
        Self {
            index,
            key: key.into(),
        }
    }
}

impl<D> Plugin<D> for RecordingPlugin {
    fn name(&self) -> &str {
        "recording"
    }

    fn execute(&self, ctx: &mut Context<D>) -> Result<(), PluginError> {
        ctx.metadata_mut().push(self.key.clone(), self.index)
    }
}
