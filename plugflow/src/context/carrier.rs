//! The per-run context carrier.

use super::bags::{narrow, ValueBag};
use crate::errors::{PluginError, StageError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// The carrier passed through every plugin of one pipeline run.
///
/// A context holds the primary `data` payload, a `metadata` bag for values
/// plugins hand to later stages, a `state` bag for values meant to outlive
/// the run, and the stage errors collected under
/// [`ErrorStrategy::ContinueOnError`](crate::pipeline::ErrorStrategy::ContinueOnError).
///
/// `metadata` and `state` behave identically; the split is a naming
/// convention only.
#[derive(Debug)]
pub struct Context<D = Value> {
    data: D,
    metadata: ValueBag,
    state: ValueBag,
    errors: Vec<StageError>,
    run_id: Uuid,
}

impl<D> Context<D> {
    /// Creates a new context holding `data`.
    #[must_use]
    pub fn new(data: D) -> Self {
        Self {
            data,
            metadata: ValueBag::new(),
            state: ValueBag::new(),
            errors: Vec::new(),
            run_id: Uuid::new_v4(),
        }
    }

    /// Seeds the state bag, typically with state carried over from a previous run.
    #[must_use]
    pub fn with_state(mut self, state: ValueBag) -> Self {
        self.state = state;
        self
    }

    /// Seeds the metadata bag.
    #[must_use]
    pub fn with_metadata(mut self, metadata: ValueBag) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the correlation id of this run.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns the primary data.
    #[must_use]
    pub const fn data(&self) -> &D {
        &self.data
    }

    /// Returns the primary data mutably.
    pub fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    /// Replaces the primary data.
    pub fn set_data(&mut self, data: D) {
        self.data = data;
    }

    /// Replaces the primary data, returning the previous value.
    pub fn replace_data(&mut self, data: D) -> D {
        std::mem::replace(&mut self.data, data)
    }

    /// Consumes the context, returning the primary data.
    #[must_use]
    pub fn into_data(self) -> D {
        self.data
    }

    /// Returns the metadata bag.
    #[must_use]
    pub const fn metadata(&self) -> &ValueBag {
        &self.metadata
    }

    /// Returns the metadata bag mutably.
    pub fn metadata_mut(&mut self) -> &mut ValueBag {
        &mut self.metadata
    }

    /// Stores a metadata value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key, value);
    }

    /// Gets a metadata value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Gets a metadata value deserialized into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::TypeMismatch`] if the value does not deserialize as `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PluginError> {
        self.metadata.get_as(key)
    }

    /// Returns the state bag.
    #[must_use]
    pub const fn state(&self) -> &ValueBag {
        &self.state
    }

    /// Returns the state bag mutably.
    pub fn state_mut(&mut self) -> &mut ValueBag {
        &mut self.state
    }

    /// Stores a state value.
    pub fn set_state(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.state.insert(key, value);
    }

    /// Gets a state value.
    #[must_use]
    pub fn get_state(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    /// Gets a state value deserialized into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::TypeMismatch`] if the value does not deserialize as `T`.
    pub fn get_state_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PluginError> {
        self.state.get_as(key)
    }

    /// Consumes the context, returning the state bag for the next run.
    #[must_use]
    pub fn into_state(self) -> ValueBag {
        self.state
    }

    /// Returns the collected stage errors in the order they occurred.
    #[must_use]
    pub fn errors(&self) -> &[StageError] {
        &self.errors
    }

    /// Records a stage error.
    pub fn add_error(&mut self, error: StageError) {
        self.errors.push(error);
    }

    /// Returns true if any stage errors were collected.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Takes the collected stage errors, leaving the list empty.
    pub fn take_errors(&mut self) -> Vec<StageError> {
        std::mem::take(&mut self.errors)
    }
}

impl<D: Default> Default for Context<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl Context<Value> {
    /// Narrows the JSON payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::TypeMismatch`] if the payload does not deserialize as `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, PluginError> {
        narrow("data", &self.data)
    }

    /// Serializes `value` and makes it the new payload.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Serialization`] if `value` cannot be serialized.
    pub fn set_data_as<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), PluginError> {
        self.data =
            serde_json::to_value(value).map_err(|e| PluginError::Serialization(e.to_string()))?;
        Ok(())
    }
}
