//! Context management for pipeline runs.
//!
//! This module provides:
//! - The per-run [`Context`] carrier
//! - [`ValueBag`] maps for metadata and state

mod bags;
mod carrier;

pub use bags::ValueBag;
pub use carrier::Context;
