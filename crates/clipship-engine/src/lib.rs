//! ClipShip Engine - adapters behind the core port traits
//!
//! Provides the in-memory scripted engine used for development and testing
//! (production engines plug in through the same `GeoEngine` port) and the
//! TOML-backed maximum-area policy store.

pub mod manifest;
pub mod memory;
pub mod policy;

pub use manifest::{EngineManifest, LayerEntry};
pub use memory::{FailureMode, MemoryEngine};
pub use policy::TomlPolicyStore;
