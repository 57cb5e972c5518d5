//! Corpscope Core - Configuration, registry index and shared plumbing
//!
//! Provides the building blocks shared by the Corpscope services: central
//! configuration with environment overrides, the in-memory company registry
//! loaded from the bulk dataset, JSON-span extraction for free-form model
//! output, and tracing setup.

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]

pub mod config;
pub mod jsonspan;
pub mod registry;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::{CorpscopeConfig, RetryPolicy};
pub use jsonspan::{BraceSpanExtractor, JsonExtractor};
pub use registry::{RegistryEntry, RegistryError, RegistryIndex};
