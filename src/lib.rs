//! defaults-registry - type-keyed registry of default instances
//!
//! A [`DefaultsRegistry`] is configured once at start-up with fallback
//! instances for abstract or concrete types, then locked and shared
//! read-only with every consumer that needs to resolve them.

pub mod config;
pub mod registry;
pub mod types;

pub use config::RegistryOptions;
pub use registry::{
    DefaultFor, DefaultsBuilder, DefaultsRegistry, EntryReport, RegistryReport, StagedDefault,
};
pub use types::{DefaultsError, Result};
