//! Type-keyed registry of default instances
//!
//! Defaults are registered under a key type (often a trait object such as
//! `dyn Store`) while the registry is configuring, then resolved many times
//! once it is locked.

mod builder;
mod container;
mod entry;
mod report;

pub use builder::{DefaultsBuilder, StagedDefault};
pub use container::DefaultsRegistry;
pub use entry::DefaultFor;
pub use report::{EntryReport, RegistryReport};
