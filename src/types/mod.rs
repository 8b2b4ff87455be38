//! Shared types

mod errors;

pub use errors::{DefaultsError, Result};
