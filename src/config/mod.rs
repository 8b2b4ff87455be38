//! Registry options
//!
//! Options are plain TOML with every field optional:
//!
//! ```toml
//! name = "services"
//! trace_resolutions = true
//! ```

mod options;

pub use options::{RegistryOptions, DEFAULT_REGISTRY_NAME};
