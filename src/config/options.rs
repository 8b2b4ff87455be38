//! Registry options file parsing
//!
//! Options only describe how a registry behaves (its name in logs and
//! reports, whether resolutions are traced). Registry contents are always
//! supplied in code through `DefaultsRegistry::configure`.

use crate::types::DefaultsError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const DEFAULT_REGISTRY_NAME: &str = "defaults";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryOptions {
    /// Label used in log events and diagnostic reports
    pub name: String,

    /// Emit a debug event for every resolution, hit or miss
    pub trace_resolutions: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_REGISTRY_NAME.to_string(),
            trace_resolutions: false,
        }
    }
}

impl RegistryOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, DefaultsError> {
        toml::from_str(content)
            .map_err(|e| DefaultsError::Config(format!("Failed to parse registry options: {}", e)))
    }

    /// Load options from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, DefaultsError> {
        debug!("Loading registry options from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
