//! Serializable registry status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryReport {
    pub name: String,
    pub initialized: bool,
    pub locked_at: Option<DateTime<Utc>>,
    /// Sorted by key type name
    pub entries: Vec<EntryReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReport {
    pub key: String,
    pub concrete: String,
    /// Types the entry resolves as under its key
    pub views: Vec<String>,
}

impl RegistryReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
