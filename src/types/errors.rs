use thiserror::Error;

#[derive(Error, Debug)]
pub enum DefaultsError {
    #[error("Defaults registry is locked; configuration is no longer accepted")]
    ConfigurationLocked,

    #[error("A default is already registered for {0}")]
    DuplicateKey(&'static str),

    #[error("No default registered for {0}")]
    Unresolved(&'static str),

    #[error("Default registered for {key} ({stored}) cannot be viewed as {requested}")]
    TypeMismatch {
        key: &'static str,
        stored: &'static str,
        requested: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DefaultsError {
    /// True for the two "nothing usable under that key" outcomes of a lookup.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::Unresolved(_) | Self::TypeMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, DefaultsError>;
