//! Tracker errors

use objectives_core::{InstanceHandle, InteractableTypeId};
use thiserror::Error;

/// Result type for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors raised by the registry and tracker
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A type id was registered twice (configuration bug)
    #[error("Interactable type '{0}' is already registered")]
    DuplicateRegistration(InteractableTypeId),

    /// A type id was used before being registered (caller bug)
    #[error("Interactable type '{0}' is not registered")]
    UnknownType(InteractableTypeId),

    /// Completion for a handle that is not live in any round
    #[error("Instance {0} is not tracked")]
    UnknownHandle(InstanceHandle),

    /// Registration attempted after the table was frozen
    #[error("Registration table is frozen, cannot register '{0}'")]
    RegistrationFrozen(InteractableTypeId),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    /// Whether the error is an expected race that callers log and ignore
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TrackerError::UnknownHandle(_))
    }
}

impl From<toml::de::Error> for TrackerError {
    fn from(e: toml::de::Error) -> Self {
        TrackerError::Config(e.to_string())
    }
}
