//! Tracker context
//!
//! Whether completions can be observed depends on who runs the tracker:
//! a host (or single player) sees every purchase, a client without the
//! host's cooperation only sees what exists in the level.

use std::fmt;

/// Network role the tracker runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NetworkRole {
    /// Host or single player: full spawn and completion visibility
    #[default]
    Host,
    /// Client-only install: completions cannot be observed
    Client,
    /// Role not determined yet
    Unknown,
}

impl NetworkRole {
    /// Whether completion notifications are available in this role
    pub fn observes_completions(&self) -> bool {
        !matches!(self, Self::Client)
    }
}

impl fmt::Display for NetworkRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Client => write!(f, "client"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for NetworkRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "host" | "server" | "singleplayer" => Ok(Self::Host),
            "client" | "client-only" => Ok(Self::Client),
            "unknown" | "" => Ok(Self::Unknown),
            _ => Err(format!("Unknown network role: {}", s)),
        }
    }
}

/// Construction-time context for a tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackerContext {
    /// Network role
    pub role: NetworkRole,
}

impl TrackerContext {
    /// Create a context for the given role
    pub fn new(role: NetworkRole) -> Self {
        Self { role }
    }

    /// Context for a host / single player session
    pub fn host() -> Self {
        Self::new(NetworkRole::Host)
    }

    /// Context for a client-only session
    pub fn client() -> Self {
        Self::new(NetworkRole::Client)
    }
}
