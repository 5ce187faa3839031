//! Objectives configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment: `OBJECTIVES_ROLE=client`, `OBJECTIVES_DISABLE=lockbox,gold_chest`
//! 2. Config file: `objectives.toml` (or an explicit path)
//! 3. Defaults: every stock objective enabled, host role
//!
//! # Example Config File
//!
//! ```toml
//! [objectives]
//! lockbox = true
//! lockbox_void = true
//! gold_chest = false
//! free_chest = true
//!
//! [network]
//! role = "host"  # host, client, unknown
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use objectives_core::{NetworkRole, TrackerContext};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::registration::{DiscoverySource, InteractableKind, Registration};
use crate::tracker::ObjectiveTracker;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "objectives.toml";

/// Network section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Role the tracker runs under
    pub role: NetworkRole,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectivesConfig {
    /// Per-type enable flags, keyed by type id
    pub objectives: BTreeMap<String, bool>,
    /// Network configuration
    pub network: NetworkConfig,
}

impl Default for ObjectivesConfig {
    fn default() -> Self {
        Self {
            objectives: Self::builtin_registrations()
                .into_iter()
                .map(|r| (r.type_id.to_string(), true))
                .collect(),
            network: NetworkConfig::default(),
        }
    }
}

impl ObjectivesConfig {
    /// The stock interactables, in registration order
    pub fn builtin_registrations() -> Vec<Registration> {
        vec![
            Registration::new("lockbox", "LOCKBOX_OBJECTIVE"),
            Registration::new("lockbox_void", "LOCKBOX_VOID_OBJECTIVE"),
            Registration::new("free_chest", "FREE_CHEST_OBJECTIVE")
                .with_kind(InteractableKind::Multishop),
            Registration::new("gold_chest", "GOLD_CHEST_OBJECTIVE")
                .with_discovery(DiscoverySource::StageScan),
        ]
    }

    /// Load from an explicit file, or from `objectives.toml` if present,
    /// then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                log::info!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded objectives config from {}", path.display());
        Ok(config)
    }

    /// Parse TOML. Types missing from the file keep their default (enabled).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let parsed: Self = toml::from_str(content)?;
        let mut config = Self::default();
        config.objectives.extend(parsed.objectives);
        config.network = parsed.network;
        Ok(config)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| TrackerError::Config(e.to_string()))
    }

    /// Apply `OBJECTIVES_ROLE` and `OBJECTIVES_DISABLE`
    pub fn apply_env(&mut self) {
        let role = std::env::var("OBJECTIVES_ROLE").ok();
        let disable = std::env::var("OBJECTIVES_DISABLE").ok();
        self.apply_overrides(role.as_deref(), disable.as_deref());
    }

    /// Apply a role override and a comma-separated list of types to disable
    pub fn apply_overrides(&mut self, role: Option<&str>, disable: Option<&str>) {
        if let Some(role) = role {
            match role.parse() {
                Ok(role) => {
                    self.network.role = role;
                    log::info!("Network role override: {}", role);
                }
                Err(e) => log::warn!("Ignoring role override: {}", e),
            }
        }

        for type_id in disable
            .into_iter()
            .flat_map(|list| list.split(','))
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            self.objectives.insert(type_id.to_string(), false);
        }
    }

    /// Whether a type is enabled. Unlisted types are enabled.
    pub fn is_enabled(&self, type_id: &str) -> bool {
        self.objectives.get(type_id).copied().unwrap_or(true)
    }

    /// Tracker context for this configuration
    pub fn context(&self) -> TrackerContext {
        TrackerContext::new(self.network.role)
    }
}

impl ObjectiveTracker {
    /// Build a tracker with the stock registrations and the configured
    /// enable flags. The registration table is frozen afterwards.
    pub fn from_config(config: &ObjectivesConfig) -> Result<Self> {
        let mut tracker = Self::new(config.context());
        for registration in ObjectivesConfig::builtin_registrations() {
            tracker.register_with(registration)?;
        }
        tracker.apply_config(config);
        tracker.freeze();
        Ok(tracker)
    }

    /// Re-apply enable flags, e.g. after the config changed mid-run
    pub fn apply_config(&mut self, config: &ObjectivesConfig) {
        for (type_id, &enabled) in &config.objectives {
            if let Err(e) = self.set_enabled(type_id, enabled) {
                log::warn!("No objective associated with config key '{}': {}", type_id, e);
            }
        }
    }
}
