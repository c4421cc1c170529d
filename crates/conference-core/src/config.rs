//! Configuration for conferences and the conference registry
//!
//! Loading the YAML from disk is left to the application; this module only
//! describes the settings and parses them.
//!
//! ```yaml
//! max_conferences: 64
//! conference:
//!   max_members: 20
//!   demotion_policy: demote_wait_marked
//! profiles:
//!   leader:
//!     marked: true
//!   guest:
//!     wait_marked: true
//!     music_on_hold: true
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{ConferenceError, Result};
use crate::types::UserProfile;

/// What happens to live participants when the last marked participant leaves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemotionPolicy {
    /// Active wait-marked participants go back to the waiting set
    #[default]
    DemoteWaitMarked,
    /// Everyone stays live; only new admissions are gated
    KeepActive,
}

/// Per-conference settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConferenceConfig {
    /// Maximum attached participants (active + waiting), unlimited if unset
    pub max_members: Option<usize>,
    pub demotion_policy: DemotionPolicy,
}

impl Default for ConferenceConfig {
    fn default() -> Self {
        Self {
            max_members: None,
            demotion_policy: DemotionPolicy::DemoteWaitMarked,
        }
    }
}

impl ConferenceConfig {
    pub fn with_max_members(mut self, max_members: usize) -> Self {
        self.max_members = Some(max_members);
        self
    }

    pub fn with_demotion_policy(mut self, policy: DemotionPolicy) -> Self {
        self.demotion_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_members == Some(0) {
            return Err(ConferenceError::Config("max_members must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Settings for a [`ConferenceRegistry`](crate::manager::ConferenceRegistry)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum live conferences, unlimited if unset
    pub max_conferences: Option<usize>,
    /// Applied to every conference the registry creates
    pub conference: ConferenceConfig,
    /// Named user profiles
    pub profiles: HashMap<String, UserProfile>,
}

impl RegistryConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: RegistryConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_conferences == Some(0) {
            return Err(ConferenceError::Config("max_conferences must be greater than 0".to_string()));
        }
        self.conference.validate()
    }

    /// Look up a named user profile
    pub fn profile(&self, name: &str) -> Option<UserProfile> {
        self.profiles.get(name).copied()
    }
}
