//! Profile data structures and operations

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Connection settings for one OstrichDB server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// OstrichDB server URL
    pub host: String,
    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Profile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// The currently active profile name
    pub active_profile: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            active_profile: "default".to_string(),
        }
    }
}

/// Complete configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Config {
    pub fn get_active_profile(&self) -> Option<&Profile> {
        self.profiles.get(&self.settings.active_profile)
    }

    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Add or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        self.profiles.remove(name)
    }

    pub fn set_active(&mut self, name: String) {
        self.settings.active_profile = name;
    }

    /// Profile names in sorted order
    pub fn profile_names(&self) -> Vec<&String> {
        let mut names: Vec<_> = self.profiles.keys().collect();
        names.sort();
        names
    }
}
