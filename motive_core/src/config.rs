//! Registry configuration, loadable from TOML.

use serde::{Deserialize, Serialize};

use motive_model::GoalError;

/// Tunables for reporting. Selection and cascade rules are fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum number of active goals listed in a summary.
    pub summary_top_active: usize,

    /// How many medium-term goals the planning brief lists.
    pub brief_medium_limit: usize,

    /// How many long-term goals the planning brief lists.
    pub brief_long_limit: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            summary_top_active: 5,
            brief_medium_limit: 3,
            brief_long_limit: 2,
        }
    }
}

impl RegistryConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    ///
    /// ```toml
    /// summary_top_active = 5
    /// brief_medium_limit = 3
    /// brief_long_limit = 2
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, GoalError> {
        Ok(toml::from_str(source)?)
    }
}
