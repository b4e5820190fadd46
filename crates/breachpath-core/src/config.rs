//! Engine configuration.
//!
//! Precedence used by callers: `EngineConfig::default()` → overrides file →
//! command-line flags, each layer applied with [`EngineConfig::apply`].

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// How the effort class of an already-compromised step evolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffortPolicy {
    /// The class set at the first transition is final.
    #[default]
    FirstTransition,
    /// A cheaper class arriving later lowers the step and re-propagates.
    Relax,
}

impl std::str::FromStr for EffortPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "first_transition" | "first" => Ok(Self::FirstTransition),
            "relax" => Ok(Self::Relax),
            other => Err(format!(
                "unknown effort policy '{other}' (expected first-transition or relax)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EngineConfig {
    pub effort_policy: EffortPolicy,
    /// Upper bound on edge relaxations per run. `None` means unbounded;
    /// termination is guaranteed either way, the bound only caps work on
    /// pathological graphs.
    pub max_relaxations: Option<u64>,
}

/// Partial overrides for `EngineConfig`. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfigOverrides {
    pub version: Option<u32>,
    pub effort_policy: Option<EffortPolicy>,
    pub max_relaxations: Option<u64>,
}

impl EngineConfig {
    /// Apply overrides onto this config. Only `Some` values override.
    #[must_use]
    pub fn apply(self, overrides: EngineConfigOverrides) -> Self {
        Self {
            effort_policy: overrides.effort_policy.unwrap_or(self.effort_policy),
            max_relaxations: overrides.max_relaxations.or(self.max_relaxations),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    Parse { path: String, message: String },

    #[error("unsupported config version {found} (supported: {})", SUPPORTED_CONFIG_VERSION)]
    UnsupportedVersion { found: u32 },

    #[error("max_relaxations must be > 0")]
    ZeroBudget,
}

/// Parses overrides from YAML text.
pub fn parse_engine_overrides(raw: &str, origin: &str) -> Result<EngineConfigOverrides, ConfigError> {
    let overrides: EngineConfigOverrides =
        serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
    if let Some(found) = overrides.version {
        if found != SUPPORTED_CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion { found });
        }
    }
    if overrides.max_relaxations == Some(0) {
        return Err(ConfigError::ZeroBudget);
    }
    Ok(overrides)
}

/// Reads an overrides file.
pub fn load_engine_overrides(path: &Path) -> Result<EngineConfigOverrides, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_engine_overrides(&raw, &path.display().to_string())
}

/// Defaults with the file at `path` applied.
pub fn load_engine_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    Ok(EngineConfig::default().apply(load_engine_overrides(path)?))
}
