//! Operator configuration – reads/writes `~/.tiller/config.toml`.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tiller_types::GovernanceConfig;

/// Persisted operator configuration stored in `~/.tiller/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Delay between ticks in `/watch` mode, in milliseconds.
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,

    /// Seed for the synthetic signal source.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Highest risk score at which a proposal may still be auto-approved.
    #[serde(default = "default_max_auto_risk")]
    pub max_auto_risk: f64,

    /// Risk score at or above which every proposal is blocked outright.
    #[serde(default = "default_hard_block_risk")]
    pub hard_block_risk: f64,

    /// Intent kinds that always require human review.
    #[serde(default = "default_require_human_for")]
    pub require_human_for: BTreeSet<String>,

    /// Master switch: while closed, nothing is auto-approved.
    #[serde(default)]
    pub gate_open: bool,
}

fn default_tick_period_ms() -> u64 {
    1000
}
fn default_seed() -> u64 {
    42
}
fn default_max_auto_risk() -> f64 {
    40.0
}
fn default_hard_block_risk() -> f64 {
    80.0
}
fn default_require_human_for() -> BTreeSet<String> {
    GovernanceConfig::default().require_human_for
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_period_ms: default_tick_period_ms(),
            seed: default_seed(),
            max_auto_risk: default_max_auto_risk(),
            hard_block_risk: default_hard_block_risk(),
            require_human_for: default_require_human_for(),
            gate_open: false,
        }
    }
}

impl Config {
    /// The governance slice of this configuration, ready for the
    /// orchestrator.
    pub fn governance(&self) -> GovernanceConfig {
        GovernanceConfig {
            max_auto_risk: self.max_auto_risk,
            hard_block_risk: self.hard_block_risk,
            require_human_for: self.require_human_for.clone(),
            gate_open: self.gate_open,
        }
    }
}

/// Return the path to `~/.tiller/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".tiller").join("config.toml")
}

/// Load the config from disk, applying `TILLER_*` environment overrides.
/// Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    let mut loaded = load_from(&config_path())?;
    if let Some(cfg) = loaded.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(loaded)
}

/// Load the config from a specific path, exactly as written.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config = toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `TILLER_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `TILLER_TICK_PERIOD_MS` | `tick_period_ms` |
/// | `TILLER_SEED` | `seed` |
/// | `TILLER_MAX_AUTO_RISK` | `max_auto_risk` |
/// | `TILLER_HARD_BLOCK_RISK` | `hard_block_risk` |
/// | `TILLER_GATE_OPEN` | `gate_open` (`true`/`false`) |
///
/// Values that fail to parse are ignored; the file value stays in force.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("TILLER_TICK_PERIOD_MS")
        && let Ok(period) = v.parse::<u64>()
    {
        cfg.tick_period_ms = period;
    }
    if let Ok(v) = std::env::var("TILLER_SEED")
        && let Ok(seed) = v.parse::<u64>()
    {
        cfg.seed = seed;
    }
    if let Ok(v) = std::env::var("TILLER_MAX_AUTO_RISK")
        && let Ok(risk) = v.parse::<f64>()
    {
        cfg.max_auto_risk = risk;
    }
    if let Ok(v) = std::env::var("TILLER_HARD_BLOCK_RISK")
        && let Ok(risk) = v.parse::<f64>()
    {
        cfg.hard_block_risk = risk;
    }
    if let Ok(v) = std::env::var("TILLER_GATE_OPEN")
        && let Ok(open) = v.parse::<bool>()
    {
        cfg.gate_open = open;
    }
}

/// Save the config to disk, creating `~/.tiller/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw).map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}
