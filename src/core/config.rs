//! # Configuration
//!
//! Router options with a clear override hierarchy:
//! defaults → config file → env vars → caller / CLI flags.
//!
//! Config lives at `~/.blaze/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BlazeConfig {
    #[serde(default)]
    pub router: RouterConfig,
}

/// Caller-supplied options. Anything left `None` falls through to the next
/// layer down.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct RouterConfig {
    pub log: Option<bool>,
    pub page_transitions: Option<bool>,
    pub prefetch: Option<PrefetchStrategy>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PrefetchStrategy {
    /// Prefetch a link once it is fully inside the viewport.
    Visible,
    /// Prefetch a link the first time the pointer enters it.
    Hover,
}

impl std::str::FromStr for PrefetchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visible" => Ok(PrefetchStrategy::Visible),
            "hover" => Ok(PrefetchStrategy::Hover),
            other => Err(format!("unknown prefetch strategy: {other}")),
        }
    }
}

// ============================================================================
// Resolved Options (concrete values, no Options except the strategy)
// ============================================================================

/// The immutable snapshot a router runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterOptions {
    /// Diagnostic output and navigation timing.
    pub log: bool,
    /// Wrap body replacement in an animated transition when available.
    pub page_transitions: bool,
    /// `None` disables prefetching.
    pub prefetch: Option<PrefetchStrategy>,
}

impl RouterOptions {
    /// `partial` merged over the documented defaults.
    pub fn merged(partial: &RouterConfig) -> Self {
        let defaults = Self::default();
        Self {
            log: partial.log.unwrap_or(defaults.log),
            page_transitions: partial.page_transitions.unwrap_or(defaults.page_transitions),
            prefetch: partial.prefetch.or(defaults.prefetch),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.blaze/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".blaze").join("config.toml"))
}

/// Load config from `~/.blaze/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `BlazeConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<BlazeConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(BlazeConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(BlazeConfig::default());
    }

    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<BlazeConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: BlazeConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# Blaze Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [router]
# log = false                 # Or set BLAZE_LOG=1
# page_transitions = false    # Or set BLAZE_PAGE_TRANSITIONS=1
# prefetch = "hover"          # "hover" or "visible"; omit to disable. Or BLAZE_PREFETCH
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final options by collapsing: defaults → config file → env vars → caller.
pub fn resolve(config: &BlazeConfig, caller: &RouterConfig) -> RouterOptions {
    resolve_with_env(config, caller, |key| std::env::var(key).ok())
}

/// [`resolve`] with an injectable environment lookup.
pub fn resolve_with_env(
    config: &BlazeConfig,
    caller: &RouterConfig,
    env: impl Fn(&str) -> Option<String>,
) -> RouterOptions {
    let env_flag = |key: &str| env(key).map(|v| matches!(v.trim(), "1" | "true" | "yes" | "on"));

    let env_prefetch = env("BLAZE_PREFETCH").and_then(|raw| match raw.parse() {
        Ok(strategy) => Some(strategy),
        Err(e) => {
            warn!("Ignoring BLAZE_PREFETCH: {e}");
            None
        }
    });

    let merged = RouterConfig {
        log: caller
            .log
            .or_else(|| env_flag("BLAZE_LOG"))
            .or(config.router.log),
        page_transitions: caller
            .page_transitions
            .or_else(|| env_flag("BLAZE_PAGE_TRANSITIONS"))
            .or(config.router.page_transitions),
        prefetch: caller.prefetch.or(env_prefetch).or(config.router.prefetch),
    };

    RouterOptions::merged(&merged)
}
