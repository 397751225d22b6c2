//! Configuration vault – reads/writes `~/.posefield/config.toml`.
//!
//! Every constant of the pipeline is tunable here: the staleness window, the
//! spring parameters, the fade curve, and the frame cadence. Missing fields
//! fall back to their defaults, so a partial config file is valid.

use posefield_types::FieldError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tunable constants consumed by the registry filter, the relaxation engine,
/// and the frame orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Staleness window: devices older than this are frozen out of physics.
    #[serde(default = "default_max_age_ms")]
    pub max_age_ms: i64,

    /// Equilibrium separation between devices (world units).
    #[serde(default = "default_rest_length")]
    pub rest_length: f32,

    /// Spring stiffness.
    #[serde(default = "default_spring_constant")]
    pub spring_constant: f32,

    /// Per-step damping applied to position and velocity.
    #[serde(default = "default_damping")]
    pub damping: f32,

    /// Scale of the random jitter seeding fresh device positions.
    #[serde(default = "default_jitter_scale")]
    pub jitter_scale: f32,

    /// Grace period before a silent device starts fading (milliseconds).
    #[serde(default = "default_fade_grace_ms")]
    pub fade_grace_ms: i64,

    /// Minimum fade alpha; a long-silent device never disappears entirely.
    #[serde(default = "default_fade_floor")]
    pub fade_floor: u8,

    /// Frame cadence of the demo host (frames per second).
    #[serde(default = "default_frame_rate_hz")]
    pub frame_rate_hz: u32,
}

fn default_max_age_ms() -> i64 {
    posefield_registry::DEFAULT_MAX_AGE_MS
}
fn default_rest_length() -> f32 {
    500.0
}
fn default_spring_constant() -> f32 {
    0.001
}
fn default_damping() -> f32 {
    0.99
}
fn default_jitter_scale() -> f32 {
    1e-4
}
fn default_fade_grace_ms() -> i64 {
    250
}
fn default_fade_floor() -> u8 {
    5
}
fn default_frame_rate_hz() -> u32 {
    60
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            max_age_ms: default_max_age_ms(),
            rest_length: default_rest_length(),
            spring_constant: default_spring_constant(),
            damping: default_damping(),
            jitter_scale: default_jitter_scale(),
            fade_grace_ms: default_fade_grace_ms(),
            fade_floor: default_fade_floor(),
            frame_rate_hz: default_frame_rate_hz(),
        }
    }
}

/// Return the path to `~/.posefield/config.toml`.
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
    PathBuf::from(home).join(".posefield").join("config.toml")
}

/// Load the config from disk. Returns `None` if the file does not exist.
pub fn load() -> Result<Option<FieldConfig>, FieldError> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &Path) -> Result<Option<FieldConfig>, FieldError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| FieldError::Config {
        path: path.display().to_string(),
        details: format!("read failed: {e}"),
    })?;
    let cfg: FieldConfig = toml::from_str(&raw).map_err(|e| FieldError::Config {
        path: path.display().to_string(),
        details: format!("parse failed: {e}"),
    })?;
    Ok(Some(cfg))
}

/// Save the config to disk, creating `~/.posefield/` if necessary.
pub fn save(cfg: &FieldConfig) -> Result<(), FieldError> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &FieldConfig, path: &Path) -> Result<(), FieldError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| FieldError::Config {
            path: path.display().to_string(),
            details: format!("create dir failed: {e}"),
        })?;
    }
    let raw = toml::to_string_pretty(cfg).map_err(|e| FieldError::Config {
        path: path.display().to_string(),
        details: format!("serialize failed: {e}"),
    })?;
    fs::write(path, raw).map_err(|e| FieldError::Config {
        path: path.display().to_string(),
        details: format!("write failed: {e}"),
    })
}
