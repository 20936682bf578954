//! Host configuration read from the environment

use std::path::PathBuf;

use fxcanvas_effects::ProfileConfig;

use crate::error::AppError;

/// Where the effect profile comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSource {
    /// A built-in preset by name
    Preset(String),
    /// A JSON profile file
    File(PathBuf),
}

impl ProfileSource {
    /// Parse from environment variable FXCANVAS_PROFILE.
    /// Anything ending in `.json` is a file, everything else a preset name.
    pub fn from_env() -> Self {
        match std::env::var("FXCANVAS_PROFILE") {
            Ok(value) if value.ends_with(".json") => Self::File(PathBuf::from(value)),
            Ok(value) if !value.trim().is_empty() => Self::Preset(value.trim().to_string()),
            _ => Self::Preset("scratch".to_string()),
        }
    }

    /// Resolve to a profile configuration (validated later by the engine)
    pub fn load(&self) -> Result<ProfileConfig, AppError> {
        match self {
            Self::Preset(name) => {
                ProfileConfig::preset(name).ok_or_else(|| AppError::UnknownPreset(name.clone()))
            }
            Self::File(path) => {
                let json = std::fs::read_to_string(path)?;
                Ok(serde_json::from_str(&json)?)
            }
        }
    }
}

/// Host run configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub profile: ProfileSource,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Fixed seed for a reproducible run; OS-seeded when absent
    pub seed: Option<u64>,
    /// Simulated clock duration
    pub run_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            profile: ProfileSource::from_env(),
            output: std::env::var("FXCANVAS_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("fxcanvas.png")),
            width: env_parse("FXCANVAS_WIDTH").unwrap_or(320),
            height: env_parse("FXCANVAS_HEIGHT").unwrap_or(240),
            seed: env_parse("FXCANVAS_SEED"),
            run_ms: env_parse("FXCANVAS_RUN_MS").unwrap_or(2000),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Read and parse one variable; unset or unparsable values yield None
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    match std::env::var(key) {
        Ok(raw) => {
            let parsed = raw.trim().parse().ok();
            if parsed.is_none() {
                tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            }
            parsed
        }
        Err(_) => None,
    }
}
