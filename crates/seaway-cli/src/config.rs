//! CLI configuration from environment and optional engine config file.

use anyhow::{Context, Result};
use seaway_core::EngineConfig;
use std::env;
use std::path::Path;

/// Environment overrides applied on top of the engine config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// `SEAWAY_LAND_THRESHOLD`: reference values below this are land.
    pub land_threshold: Option<f64>,
    /// `SEAWAY_WAVE_COEFF`
    pub wave_coeff: Option<f64>,
    /// `SEAWAY_WIND_COEFF`
    pub wind_coeff: Option<f64>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values are ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str| {
            let raw = lookup(key)?;
            match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => Some(value),
                _ => {
                    tracing::warn!(key, value = %raw, "ignoring non-numeric override");
                    None
                }
            }
        };
        Self {
            land_threshold: number("SEAWAY_LAND_THRESHOLD"),
            wave_coeff: number("SEAWAY_WAVE_COEFF"),
            wind_coeff: number("SEAWAY_WIND_COEFF"),
        }
    }

    /// Load the engine config (defaults, then `file`, then these overrides).
    pub fn engine_config(&self, file: Option<&Path>) -> Result<EngineConfig> {
        let mut config = match file {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading engine config {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing engine config {}", path.display()))?
            }
            None => EngineConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut EngineConfig) {
        if let Some(value) = self.land_threshold {
            config.mask.min_valid_value = value;
        }
        if let Some(value) = self.wave_coeff {
            config.cost.wave_coeff = value;
        }
        if let Some(value) = self.wind_coeff {
            config.cost.wind_coeff = value;
        }
    }
}
