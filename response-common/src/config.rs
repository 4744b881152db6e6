use serde::{Deserialize, Serialize};
use anyhow::Result;
use log::info;
use crate::sim_params::{SimParams, DURATION_S, NUM_SAMPLES};
use std::path::Path;

// Parameters of the second-order system under test
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SystemConfig {
    #[serde(default = "default_natural_frequency")]
    pub natural_frequency: f64, // omega_n (rad/s)
    #[serde(default = "default_damping_ratio")]
    pub damping_ratio: f64, // zeta (dimensionless)
}

/// Top-level configuration, optionally loaded from `config.toml`.
/// Only the system constants can be overridden; the time grid and the
/// output file are fixed because the animation depends on them.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ResponseConfig {
    #[serde(default)]
    pub system: SystemConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            natural_frequency: default_natural_frequency(),
            damping_ratio: default_damping_ratio(),
        }
    }
}

impl ResponseConfig {
    /// Loads the configuration from a TOML file and validates it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config in '{}': {}", path_ref.display(), e))?;

        Ok(config)
    }

    /// Like [`ResponseConfig::load`], but a missing file yields the built-in defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            info!("No config file at '{}', using built-in parameters.", path_ref.display());
            return Ok(Self::default());
        }
        info!("Loading configuration from '{}'", path_ref.display());
        Self::load(path_ref)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: ResponseConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let wn = self.system.natural_frequency;
        let zeta = self.system.damping_ratio;
        if !wn.is_finite() || wn <= 0.0 {
            anyhow::bail!("natural_frequency must be positive and finite (got {}).", wn);
        }
        if !zeta.is_finite() || zeta < 0.0 {
            anyhow::bail!("damping_ratio must be non-negative and finite (got {}).", zeta);
        }
        Ok(())
    }

    /// Converts the configuration into the parameters used by the response calculator.
    pub fn get_sim_params(&self) -> SimParams {
        // linspace spacing: the endpoint is included
        let dt = DURATION_S / (NUM_SAMPLES - 1) as f64;

        SimParams {
            natural_frequency: self.system.natural_frequency,
            damping_ratio: self.system.damping_ratio,
            duration_s: DURATION_S,
            num_samples: NUM_SAMPLES,
            dt,
        }
    }
}

fn default_natural_frequency() -> f64 {
    2.0
}

fn default_damping_ratio() -> f64 {
    0.5
}
