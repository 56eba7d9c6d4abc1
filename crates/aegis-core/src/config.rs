//! Aggregated configuration: a TOML file plus `AEGIS_*` environment overrides.
//!
//! ```toml
//! [extraction]
//! mode = "strict"
//!
//! [verifier]
//! source_root = "app"
//!
//! [cycle]
//! max_attempts = 5
//! collaborator_timeout_ms = 30000
//!
//! [telemetry]
//! json = true
//! level = "debug"
//! ```

use std::path::Path;

use anyhow::Context;
use code_verifier::VerifierConfig;
use response_extract::{ExtractionMode, ExtractorConfig};
use serde::{Deserialize, Serialize};

use crate::cycle::CycleConfig;
use crate::domain::{AegisError, Result};

pub const ENV_MAX_ATTEMPTS: &str = "AEGIS_MAX_ATTEMPTS";
pub const ENV_EXTRACTION_MODE: &str = "AEGIS_EXTRACTION_MODE";
pub const ENV_COLLABORATOR_TIMEOUT_MS: &str = "AEGIS_COLLABORATOR_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub json: bool,
    /// Default verbosity when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json: false,
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AegisConfig {
    pub extraction: ExtractorConfig,
    pub verifier: VerifierConfig,
    pub cycle: CycleConfig,
    pub telemetry: TelemetryConfig,
}

impl AegisConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path`, then apply overrides from the process environment.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config
            .apply_overrides(|key| std::env::var(key).ok())
            .context("applying environment overrides")?;
        Ok(config)
    }

    /// Apply `AEGIS_*` overrides resolved through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup(ENV_MAX_ATTEMPTS) {
            self.cycle.max_attempts = raw.trim().parse().map_err(|_| {
                AegisError::InvalidConfig(format!("{ENV_MAX_ATTEMPTS} must be an integer, got '{raw}'"))
            })?;
        }
        if let Some(raw) = lookup(ENV_EXTRACTION_MODE) {
            self.extraction.mode = raw
                .trim()
                .parse::<ExtractionMode>()
                .map_err(|e| AegisError::InvalidConfig(format!("{ENV_EXTRACTION_MODE}: {e}")))?;
        }
        if let Some(raw) = lookup(ENV_COLLABORATOR_TIMEOUT_MS) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                AegisError::InvalidConfig(format!(
                    "{ENV_COLLABORATOR_TIMEOUT_MS} must be milliseconds, got '{raw}'"
                ))
            })?;
            self.cycle.collaborator_timeout_ms = (millis > 0).then_some(millis);
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.cycle.max_attempts == 0 {
            return Err(AegisError::InvalidConfig(
                "cycle.max_attempts must be at least 1".to_string(),
            ));
        }
        let ratio = self.verifier.max_unused_class_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(AegisError::InvalidConfig(format!(
                "verifier.max_unused_class_ratio must be within 0..=1, got {ratio}"
            )));
        }
        Ok(())
    }
}
