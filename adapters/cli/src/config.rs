use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use terrain_knowledge_world::{ScanOptions, DEFAULT_MAX_LOOKUPS};

/// Settings read from the optional TOML configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) scan: ScanConfig,
    pub(crate) diagnostics: DiagnosticsConfig,
}

/// Discovery budget applied every tick.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ScanConfig {
    /// Lookups shared by every visible room during one tick.
    pub(crate) max_lookups_per_tick: usize,
    /// Re-observes cells that are already known.
    pub(crate) force_update: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_lookups_per_tick: DEFAULT_MAX_LOOKUPS,
            force_update: false,
        }
    }
}

impl ScanConfig {
    /// Scan options for a room granted `max_lookups` of the tick budget.
    pub(crate) fn options(&self, max_lookups: usize) -> ScanOptions {
        if self.force_update {
            ScanOptions::forced(max_lookups)
        } else {
            ScanOptions::with_budget(max_lookups)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DiagnosticsConfig {
    /// `env_logger` filter directive, overridden by `RUST_LOG`.
    pub(crate) log_level: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
        }
    }
}

impl Config {
    /// Reads the configuration, falling back to defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid config at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config toml contents")
    }
}
