//! Run configuration
//!
//! Loaded from YAML (JSON documents are valid YAML and load the same way)
//! and validated before anything else happens, so a bad file fails fast
//! before any tick runs.
//!
//! ```yaml
//! simulation_settings:
//!   simulation_name: Monsoon2024
//!   total_ticks: 90
//! logging:
//!   log_level: info
//!   log_file: logs/simulation.log
//! network_config:
//!   network_data_file: data/network.yaml
//! agent_configs:
//!   num_export_sector_agents: 20
//!   num_logistics_agents: 10
//!   num_market_agents: 5
//!   num_disruption_agents: 1
//! disruption_agent_default_config:
//!   disruption_type: NaturalDisaster
//!   magnitude: 0.7
//!   duration: 5
//!   target_scope: "Region:Chattogram"
//!   start_tick: 30
//! scenario_events: []
//! ```

use crate::agents::{AgentQuotas, DisruptionConfig};
use crate::events::ScheduledScenarioEvent;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_simulation_name")]
    pub simulation_name: String,

    #[serde(default = "default_total_ticks", alias = "total_steps")]
    pub total_ticks: usize,
}

fn default_simulation_name() -> String {
    "SupplyChainSimulation".to_string()
}

fn default_total_ticks() -> usize {
    100
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            simulation_name: default_simulation_name(),
            total_ticks: default_total_ticks(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub log_level: String,

    /// Optional plain-text log file, in addition to the console
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Topology file (JSON or YAML); relative paths resolve against the
    /// config file's directory
    pub network_data_file: Option<PathBuf>,
}

/// Complete simulator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default)]
    pub simulation_settings: SimulationSettings,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub network_config: NetworkConfig,

    #[serde(default)]
    pub agent_configs: AgentQuotas,

    #[serde(default)]
    pub disruption_agent_default_config: DisruptionConfig,

    #[serde(default)]
    pub scenario_events: Vec<ScheduledScenarioEvent>,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl SimulatorConfig {
    /// Read, parse and validate a config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_yaml_str(&raw)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.network_config.network_data_file = config
            .network_config
            .network_data_file
            .take()
            .map(|file| if file.is_relative() { base.join(file) } else { file });
        Ok(config)
    }

    /// Parse and validate a config document
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: SimulatorConfig =
            serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the horizon and/or network file, then validate again
    pub fn apply_overrides(
        &mut self,
        total_ticks: Option<usize>,
        network_data_file: Option<PathBuf>,
    ) -> Result<(), ConfigError> {
        if let Some(ticks) = total_ticks {
            self.simulation_settings.total_ticks = ticks;
        }
        if let Some(file) = network_data_file {
            self.network_config.network_data_file = Some(file);
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let settings = &self.simulation_settings;
        if settings.simulation_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "simulation_name must not be empty".to_string(),
            ));
        }
        if settings.total_ticks == 0 {
            return Err(ConfigError::Validation(
                "total_ticks must be greater than 0".to_string(),
            ));
        }

        let level = self.logging.log_level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown log_level '{}'",
                self.logging.log_level
            )));
        }

        let disruption = &self.disruption_agent_default_config;
        if !(0.0..=1.0).contains(&disruption.magnitude) {
            return Err(ConfigError::Validation(format!(
                "disruption magnitude {} outside [0, 1]",
                disruption.magnitude
            )));
        }

        for event in &self.scenario_events {
            if event.tick >= settings.total_ticks {
                warn!(
                    tick = event.tick,
                    total_ticks = settings.total_ticks,
                    description = %event.description(),
                    "Scenario event is beyond the simulation horizon and will never fire"
                );
            }
        }
        Ok(())
    }
}
