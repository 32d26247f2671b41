//! Core infrastructure: time, configuration and logging

pub mod config;
pub mod logging;
pub mod time;

pub use config::{
    ConfigError, LoggingConfig, NetworkConfig, SimulationSettings, SimulatorConfig,
};
pub use logging::{LoggingError, LoggingGuard};
pub use time::TimeManager;
