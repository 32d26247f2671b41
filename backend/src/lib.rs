//! Supply Chain Simulator Core - Rust Engine
//!
//! Discrete-event, agent-based simulation of a production and logistics
//! network, driven day by day.
//!
//! # Architecture
//!
//! - **core**: Time management, configuration and logging setup
//! - **models**: Domain types (Node, Edge, status, run event log)
//! - **network**: Network graph, path queries, target scopes, ingestion
//! - **events**: Tick-ordered event queue and scenario events
//! - **agents**: Export sector, logistics, market and disruption agents
//! - **orchestrator**: Main simulation loop
//!
//! # Critical Invariants
//!
//! 1. The graph owns every node and edge; agents refer to them by id
//! 2. Disruptions change status, never topology
//! 3. Events due at tick T run before any agent steps at T
//! 4. A failing event or agent step never aborts a tick

// Module declarations
pub mod agents;
pub mod core;
pub mod events;
pub mod models;
pub mod network;
pub mod orchestrator;

// Re-exports for convenience
pub use agents::{Agent, AgentError, AgentKind, AgentQuotas, AgentRegistry, DisruptionConfig};
pub use core::config::{ConfigError, SimulatorConfig};
pub use core::time::TimeManager;
pub use events::{ActionError, EventKind, EventQueue, ScheduleError};
pub use models::{
    edge::Edge,
    event::{Event, EventLog},
    node::{Node, NodeCategory, NodeKind},
    status::{DisruptionDetails, ElementStatus},
};
pub use network::{ElementRef, GraphError, NetworkGraph, TargetScope};
pub use orchestrator::{RunState, SimulationError, SimulationLoop, SimulationResults, TickResult};
