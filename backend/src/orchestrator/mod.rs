//! Orchestrator - main simulation loop
//!
//! Implements the tick loop tying the network, agents and event queue
//! together.
//!
//! See `engine.rs` for full implementation.

pub mod engine;

// Re-export main types for convenience
pub use engine::{
    agent_count, RunState, SimulationError, SimulationLoop, SimulationResults, StepMetrics,
    StopHandle, TickResult, World,
};
