//! Domain models for the supply chain simulator

pub mod edge;
pub mod event;
pub mod node;
pub mod status;

// Re-exports
pub use edge::Edge;
pub use event::{Event, EventLog};
pub use node::{Location, Node, NodeCategory, NodeKind};
pub use status::{DisruptionDetails, ElementStatus};
