//! Simulation agents
//!
//! Agents are a closed set of kinds dispatched by exhaustive match. Node
//! agents (export sector, logistics, market) represent one network node and
//! read it through the graph each tick; disruption agents are not tied to a
//! node and toggle element status through the graph's disruption API.
//!
//! Agents never own nodes. They hold a node id and resolve it on demand, so
//! a node that disappears from the graph surfaces as a step failure rather
//! than a dangling reference.

pub mod disruption;
pub mod export_sector;
pub mod logistics;
pub mod market;
pub mod registry;

use crate::models::{Node, NodeCategory};
use crate::network::{GraphError, NetworkGraph};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::trace;

pub use disruption::{DisruptionConfig, DisruptionPhase, DisruptionState};
pub use export_sector::ExportSectorState;
pub use logistics::LogisticsState;
pub use market::MarketState;
pub use registry::{AgentQuotas, AgentRegistry};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AgentError {
    #[error("Agent {agent_id}: node {node_id} not found")]
    NodeMissing { agent_id: String, node_id: String },

    #[error("Agent {agent_id}: node {node_id} is a {found}, expected {expected}")]
    KindMismatch {
        agent_id: String,
        node_id: String,
        expected: &'static str,
        found: NodeCategory,
    },

    #[error("Duplicate agent id: {0}")]
    DuplicateId(String),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Agent {0} is not a disruption agent")]
    NotDisruption(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Agent kind without state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentKind {
    ExportSector,
    Logistics,
    Market,
    Disruption,
}

impl AgentKind {
    pub const ALL: [AgentKind; 4] = [
        AgentKind::ExportSector,
        AgentKind::Logistics,
        AgentKind::Market,
        AgentKind::Disruption,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::ExportSector => "ExportSector",
            AgentKind::Logistics => "Logistics",
            AgentKind::Market => "Market",
            AgentKind::Disruption => "Disruption",
        }
    }

    /// Key used for per-kind counts in run results
    pub fn result_key(&self) -> &'static str {
        match self {
            AgentKind::ExportSector => "export_sector_agents",
            AgentKind::Logistics => "logistics_agents",
            AgentKind::Market => "market_agents",
            AgentKind::Disruption => "disruption_agents",
        }
    }

    /// Agent kind that represents nodes of `category`
    pub fn for_node(category: NodeCategory) -> AgentKind {
        match category {
            NodeCategory::Factory => AgentKind::ExportSector,
            NodeCategory::Port | NodeCategory::Warehouse | NodeCategory::TransportHub => {
                AgentKind::Logistics
            }
            NodeCategory::Market => AgentKind::Market,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific agent state
#[derive(Debug, Clone, PartialEq)]
pub enum AgentState {
    ExportSector(ExportSectorState),
    Logistics(LogisticsState),
    Market(MarketState),
    Disruption(DisruptionState),
}

/// A simulation participant
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    id: String,
    node_id: Option<String>,
    state: AgentState,
}

impl Agent {
    /// Export sector agent for a Factory node, id `ExportAgent_<node>`
    pub fn export_sector(node: &Node) -> Result<Self, AgentError> {
        let id = format!("ExportAgent_{}", node.id());
        let state = ExportSectorState::from_node(&id, node)?;
        Ok(Self::for_node(id, node, AgentState::ExportSector(state)))
    }

    /// Logistics agent for a Port, Warehouse or TransportHub node, id
    /// `LogisticsAgent_<node>`
    pub fn logistics(node: &Node) -> Result<Self, AgentError> {
        let id = format!("LogisticsAgent_{}", node.id());
        let state = LogisticsState::from_node(&id, node)?;
        Ok(Self::for_node(id, node, AgentState::Logistics(state)))
    }

    /// Market agent for a Market node, id `MarketAgent_<node>`
    pub fn market(node: &Node) -> Result<Self, AgentError> {
        let id = format!("MarketAgent_{}", node.id());
        let state = MarketState::from_node(&id, node)?;
        Ok(Self::for_node(id, node, AgentState::Market(state)))
    }

    pub fn disruption(id: impl Into<String>, config: DisruptionConfig) -> Self {
        Self {
            id: id.into(),
            node_id: None,
            state: AgentState::Disruption(DisruptionState::new(config)),
        }
    }

    fn for_node(id: String, node: &Node, state: AgentState) -> Self {
        Self {
            id,
            node_id: Some(node.id().to_string()),
            state,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    pub fn kind(&self) -> AgentKind {
        match self.state {
            AgentState::ExportSector(_) => AgentKind::ExportSector,
            AgentState::Logistics(_) => AgentKind::Logistics,
            AgentState::Market(_) => AgentKind::Market,
            AgentState::Disruption(_) => AgentKind::Disruption,
        }
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn as_disruption(&self) -> Option<&DisruptionState> {
        match &self.state {
            AgentState::Disruption(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_disruption_mut(&mut self) -> Option<&mut DisruptionState> {
        match &mut self.state {
            AgentState::Disruption(state) => Some(state),
            _ => None,
        }
    }

    /// Advance this agent by one tick
    ///
    /// Only the agent's own state changes, except for disruption agents,
    /// which also toggle element status in `graph`.
    pub fn step(&mut self, tick: usize, graph: &mut NetworkGraph) -> Result<(), AgentError> {
        trace!(agent_id = %self.id, tick, "Agent step");
        match &mut self.state {
            AgentState::ExportSector(state) => state.step(&self.id, tick, graph),
            AgentState::Logistics(state) => state.step(&self.id, tick, graph),
            AgentState::Market(state) => state.step(&self.id, tick, graph),
            AgentState::Disruption(state) => state.step(&self.id, tick, graph),
        }
    }
}

/// Bookkeeping shared by every node agent
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NodeTracker {
    node_id: String,
    steps_taken: usize,
    disrupted_ticks: Vec<usize>,
}

impl NodeTracker {
    pub(crate) fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            ..Self::default()
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// Ticks on which the node was observed DISRUPTED
    pub fn disrupted_ticks(&self) -> &[usize] {
        &self.disrupted_ticks
    }

    /// Resolve the node, count the step and note a disruption
    pub(crate) fn observe<'g>(
        &mut self,
        agent_id: &str,
        tick: usize,
        graph: &'g NetworkGraph,
    ) -> Result<&'g Node, AgentError> {
        let node = graph
            .get_node(&self.node_id)
            .ok_or_else(|| AgentError::NodeMissing {
                agent_id: agent_id.to_string(),
                node_id: self.node_id.clone(),
            })?;
        self.steps_taken += 1;
        if node.is_disrupted() {
            self.disrupted_ticks.push(tick);
        }
        Ok(node)
    }
}

pub(crate) fn kind_mismatch(agent_id: &str, node: &Node, expected: &'static str) -> AgentError {
    AgentError::KindMismatch {
        agent_id: agent_id.to_string(),
        node_id: node.id().to_string(),
        expected,
        found: node.category(),
    }
}
