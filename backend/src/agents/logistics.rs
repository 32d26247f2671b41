//! Logistics agent (one per Port, Warehouse or TransportHub node)

use crate::agents::{kind_mismatch, AgentError, NodeTracker};
use crate::models::{Node, NodeCategory, NodeKind};
use crate::network::NetworkGraph;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogisticsProfile {
    pub category: NodeCategory,

    /// Handling capacity per day in the node's own unit (TEU for ports,
    /// sqm for warehouses, units for hubs)
    pub daily_capacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogisticsState {
    profile: LogisticsProfile,
    tracker: NodeTracker,

    /// Disrupted outgoing links seen on the latest step
    blocked_outbound_links: usize,
}

impl LogisticsState {
    pub(crate) fn from_node(agent_id: &str, node: &Node) -> Result<Self, AgentError> {
        let daily_capacity = match node.kind() {
            NodeKind::Port(attrs) => attrs.processing_rate_teu_per_hour * 24.0,
            NodeKind::Warehouse(attrs) => attrs.capacity_sqm,
            NodeKind::TransportHub(attrs) => attrs.transfer_capacity_units_per_hour * 24.0,
            NodeKind::Factory(_) | NodeKind::Market(_) => {
                return Err(kind_mismatch(agent_id, node, "Port, Warehouse or TransportHub"))
            }
        };
        Ok(Self {
            profile: LogisticsProfile {
                category: node.category(),
                daily_capacity,
            },
            tracker: NodeTracker::new(node.id()),
            blocked_outbound_links: 0,
        })
    }

    pub fn profile(&self) -> &LogisticsProfile {
        &self.profile
    }

    pub fn tracker(&self) -> &NodeTracker {
        &self.tracker
    }

    pub fn blocked_outbound_links(&self) -> usize {
        self.blocked_outbound_links
    }

    pub(crate) fn step(
        &mut self,
        agent_id: &str,
        tick: usize,
        graph: &NetworkGraph,
    ) -> Result<(), AgentError> {
        let node = self.tracker.observe(agent_id, tick, graph)?;
        let blocked = graph
            .outgoing_edges(node.id())
            .into_iter()
            .filter(|edge| edge.is_disrupted())
            .count();
        if blocked != self.blocked_outbound_links {
            debug!(agent_id, tick, blocked, "Outbound link availability changed");
        }
        self.blocked_outbound_links = blocked;
        Ok(())
    }
}
