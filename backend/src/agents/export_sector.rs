//! Export sector agent (one per Factory node)

use crate::agents::{kind_mismatch, AgentError, NodeTracker};
use crate::models::{Node, NodeKind};
use crate::network::NetworkGraph;
use serde::Serialize;
use tracing::debug;

/// Factory facts captured when the agent is created
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportProfile {
    pub sector: String,
    pub production_capacity_units_per_day: f64,
    pub initial_inventory_units: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSectorState {
    profile: ExportProfile,
    tracker: NodeTracker,

    /// Production capacity summed over ticks the factory was operational
    available_capacity_units: f64,
}

impl ExportSectorState {
    pub(crate) fn from_node(agent_id: &str, node: &Node) -> Result<Self, AgentError> {
        let NodeKind::Factory(attrs) = node.kind() else {
            return Err(kind_mismatch(agent_id, node, "Factory"));
        };
        Ok(Self {
            profile: ExportProfile {
                sector: attrs.factory_type.clone(),
                production_capacity_units_per_day: attrs.production_capacity_units_per_day,
                initial_inventory_units: attrs.initial_inventory_units,
            },
            tracker: NodeTracker::new(node.id()),
            available_capacity_units: 0.0,
        })
    }

    pub fn profile(&self) -> &ExportProfile {
        &self.profile
    }

    pub fn tracker(&self) -> &NodeTracker {
        &self.tracker
    }

    pub fn available_capacity_units(&self) -> f64 {
        self.available_capacity_units
    }

    pub(crate) fn step(
        &mut self,
        agent_id: &str,
        tick: usize,
        graph: &NetworkGraph,
    ) -> Result<(), AgentError> {
        let node = self.tracker.observe(agent_id, tick, graph)?;
        if node.is_disrupted() {
            debug!(agent_id, tick, sector = %self.profile.sector, "Factory disrupted, no output");
        } else {
            self.available_capacity_units += self.profile.production_capacity_units_per_day;
        }
        Ok(())
    }
}
