//! Market agent (one per Market node)

use crate::agents::{kind_mismatch, AgentError, NodeTracker};
use crate::models::{Node, NodeKind};
use crate::network::NetworkGraph;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketProfile {
    pub segment: String,
    pub demand_rate_units_per_day: f64,
    pub price_sensitivity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketState {
    profile: MarketProfile,
    tracker: NodeTracker,
    cumulative_demand_units: f64,
}

impl MarketState {
    pub(crate) fn from_node(agent_id: &str, node: &Node) -> Result<Self, AgentError> {
        let NodeKind::Market(attrs) = node.kind() else {
            return Err(kind_mismatch(agent_id, node, "Market"));
        };
        Ok(Self {
            profile: MarketProfile {
                segment: attrs.target_market_segment.clone(),
                demand_rate_units_per_day: attrs.demand_rate_units_per_day,
                price_sensitivity: attrs.price_sensitivity,
            },
            tracker: NodeTracker::new(node.id()),
            cumulative_demand_units: 0.0,
        })
    }

    pub fn profile(&self) -> &MarketProfile {
        &self.profile
    }

    pub fn tracker(&self) -> &NodeTracker {
        &self.tracker
    }

    /// Demand accumulated over every step, disrupted or not
    pub fn cumulative_demand_units(&self) -> f64 {
        self.cumulative_demand_units
    }

    pub(crate) fn step(
        &mut self,
        agent_id: &str,
        tick: usize,
        graph: &NetworkGraph,
    ) -> Result<(), AgentError> {
        self.tracker.observe(agent_id, tick, graph)?;
        self.cumulative_demand_units += self.profile.demand_rate_units_per_day;
        Ok(())
    }
}
