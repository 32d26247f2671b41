//! Agent registry
//!
//! Holds agents in registration order, which is also their step order.

use crate::agents::{Agent, AgentError, AgentKind, DisruptionConfig};
use crate::network::NetworkGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Maximum number of agents created per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentQuotas {
    #[serde(rename = "num_export_sector_agents")]
    pub export_sector: usize,

    #[serde(rename = "num_logistics_agents")]
    pub logistics: usize,

    #[serde(rename = "num_market_agents")]
    pub market: usize,

    #[serde(rename = "num_disruption_agents")]
    pub disruption: usize,
}

impl AgentQuotas {
    pub fn limit(&self, kind: AgentKind) -> usize {
        match kind {
            AgentKind::ExportSector => self.export_sector,
            AgentKind::Logistics => self.logistics,
            AgentKind::Market => self.market,
            AgentKind::Disruption => self.disruption,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
    index: HashMap<String, usize>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create agents for `graph` under `quotas`
    ///
    /// Nodes are visited in insertion order. Each node maps to one agent
    /// kind; once that kind's quota is met, further nodes of it are
    /// skipped. Disruption agents `DisruptionAgent_1..=n` are then created
    /// from `disruption_defaults`, independent of the nodes.
    ///
    /// # Example
    /// ```
    /// use supply_chain_sim_core_rs::agents::{AgentQuotas, AgentRegistry, DisruptionConfig};
    /// use supply_chain_sim_core_rs::models::{Node, NodeKind};
    /// use supply_chain_sim_core_rs::models::node::MarketAttributes;
    /// use supply_chain_sim_core_rs::NetworkGraph;
    ///
    /// let mut graph = NetworkGraph::new("markets");
    /// graph.add_node(Node::new("EU", "European Union", NodeKind::Market(MarketAttributes::default()))).unwrap();
    ///
    /// let quotas = AgentQuotas { market: 5, ..Default::default() };
    /// let registry = AgentRegistry::from_network(&graph, &quotas, &DisruptionConfig::default()).unwrap();
    /// assert_eq!(registry.len(), 1);
    /// assert!(registry.get("MarketAgent_EU").is_some());
    /// ```
    pub fn from_network(
        graph: &NetworkGraph,
        quotas: &AgentQuotas,
        disruption_defaults: &DisruptionConfig,
    ) -> Result<Self, AgentError> {
        let mut registry = Self::new();
        let mut created: BTreeMap<AgentKind, usize> = BTreeMap::new();

        for node in graph.all_nodes() {
            let kind = AgentKind::for_node(node.category());
            let count = created.entry(kind).or_insert(0);
            if *count >= quotas.limit(kind) {
                debug!(node_id = node.id(), kind = %kind, "Agent quota reached, skipping node");
                continue;
            }

            let agent = match kind {
                AgentKind::ExportSector => Agent::export_sector(node)?,
                AgentKind::Logistics => Agent::logistics(node)?,
                AgentKind::Market => Agent::market(node)?,
                AgentKind::Disruption => continue,
            };
            *count += 1;
            registry.register(agent)?;
        }

        for i in 0..quotas.disruption {
            registry.register(Agent::disruption(
                format!("DisruptionAgent_{}", i + 1),
                disruption_defaults.clone(),
            ))?;
        }

        for kind in AgentKind::ALL {
            info!(kind = %kind, created = registry.count_of(kind), "Created agents");
        }
        if registry.is_empty() {
            warn!("No agents were created from the network");
        }
        Ok(registry)
    }

    /// Append an agent to the step order
    pub fn register(&mut self, agent: Agent) -> Result<(), AgentError> {
        if self.index.contains_key(agent.id()) {
            return Err(AgentError::DuplicateId(agent.id().to_string()));
        }
        debug!(agent_id = agent.id(), kind = %agent.kind(), "Registered agent");
        self.index.insert(agent.id().to_string(), self.agents.len());
        self.agents.push(agent);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.index.get(id).map(|&idx| &self.agents[idx])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Agent> {
        self.index.get(id).map(|&idx| &mut self.agents[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn count_of(&self, kind: AgentKind) -> usize {
        self.agents.iter().filter(|a| a.kind() == kind).count()
    }

    /// Agent counts for every kind, zeros included
    pub fn counts_by_kind(&self) -> BTreeMap<AgentKind, usize> {
        AgentKind::ALL
            .into_iter()
            .map(|kind| (kind, self.count_of(kind)))
            .collect()
    }

    /// Start a disruption agent immediately
    ///
    /// Returns whether the agent was activated (`false` if it was already
    /// active or completed).
    pub fn trigger_disruption(
        &mut self,
        id: &str,
        tick: usize,
        graph: &mut NetworkGraph,
    ) -> Result<bool, AgentError> {
        let agent = self
            .get_mut(id)
            .ok_or_else(|| AgentError::UnknownAgent(id.to_string()))?;
        let agent_id = agent.id().to_string();
        let state = agent
            .as_disruption_mut()
            .ok_or_else(|| AgentError::NotDisruption(agent_id.clone()))?;
        state.trigger(&agent_id, tick, graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::node::{NodeKind, PortAttributes, WarehouseAttributes};
    use crate::models::Node;

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = AgentRegistry::new();
        registry
            .register(Agent::disruption("D1", DisruptionConfig::default()))
            .unwrap();
        let err = registry
            .register(Agent::disruption("D1", DisruptionConfig::default()))
            .unwrap_err();
        assert_eq!(err, AgentError::DuplicateId("D1".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_logistics_quota_shared_across_kinds() {
        let mut graph = NetworkGraph::new("t");
        graph
            .add_node(Node::new("P1", "Port 1", NodeKind::Port(PortAttributes::default())))
            .unwrap();
        graph
            .add_node(Node::new(
                "W1",
                "Warehouse 1",
                NodeKind::Warehouse(WarehouseAttributes::default()),
            ))
            .unwrap();

        let quotas = AgentQuotas {
            logistics: 1,
            ..Default::default()
        };
        let registry =
            AgentRegistry::from_network(&graph, &quotas, &DisruptionConfig::default()).unwrap();

        let ids: Vec<&str> = registry.iter().map(Agent::id).collect();
        assert_eq!(ids, vec!["LogisticsAgent_P1"]);
    }

    #[test]
    fn test_trigger_rejects_non_disruption_agent() {
        let mut graph = NetworkGraph::new("t");
        graph
            .add_node(Node::new("P1", "Port 1", NodeKind::Port(PortAttributes::default())))
            .unwrap();
        let mut registry = AgentRegistry::new();
        registry
            .register(Agent::logistics(graph.get_node("P1").unwrap()).unwrap())
            .unwrap();

        assert_eq!(
            registry.trigger_disruption("LogisticsAgent_P1", 0, &mut graph),
            Err(AgentError::NotDisruption("LogisticsAgent_P1".to_string()))
        );
        assert_eq!(
            registry.trigger_disruption("nobody", 0, &mut graph),
            Err(AgentError::UnknownAgent("nobody".to_string()))
        );
    }
}
