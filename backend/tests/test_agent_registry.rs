//! Tests for agent creation from a network under per-kind quotas

use supply_chain_sim_core_rs::agents::AgentState;
use supply_chain_sim_core_rs::models::node::{
    FactoryAttributes, MarketAttributes, PortAttributes, TransportHubAttributes,
    WarehouseAttributes,
};
use supply_chain_sim_core_rs::{
    Agent, AgentError, AgentKind, AgentQuotas, AgentRegistry, DisruptionConfig, NetworkGraph,
    Node, NodeKind, TargetScope,
};

fn factories(count: usize) -> NetworkGraph {
    let mut graph = NetworkGraph::new("factories");
    for i in 0..count {
        graph
            .add_node(Node::new(
                format!("F{}", i),
                format!("Factory {}", i),
                NodeKind::Factory(FactoryAttributes::default()),
            ))
            .unwrap();
    }
    graph
}

fn mixed_network() -> NetworkGraph {
    let mut graph = NetworkGraph::new("mixed");
    graph
        .add_node(Node::new("F1", "Knit", NodeKind::Factory(FactoryAttributes::default())))
        .unwrap();
    graph
        .add_node(Node::new("P1", "Port", NodeKind::Port(PortAttributes::default())))
        .unwrap();
    graph
        .add_node(Node::new(
            "W1",
            "DC",
            NodeKind::Warehouse(WarehouseAttributes::default()),
        ))
        .unwrap();
    graph
        .add_node(Node::new(
            "H1",
            "ICD",
            NodeKind::TransportHub(TransportHubAttributes::default()),
        ))
        .unwrap();
    graph
        .add_node(Node::new("M1", "EU", NodeKind::Market(MarketAttributes::default())))
        .unwrap();
    graph
}

fn generous() -> AgentQuotas {
    AgentQuotas {
        export_sector: 10,
        logistics: 10,
        market: 10,
        disruption: 0,
    }
}

// ============================================================================
// Quotas
// ============================================================================

#[test]
fn test_quota_caps_agents_per_kind() {
    let graph = factories(10);
    let quotas = AgentQuotas {
        export_sector: 3,
        ..Default::default()
    };

    let registry =
        AgentRegistry::from_network(&graph, &quotas, &DisruptionConfig::default()).unwrap();

    let ids: Vec<&str> = registry.iter().map(Agent::id).collect();
    assert_eq!(ids, vec!["ExportAgent_F0", "ExportAgent_F1", "ExportAgent_F2"]);
    assert_eq!(registry.count_of(AgentKind::ExportSector), 3);
}

#[test]
fn test_zero_quota_creates_nothing() {
    let graph = mixed_network();
    let registry =
        AgentRegistry::from_network(&graph, &AgentQuotas::default(), &DisruptionConfig::default())
            .unwrap();
    assert!(registry.is_empty());
}

#[test]
fn test_counts_by_kind_includes_zeros() {
    let graph = factories(2);
    let quotas = AgentQuotas {
        export_sector: 5,
        ..Default::default()
    };
    let registry =
        AgentRegistry::from_network(&graph, &quotas, &DisruptionConfig::default()).unwrap();

    let counts = registry.counts_by_kind();
    assert_eq!(counts.len(), 4);
    assert_eq!(counts[&AgentKind::ExportSector], 2);
    assert_eq!(counts[&AgentKind::Market], 0);
}

// ============================================================================
// Node kind mapping
// ============================================================================

#[test]
fn test_node_kinds_map_to_agent_kinds() {
    let graph = mixed_network();
    let registry =
        AgentRegistry::from_network(&graph, &generous(), &DisruptionConfig::default()).unwrap();

    let pairs: Vec<(&str, AgentKind, Option<&str>)> = registry
        .iter()
        .map(|agent| (agent.id(), agent.kind(), agent.node_id()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("ExportAgent_F1", AgentKind::ExportSector, Some("F1")),
            ("LogisticsAgent_P1", AgentKind::Logistics, Some("P1")),
            ("LogisticsAgent_W1", AgentKind::Logistics, Some("W1")),
            ("LogisticsAgent_H1", AgentKind::Logistics, Some("H1")),
            ("MarketAgent_M1", AgentKind::Market, Some("M1")),
        ]
    );
}

#[test]
fn test_constructor_rejects_wrong_node_kind() {
    let graph = mixed_network();
    let err = Agent::market(graph.get_node("P1").unwrap()).unwrap_err();
    assert!(matches!(
        err,
        AgentError::KindMismatch {
            expected: "Market",
            ..
        }
    ));
}

// ============================================================================
// Disruption agents
// ============================================================================

#[test]
fn test_disruption_agents_use_defaults() {
    let graph = mixed_network();
    let defaults = DisruptionConfig {
        disruption_type: "EnergyCrisis".to_string(),
        magnitude: 0.4,
        duration: 7,
        target_scope: TargetScope::Region("Dhaka".to_string()),
        start_tick: 12,
    };
    let quotas = AgentQuotas {
        disruption: 2,
        ..generous()
    };

    let registry = AgentRegistry::from_network(&graph, &quotas, &defaults).unwrap();

    assert_eq!(registry.count_of(AgentKind::Disruption), 2);
    for id in ["DisruptionAgent_1", "DisruptionAgent_2"] {
        let agent = registry.get(id).unwrap();
        assert_eq!(agent.node_id(), None);
        assert_eq!(agent.as_disruption().unwrap().config(), &defaults);
    }

    // Node agents step first, disruption agents last
    let last_two: Vec<&str> = registry.iter().skip(5).map(Agent::id).collect();
    assert_eq!(last_two, vec!["DisruptionAgent_1", "DisruptionAgent_2"]);
}

#[test]
fn test_disruption_agents_created_for_empty_network() {
    let graph = NetworkGraph::new("empty");
    let quotas = AgentQuotas {
        disruption: 1,
        ..Default::default()
    };
    let registry =
        AgentRegistry::from_network(&graph, &quotas, &DisruptionConfig::default()).unwrap();
    assert_eq!(registry.len(), 1);
    assert!(matches!(
        registry.get("DisruptionAgent_1").unwrap().state(),
        AgentState::Disruption(_)
    ));
}

#[test]
fn test_trigger_through_registry() {
    let mut graph = mixed_network();
    let quotas = AgentQuotas {
        disruption: 1,
        ..Default::default()
    };
    let defaults = DisruptionConfig {
        target_scope: TargetScope::parse("Market:*").unwrap(),
        ..Default::default()
    };
    let mut registry = AgentRegistry::from_network(&graph, &quotas, &defaults).unwrap();

    assert!(registry
        .trigger_disruption("DisruptionAgent_1", 3, &mut graph)
        .unwrap());
    assert!(graph.get_node("M1").unwrap().is_disrupted());
    assert!(!registry
        .trigger_disruption("DisruptionAgent_1", 4, &mut graph)
        .unwrap());
}
