//! Target scopes for disruptions
//!
//! A scope is written as `"<Category>:<Name>"` or as one of the global
//! literals `"all"` / `"Global"`:
//!
//! | Scope                | Matches                                         |
//! |----------------------|-------------------------------------------------|
//! | `Port:Chittagong`    | Port nodes named (or with id) `Chittagong`       |
//! | `Factory:*`          | every Factory node                              |
//! | `Sector:RMG`         | Factory nodes whose factory type is `RMG`        |
//! | `Region:Dhaka`       | nodes whose region is `Dhaka`                    |
//! | `Transport:Road`     | edges whose mode is `Road` (`Mode:` also works)  |
//! | `Node:PORT_CTG`      | the node with that id                           |
//! | `Edge:E12`           | the edge with that id                           |
//! | `all` / `Global`     | every node and every edge                       |
//!
//! Category keywords and names compare case-insensitively; ids are exact.

use crate::models::node::NodeKind;
use crate::models::NodeCategory;
use crate::network::{ElementRef, NetworkGraph};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("Malformed target scope '{0}': expected '<Category>:<Name>' or 'all'")]
    Malformed(String),

    #[error("Unknown scope category '{0}'")]
    UnknownCategory(String),

    #[error("Target scope '{0}' has an empty name")]
    EmptyName(String),
}

/// Parsed disruption target selector
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TargetScope {
    All,
    /// Nodes of a kind by name or id; `"*"` selects the whole kind
    Kind { category: NodeCategory, name: String },
    /// Factories by export sector
    Sector(String),
    Region(String),
    /// Edges by transport mode
    Mode(String),
    Node(String),
    Edge(String),
}

impl TargetScope {
    /// Parse a scope string
    ///
    /// # Example
    /// ```
    /// use supply_chain_sim_core_rs::network::TargetScope;
    /// use supply_chain_sim_core_rs::models::NodeCategory;
    ///
    /// let scope = TargetScope::parse("Port:Chittagong").unwrap();
    /// assert_eq!(
    ///     scope,
    ///     TargetScope::Kind { category: NodeCategory::Port, name: "Chittagong".to_string() }
    /// );
    /// assert_eq!(TargetScope::parse("Global").unwrap(), TargetScope::All);
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ScopeError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("all") || trimmed.eq_ignore_ascii_case("global") {
            return Ok(TargetScope::All);
        }

        let (category, name) = trimmed
            .split_once(':')
            .ok_or_else(|| ScopeError::Malformed(raw.to_string()))?;
        let category = category.trim();
        let name = name.trim();
        if name.is_empty() {
            return Err(ScopeError::EmptyName(raw.to_string()));
        }
        let name = name.to_string();

        let scope = match category.to_ascii_lowercase().as_str() {
            "sector" => TargetScope::Sector(name),
            "region" => TargetScope::Region(name),
            "transport" | "mode" => TargetScope::Mode(name),
            "node" => TargetScope::Node(name),
            "edge" => TargetScope::Edge(name),
            _ => {
                let category = category
                    .parse::<NodeCategory>()
                    .map_err(|_| ScopeError::UnknownCategory(category.to_string()))?;
                TargetScope::Kind { category, name }
            }
        };
        Ok(scope)
    }

    /// Every element of `graph` this scope selects, nodes first, each in
    /// insertion order
    pub fn resolve(&self, graph: &NetworkGraph) -> Vec<ElementRef> {
        let nodes = graph
            .all_nodes()
            .iter()
            .filter(|node| match self {
                TargetScope::All => true,
                TargetScope::Kind { category, name } => {
                    node.category() == *category
                        && (name == "*"
                            || node.name().eq_ignore_ascii_case(name)
                            || node.id().eq_ignore_ascii_case(name))
                }
                TargetScope::Sector(sector) => match node.kind() {
                    NodeKind::Factory(attrs) => attrs.factory_type.eq_ignore_ascii_case(sector),
                    _ => false,
                },
                TargetScope::Region(region) => node
                    .region()
                    .map_or(false, |r| r.eq_ignore_ascii_case(region)),
                TargetScope::Node(id) => node.id() == id,
                TargetScope::Mode(_) | TargetScope::Edge(_) => false,
            })
            .map(|node| ElementRef::node(node.id()));

        let edges = graph
            .all_edges()
            .iter()
            .filter(|edge| match self {
                TargetScope::All => true,
                TargetScope::Mode(mode) => edge.mode().eq_ignore_ascii_case(mode),
                TargetScope::Edge(id) => edge.id() == id,
                _ => false,
            })
            .map(|edge| ElementRef::edge(edge.id()));

        nodes.chain(edges).collect()
    }
}

impl FromStr for TargetScope {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetScope::parse(s)
    }
}

impl TryFrom<String> for TargetScope {
    type Error = ScopeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TargetScope::parse(&value)
    }
}

impl From<TargetScope> for String {
    fn from(scope: TargetScope) -> Self {
        scope.to_string()
    }
}

impl fmt::Display for TargetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetScope::All => write!(f, "all"),
            TargetScope::Kind { category, name } => write!(f, "{}:{}", category, name),
            TargetScope::Sector(s) => write!(f, "Sector:{}", s),
            TargetScope::Region(r) => write!(f, "Region:{}", r),
            TargetScope::Mode(m) => write!(f, "Transport:{}", m),
            TargetScope::Node(id) => write!(f, "Node:{}", id),
            TargetScope::Edge(id) => write!(f, "Edge:{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::node::{FactoryAttributes, PortAttributes};
    use crate::models::{Edge, Node};

    fn sample_graph() -> NetworkGraph {
        let mut graph = NetworkGraph::new("scope");
        graph
            .add_node(
                Node::new(
                    "F1",
                    "Gazipur Knit",
                    NodeKind::Factory(FactoryAttributes {
                        factory_type: "RMG".to_string(),
                        ..Default::default()
                    }),
                )
                .with_region("Dhaka"),
            )
            .unwrap();
        graph
            .add_node(
                Node::new(
                    "F2",
                    "Savar Tannery",
                    NodeKind::Factory(FactoryAttributes {
                        factory_type: "Leather".to_string(),
                        ..Default::default()
                    }),
                )
                .with_region("Dhaka"),
            )
            .unwrap();
        graph
            .add_node(
                Node::new("P1", "Chittagong", NodeKind::Port(PortAttributes::default()))
                    .with_region("Chattogram"),
            )
            .unwrap();
        graph.add_edge(Edge::new("E1", "F1", "P1", "Road")).unwrap();
        graph.add_edge(Edge::new("E2", "F2", "P1", "Rail")).unwrap();
        graph
    }

    #[test]
    fn test_parse_rejects_bad_syntax() {
        assert_eq!(
            TargetScope::parse("Chittagong"),
            Err(ScopeError::Malformed("Chittagong".to_string()))
        );
        assert_eq!(
            TargetScope::parse("Airport:DAC"),
            Err(ScopeError::UnknownCategory("Airport".to_string()))
        );
        assert_eq!(
            TargetScope::parse("Port:  "),
            Err(ScopeError::EmptyName("Port:  ".to_string()))
        );
    }

    #[test]
    fn test_kind_matches_name_case_insensitively() {
        let graph = sample_graph();
        let scope = TargetScope::parse("port:chittagong").unwrap();
        assert_eq!(scope.resolve(&graph), vec![ElementRef::node("P1")]);
    }

    #[test]
    fn test_wildcard_sector_region_and_mode() {
        let graph = sample_graph();

        let factories = TargetScope::parse("Factory:*").unwrap().resolve(&graph);
        assert_eq!(factories, vec![ElementRef::node("F1"), ElementRef::node("F2")]);

        let rmg = TargetScope::parse("Sector:RMG").unwrap().resolve(&graph);
        assert_eq!(rmg, vec![ElementRef::node("F1")]);

        let dhaka = TargetScope::parse("Region:Dhaka").unwrap().resolve(&graph);
        assert_eq!(dhaka.len(), 2);

        let road = TargetScope::parse("Transport:Road").unwrap().resolve(&graph);
        assert_eq!(road, vec![ElementRef::edge("E1")]);
    }

    #[test]
    fn test_all_matches_nodes_and_edges() {
        let graph = sample_graph();
        let everything = TargetScope::All.resolve(&graph);
        assert_eq!(everything.len(), 5);
        assert_eq!(everything[3], ElementRef::edge("E1"));
    }

    #[test]
    fn test_serde_uses_string_form() {
        let scope: TargetScope = serde_json::from_str("\"Region:Khulna\"").unwrap();
        assert_eq!(scope, TargetScope::Region("Khulna".to_string()));
        assert_eq!(serde_json::to_string(&scope).unwrap(), "\"Region:Khulna\"");
        assert!(serde_json::from_str::<TargetScope>("\"nonsense\"").is_err());
    }
}
