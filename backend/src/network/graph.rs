//! Network graph storage
//!
//! Nodes and edges are stored in insertion-ordered vectors with id → index
//! maps alongside, plus per-node outgoing/incoming adjacency lists of edge
//! indices. Elements are never removed, so indices stay stable for the
//! lifetime of the graph.
//!
//! # Critical Invariants
//!
//! 1. **Unique ids**: node ids are unique among nodes, edge ids among edges
//! 2. **Closed edges**: every edge's endpoints exist in the node map
//! 3. **Atomic mutation**: a rejected insertion leaves the graph untouched
//! 4. **Deterministic order**: `all_nodes`/`all_edges` and adjacency
//!    iterate in insertion order

use crate::models::{DisruptionDetails, Edge, ElementStatus, Node};
use crate::network::{ElementRef, GraphError};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, info};

/// Directed multigraph of supply chain sites and transport links
///
/// # Example
///
/// ```rust
/// use supply_chain_sim_core_rs::models::{Edge, Node, NodeKind};
/// use supply_chain_sim_core_rs::models::node::{FactoryAttributes, PortAttributes};
/// use supply_chain_sim_core_rs::NetworkGraph;
///
/// let mut graph = NetworkGraph::new("Bangladesh");
/// graph.add_node(Node::new("F1", "Gazipur RMG", NodeKind::Factory(FactoryAttributes::default()))).unwrap();
/// graph.add_node(Node::new("P1", "Chittagong", NodeKind::Port(PortAttributes::default()))).unwrap();
/// graph.add_edge(Edge::new("E1", "F1", "P1", "Road")).unwrap();
///
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.find_path("F1", "P1", None).unwrap(), Some(vec!["F1".to_string(), "P1".to_string()]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NetworkGraph {
    name: String,

    pub(super) nodes: Vec<Node>,
    pub(super) node_index: HashMap<String, usize>,

    pub(super) edges: Vec<Edge>,
    pub(super) edge_index: HashMap<String, usize>,

    /// node index → outgoing edge indices, in insertion order
    pub(super) outgoing: Vec<Vec<usize>>,

    /// node index → incoming edge indices, in insertion order
    pub(super) incoming: Vec<Vec<usize>>,
}

impl NetworkGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Insert a node
    ///
    /// # Errors
    /// `DuplicateId` if a node with the same id already exists.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.node_index.contains_key(node.id()) {
            return Err(GraphError::DuplicateId {
                element: "node",
                id: node.id().to_string(),
            });
        }

        let idx = self.nodes.len();
        debug!(node_id = node.id(), kind = node.kind().name(), "Added node");
        self.node_index.insert(node.id().to_string(), idx);
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        Ok(())
    }

    /// Insert an edge; parallel edges between the same pair are allowed
    ///
    /// # Errors
    /// `UnknownEndpoint` if either endpoint is missing, `DuplicateId` if an
    /// edge with the same id already exists. Endpoints are checked first.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        let source_idx = self.endpoint_index(&edge, edge.source_id())?;
        let target_idx = self.endpoint_index(&edge, edge.target_id())?;

        if self.edge_index.contains_key(edge.id()) {
            return Err(GraphError::DuplicateId {
                element: "edge",
                id: edge.id().to_string(),
            });
        }

        let idx = self.edges.len();
        debug!(
            edge_id = edge.id(),
            source = edge.source_id(),
            target = edge.target_id(),
            mode = edge.mode(),
            "Added edge"
        );
        self.edge_index.insert(edge.id().to_string(), idx);
        self.edges.push(edge);
        self.outgoing[source_idx].push(idx);
        self.incoming[target_idx].push(idx);
        Ok(())
    }

    fn endpoint_index(&self, edge: &Edge, node_id: &str) -> Result<usize, GraphError> {
        self.node_index
            .get(node_id)
            .copied()
            .ok_or_else(|| GraphError::UnknownEndpoint {
                edge_id: edge.id().to_string(),
                node_id: node_id.to_string(),
            })
    }

    /// Mark an element DISRUPTED, overwriting any previous metadata
    pub fn apply_disruption(
        &mut self,
        target: &ElementRef,
        details: DisruptionDetails,
    ) -> Result<(), GraphError> {
        info!(
            target = %target,
            source = %details.source,
            disruption_type = %details.disruption_type,
            "Applied disruption"
        );
        self.set_status(target, ElementStatus::Disrupted(details))
    }

    /// Return an element to OPERATIONAL and drop its disruption metadata
    ///
    /// Returns whether the element was disrupted before the call.
    pub fn clear_disruption(&mut self, target: &ElementRef) -> Result<bool, GraphError> {
        let was_disrupted = self
            .status_of(target)
            .map(ElementStatus::is_disrupted)
            .ok_or_else(|| Self::unknown(target))?;
        self.set_status(target, ElementStatus::Operational)?;
        if was_disrupted {
            info!(target = %target, "Cleared disruption");
        }
        Ok(was_disrupted)
    }

    fn set_status(&mut self, target: &ElementRef, status: ElementStatus) -> Result<(), GraphError> {
        match target {
            ElementRef::Node(id) => {
                let idx = *self
                    .node_index
                    .get(id)
                    .ok_or_else(|| GraphError::UnknownNode(id.clone()))?;
                self.nodes[idx].set_status(status);
            }
            ElementRef::Edge(id) => {
                let idx = *self
                    .edge_index
                    .get(id)
                    .ok_or_else(|| GraphError::UnknownEdge(id.clone()))?;
                self.edges[idx].set_status(status);
            }
        }
        Ok(())
    }

    fn unknown(target: &ElementRef) -> GraphError {
        match target {
            ElementRef::Node(id) => GraphError::UnknownNode(id.clone()),
            ElementRef::Edge(id) => GraphError::UnknownEdge(id.clone()),
        }
    }

    /// Overwrite a numeric edge attribute (policy changes, tariffs, ...)
    pub fn set_edge_attribute(
        &mut self,
        edge_id: &str,
        attribute: &str,
        value: f64,
    ) -> Result<(), GraphError> {
        let edge = self.edge_mut(edge_id)?;
        edge.set_attribute(attribute, value);
        debug!(edge_id, attribute, value, "Updated edge attribute");
        Ok(())
    }

    /// Set the flow currently assigned to an edge
    pub fn set_edge_flow(&mut self, edge_id: &str, flow: f64) -> Result<(), GraphError> {
        self.edge_mut(edge_id)?.set_current_flow(flow);
        Ok(())
    }

    fn edge_mut(&mut self, edge_id: &str) -> Result<&mut Edge, GraphError> {
        let idx = *self
            .edge_index
            .get(edge_id)
            .ok_or_else(|| GraphError::UnknownEdge(edge_id.to_string()))?;
        Ok(&mut self.edges[idx])
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn get_edge(&self, id: &str) -> Option<&Edge> {
        self.edge_index.get(id).map(|&idx| &self.edges[idx])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge_index.contains_key(id)
    }

    /// Status of a node or edge, `None` if it does not exist
    pub fn status_of(&self, target: &ElementRef) -> Option<&ElementStatus> {
        match target {
            ElementRef::Node(id) => self.get_node(id).map(Node::status),
            ElementRef::Edge(id) => self.get_edge(id).map(Edge::status),
        }
    }

    /// All nodes in insertion order
    pub fn all_nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in insertion order
    pub fn all_edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edges leaving `node_id` in insertion order (empty for unknown nodes)
    pub fn outgoing_edges(&self, node_id: &str) -> Vec<&Edge> {
        self.node_index
            .get(node_id)
            .map(|&idx| self.outgoing[idx].iter().map(|&e| &self.edges[e]).collect())
            .unwrap_or_default()
    }

    /// Edges entering `node_id` in insertion order (empty for unknown nodes)
    pub fn incoming_edges(&self, node_id: &str) -> Vec<&Edge> {
        self.node_index
            .get(node_id)
            .map(|&idx| self.incoming[idx].iter().map(|&e| &self.edges[e]).collect())
            .unwrap_or_default()
    }

    /// All parallel edges from `source_id` to `target_id`
    pub fn edges_between(&self, source_id: &str, target_id: &str) -> Vec<&Edge> {
        self.outgoing_edges(source_id)
            .into_iter()
            .filter(|edge| edge.target_id() == target_id)
            .collect()
    }

    pub fn disrupted_nodes(&self) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.is_disrupted()).collect()
    }

    pub fn disrupted_edges(&self) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.is_disrupted()).collect()
    }

    /// Hex-encoded SHA-256 over every element's id and status label
    ///
    /// Elements are hashed in insertion order, so two runs over the same
    /// topology with the same disruption history produce the same digest.
    pub fn state_digest(&self) -> String {
        let mut hasher = Sha256::new();
        for node in &self.nodes {
            hasher.update(b"node:");
            hasher.update(node.id().as_bytes());
            hasher.update(b"=");
            hasher.update(node.status().label().as_bytes());
            hasher.update(b"\n");
        }
        for edge in &self.edges {
            hasher.update(b"edge:");
            hasher.update(edge.id().as_bytes());
            hasher.update(b"=");
            hasher.update(edge.status().label().as_bytes());
            hasher.update(b"\n");
        }
        format!("{:x}", hasher.finalize())
    }
}
