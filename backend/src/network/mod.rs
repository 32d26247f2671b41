//! Supply chain network graph
//!
//! A directed multigraph of typed nodes and transport links, with
//! path queries and disruption primitives.
//!
//! - **graph**: storage, lookup, mutation, disruption toggling
//! - **path**: minimum-hop and weighted shortest paths
//! - **scope**: target-scope selectors ("Port:Chittagong", "all")
//! - **topology**: node/edge descriptors and network ingestion

pub mod graph;
pub mod path;
pub mod scope;
pub mod topology;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use graph::NetworkGraph;
pub use scope::{ScopeError, TargetScope};
pub use topology::{BuildReport, EdgeDescriptor, NodeDescriptor, Topology, TopologyError};

/// Structural errors raised by graph mutation and queries
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("Duplicate {element} id: {id}")]
    DuplicateId { element: &'static str, id: String },

    #[error("Edge {edge_id} references unknown endpoint {node_id}")]
    UnknownEndpoint { edge_id: String, node_id: String },

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Unknown edge: {0}")]
    UnknownEdge(String),

    #[error("Edge {edge_id} has negative weight {weight}")]
    NegativeWeight { edge_id: String, weight: f64 },
}

/// Identifies a disruptable graph element
///
/// Node and edge ids live in separate namespaces, so the target of a
/// disruption is always typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "element", content = "id", rename_all = "snake_case")]
pub enum ElementRef {
    Node(String),
    Edge(String),
}

impl ElementRef {
    pub fn node(id: impl Into<String>) -> Self {
        ElementRef::Node(id.into())
    }

    pub fn edge(id: impl Into<String>) -> Self {
        ElementRef::Edge(id.into())
    }

    pub fn id(&self) -> &str {
        match self {
            ElementRef::Node(id) | ElementRef::Edge(id) => id,
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRef::Node(id) => write!(f, "node:{}", id),
            ElementRef::Edge(id) => write!(f, "edge:{}", id),
        }
    }
}
