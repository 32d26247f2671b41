//! Topology ingestion
//!
//! Network files list node and edge descriptors, either as JSON or YAML:
//!
//! ```yaml
//! nodes:
//!   - id: FAC_GAZIPUR
//!     kind: Factory
//!     name: Gazipur Knit Composite
//!     region: Dhaka
//!     location: [24.0, 90.4]
//!     factory_type: RMG
//!     production_capacity_units_per_day: 12000
//! edges:
//!   - source_id: FAC_GAZIPUR
//!     target_id: PORT_CTG
//!     mode: Road
//!     travel_time: 8
//!     cost_per_unit: 0.4
//! ```
//!
//! Kind-specific fields sit next to the shared ones. Rows are decoded and
//! validated one at a time; [`NetworkGraph::from_topology`] skips and logs
//! any entry that fails, so one bad row never sinks a whole network.

use crate::models::node::{
    FactoryAttributes, MarketAttributes, NodeKind, PortAttributes, TransportHubAttributes,
    WarehouseAttributes,
};
use crate::models::{DisruptionDetails, Edge, ElementStatus, Location, Node, NodeCategory};
use crate::network::{GraphError, NetworkGraph};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("Failed to read topology file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse topology file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Node '{id}' has unknown kind '{kind}'")]
    UnknownKind { id: String, kind: String },

    #[error("Node '{id}' has invalid {kind} attributes: {message}")]
    InvalidAttributes {
        id: String,
        kind: NodeCategory,
        message: String,
    },

    #[error("Invalid {element} descriptor at row {row}: {message}")]
    InvalidDescriptor {
        element: &'static str,
        row: usize,
        message: String,
    },

    #[error("Element '{id}' has invalid status '{status}'")]
    InvalidStatus { id: String, status: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Raw node and edge rows as found in a network file
///
/// Rows stay untyped until [`NetworkGraph::from_topology`] converts them
/// one by one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub nodes: Vec<Value>,

    #[serde(default, alias = "links")]
    pub edges: Vec<Value>,
}

impl Topology {
    /// Load descriptors from a `.json` file, or YAML for any other
    /// extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TopologyError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| TopologyError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            serde_json::from_str(&raw).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&raw).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| TopologyError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }
}

/// Position given either as `[lat, lon]` or `{lat, lon}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationDescriptor {
    Pair(f64, f64),
    Object { lat: f64, lon: f64 },
}

impl From<LocationDescriptor> for Location {
    fn from(desc: LocationDescriptor) -> Self {
        match desc {
            LocationDescriptor::Pair(lat, lon) | LocationDescriptor::Object { lat, lon } => {
                Location::new(lat, lon)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDescriptor {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(alias = "type", alias = "node_type")]
    pub kind: String,

    pub name: String,

    #[serde(default, alias = "location_lat_lon")]
    pub location: Option<LocationDescriptor>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default, alias = "operational_status")]
    pub status: Option<String>,

    /// Kind-specific fields
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl NodeDescriptor {
    /// Decode one raw `nodes` row
    pub fn from_row(row: usize, raw: Value) -> Result<Self, TopologyError> {
        serde_json::from_value(raw).map_err(|e| TopologyError::InvalidDescriptor {
            element: "node",
            row,
            message: e.to_string(),
        })
    }

    /// Validate the descriptor and build a [`Node`]
    ///
    /// A missing id is generated as `<kind>_<uuid>`.
    pub fn into_node(self) -> Result<Node, TopologyError> {
        let category: NodeCategory =
            self.kind
                .parse()
                .map_err(|_| TopologyError::UnknownKind {
                    id: self.id.clone().unwrap_or_else(|| self.name.clone()),
                    kind: self.kind.clone(),
                })?;

        let id = self.id.unwrap_or_else(|| {
            format!("{}_{}", category.as_str().to_ascii_lowercase(), Uuid::new_v4())
        });

        let fields = Value::Object(self.attributes);
        let invalid = |e: serde_json::Error| TopologyError::InvalidAttributes {
            id: id.clone(),
            kind: category,
            message: e.to_string(),
        };
        let kind = match category {
            NodeCategory::Factory => {
                NodeKind::Factory(serde_json::from_value::<FactoryAttributes>(fields).map_err(invalid)?)
            }
            NodeCategory::Port => {
                NodeKind::Port(serde_json::from_value::<PortAttributes>(fields).map_err(invalid)?)
            }
            NodeCategory::Warehouse => NodeKind::Warehouse(
                serde_json::from_value::<WarehouseAttributes>(fields).map_err(invalid)?,
            ),
            NodeCategory::Market => {
                NodeKind::Market(serde_json::from_value::<MarketAttributes>(fields).map_err(invalid)?)
            }
            NodeCategory::TransportHub => NodeKind::TransportHub(
                serde_json::from_value::<TransportHubAttributes>(fields).map_err(invalid)?,
            ),
        };

        let status = parse_status(&id, self.status.as_deref())?;
        let mut node = Node::new(id, self.name, kind).with_status(status);
        if let Some(location) = self.location {
            node = node.with_location(location);
        }
        if let Some(region) = self.region {
            node = node.with_region(region);
        }
        Ok(node)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDescriptor {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(alias = "source_node_id")]
    pub source_id: String,

    #[serde(alias = "destination_node_id", alias = "target_node_id")]
    pub target_id: String,

    #[serde(default = "default_mode", alias = "type", alias = "transport_mode")]
    pub mode: String,

    #[serde(default, alias = "capacity_units_per_day")]
    pub capacity: Option<f64>,

    #[serde(default)]
    pub cost_per_unit: Option<f64>,

    #[serde(default, alias = "distance_km")]
    pub distance: Option<f64>,

    #[serde(default, alias = "travel_time_hours", alias = "lead_time_hours")]
    pub travel_time: Option<f64>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default, alias = "current_flow_units_per_day")]
    pub current_flow: Option<f64>,

    /// Extra attributes; only numeric values are kept
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_mode() -> String {
    "Road".to_string()
}

impl EdgeDescriptor {
    /// Decode one raw `edges` row
    pub fn from_row(row: usize, raw: Value) -> Result<Self, TopologyError> {
        serde_json::from_value(raw).map_err(|e| TopologyError::InvalidDescriptor {
            element: "edge",
            row,
            message: e.to_string(),
        })
    }

    /// Validate the descriptor and build an [`Edge`]
    ///
    /// A missing id is generated as `link_<uuid>`. Endpoint existence is
    /// checked by the graph on insertion, not here.
    pub fn into_edge(self) -> Result<Edge, TopologyError> {
        let id = self
            .id
            .unwrap_or_else(|| format!("link_{}", Uuid::new_v4()));
        let status = parse_status(&id, self.status.as_deref())?;

        let mut edge = Edge::new(id, self.source_id, self.target_id, self.mode).with_status(status);
        if let Some(capacity) = self.capacity {
            edge = edge.with_capacity(capacity);
        }
        if let Some(cost) = self.cost_per_unit {
            edge = edge.with_cost_per_unit(cost);
        }
        if let Some(km) = self.distance {
            edge = edge.with_distance_km(km);
        }
        if let Some(hours) = self.travel_time {
            edge = edge.with_travel_time_hours(hours);
        }
        if let Some(flow) = self.current_flow {
            edge.set_current_flow(flow);
        }
        for (name, value) in self.extra {
            if let Some(number) = value.as_f64() {
                edge = edge.with_attribute(name, number);
            }
        }
        Ok(edge)
    }
}

fn parse_status(id: &str, raw: Option<&str>) -> Result<ElementStatus, TopologyError> {
    match raw.map(|s| s.trim().to_ascii_lowercase()) {
        None => Ok(ElementStatus::Operational),
        Some(s) if s == "operational" || s == "active" => Ok(ElementStatus::Operational),
        Some(s) if s == "disrupted" || s == "inactive" => Ok(ElementStatus::Disrupted(
            DisruptionDetails::new("topology", "Preexisting"),
        )),
        Some(_) => Err(TopologyError::InvalidStatus {
            id: id.to_string(),
            status: raw.unwrap_or_default().to_string(),
        }),
    }
}

/// Outcome of building a graph from descriptors
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    pub nodes_added: usize,
    pub edges_added: usize,

    /// One message per descriptor that was rejected
    pub skipped: Vec<String>,
}

impl NetworkGraph {
    /// Build a graph from descriptors, skipping invalid entries
    ///
    /// Nodes are inserted before edges, each in file order.
    pub fn from_topology(name: impl Into<String>, topology: Topology) -> (Self, BuildReport) {
        let mut graph = NetworkGraph::new(name);
        let mut report = BuildReport::default();

        for (row, raw) in topology.nodes.into_iter().enumerate() {
            let added = NodeDescriptor::from_row(row, raw)
                .and_then(NodeDescriptor::into_node)
                .and_then(|node| Ok(graph.add_node(node)?));
            match added {
                Ok(()) => report.nodes_added += 1,
                Err(e) => {
                    warn!(error = %e, "Skipping node descriptor");
                    report.skipped.push(e.to_string());
                }
            }
        }

        for (row, raw) in topology.edges.into_iter().enumerate() {
            let added = EdgeDescriptor::from_row(row, raw)
                .and_then(EdgeDescriptor::into_edge)
                .and_then(|edge| Ok(graph.add_edge(edge)?));
            match added {
                Ok(()) => report.edges_added += 1,
                Err(e) => {
                    warn!(error = %e, "Skipping edge descriptor");
                    report.skipped.push(e.to_string());
                }
            }
        }

        info!(
            network = graph.name(),
            nodes = report.nodes_added,
            edges = report.edges_added,
            skipped = report.skipped.len(),
            "Built network from topology"
        );
        (graph, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_descriptor_with_kind_fields() {
        let desc: NodeDescriptor = serde_json::from_value(json!({
            "id": "P1",
            "type": "Port",
            "name": "Mongla",
            "location": {"lat": 22.49, "lon": 89.59},
            "berth_capacity": 7,
            "processing_rate_teu_per_hour": 40.0
        }))
        .unwrap();

        let node = desc.into_node().unwrap();
        assert_eq!(node.category(), NodeCategory::Port);
        assert_eq!(node.location(), Some(Location::new(22.49, 89.59)));
        match node.kind() {
            NodeKind::Port(attrs) => assert_eq!(attrs.berthing_capacity, 7),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_missing_node_id_is_generated() {
        let desc: NodeDescriptor =
            serde_json::from_value(json!({"kind": "Warehouse", "name": "Tongi DC"})).unwrap();
        let node = desc.into_node().unwrap();
        assert!(node.id().starts_with("warehouse_"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let desc: NodeDescriptor =
            serde_json::from_value(json!({"id": "X", "kind": "Airport", "name": "HSIA"})).unwrap();
        assert!(matches!(
            desc.into_node(),
            Err(TopologyError::UnknownKind { ref kind, .. }) if kind == "Airport"
        ));
    }

    #[test]
    fn test_edge_descriptor_keeps_numeric_extras() {
        let desc: EdgeDescriptor = serde_json::from_value(json!({
            "source_id": "A",
            "target_id": "B",
            "mode": "Sea",
            "distance_km": 1500.0,
            "tariff": 0.05,
            "operator": "BSC"
        }))
        .unwrap();

        let edge = desc.into_edge().unwrap();
        assert!(edge.id().starts_with("link_"));
        assert_eq!(edge.distance_km(), Some(1500.0));
        assert_eq!(edge.attribute("tariff"), Some(0.05));
        assert!(!edge.attributes().contains_key("operator"));
    }

    #[test]
    fn test_invalid_status_rejected() {
        let desc: EdgeDescriptor = serde_json::from_value(json!({
            "id": "E", "source_id": "A", "target_id": "B", "status": "flooded"
        }))
        .unwrap();
        assert!(matches!(desc.into_edge(), Err(TopologyError::InvalidStatus { .. })));
    }

    #[test]
    fn test_undecodable_row_names_its_position() {
        let err = EdgeDescriptor::from_row(3, json!({"source_id": "A"})).unwrap_err();
        assert!(matches!(
            err,
            TopologyError::InvalidDescriptor { element: "edge", row: 3, .. }
        ));
    }
}
