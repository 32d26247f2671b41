//! Network node model
//!
//! A node is a physical site in the supply chain: a factory, a port, a
//! warehouse, a market or a transport hub. Shared fields (id, name,
//! location, region, status) live once on [`Node`]; everything that
//! depends on the kind lives in the [`NodeKind`] payload.
//!
//! # Critical Invariants
//!
//! 1. A node's kind is fixed at construction; there is no setter
//! 2. Status is only changed by the owning `NetworkGraph`

use crate::models::status::ElementStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Geographic position (decimal degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<(f64, f64)> for Location {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

/// Production site attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryAttributes {
    /// Export sector, e.g. "RMG", "Pharmaceuticals", "Leather"
    #[serde(alias = "sector_type")]
    pub factory_type: String,

    pub production_capacity_units_per_day: f64,

    /// Raw material → quantity needed per finished unit
    pub raw_material_requirements: BTreeMap<String, f64>,

    pub initial_inventory_units: f64,
}

/// Seaport attributes (capacities in TEU)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortAttributes {
    pub processing_rate_teu_per_hour: f64,

    #[serde(alias = "berth_capacity")]
    pub berthing_capacity: u32,

    pub storage_capacity_teu: f64,

    /// Fraction of capacity lost to congestion, in [0, 1]
    pub current_congestion_level: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseAttributes {
    pub capacity_sqm: f64,
    pub initial_inventory_units: f64,
    pub storage_cost_per_unit_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketAttributes {
    pub demand_rate_units_per_day: f64,
    pub price_sensitivity: f64,
    pub target_market_segment: String,
}

impl Default for MarketAttributes {
    fn default() -> Self {
        Self {
            demand_rate_units_per_day: 0.0,
            price_sensitivity: -0.1,
            target_market_segment: "General".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportHubAttributes {
    /// "Intermodal", "Rail", "Road", "Air", "ICD"
    pub hub_type: String,
    pub transfer_capacity_units_per_hour: f64,
    pub connected_modes: Vec<String>,
}

impl Default for TransportHubAttributes {
    fn default() -> Self {
        Self {
            hub_type: "Intermodal".to_string(),
            transfer_capacity_units_per_hour: 0.0,
            connected_modes: Vec::new(),
        }
    }
}

/// Kind of a node together with its kind-specific attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "PascalCase")]
pub enum NodeKind {
    Factory(FactoryAttributes),
    Port(PortAttributes),
    Warehouse(WarehouseAttributes),
    Market(MarketAttributes),
    TransportHub(TransportHubAttributes),
}

impl NodeKind {
    /// Fieldless category of this kind
    pub fn category(&self) -> NodeCategory {
        match self {
            NodeKind::Factory(_) => NodeCategory::Factory,
            NodeKind::Port(_) => NodeCategory::Port,
            NodeKind::Warehouse(_) => NodeCategory::Warehouse,
            NodeKind::Market(_) => NodeCategory::Market,
            NodeKind::TransportHub(_) => NodeCategory::TransportHub,
        }
    }

    pub fn name(&self) -> &'static str {
        self.category().as_str()
    }
}

/// Node kind without payload
///
/// Used wherever only the kind matters: scope matching, agent quotas,
/// descriptor parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeCategory {
    Factory,
    Port,
    Warehouse,
    Market,
    TransportHub,
}

impl NodeCategory {
    pub const ALL: [NodeCategory; 5] = [
        NodeCategory::Factory,
        NodeCategory::Port,
        NodeCategory::Warehouse,
        NodeCategory::Market,
        NodeCategory::TransportHub,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCategory::Factory => "Factory",
            NodeCategory::Port => "Port",
            NodeCategory::Warehouse => "Warehouse",
            NodeCategory::Market => "Market",
            NodeCategory::TransportHub => "TransportHub",
        }
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a kind name is not one of the five node kinds
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown node kind '{0}'")]
pub struct UnknownNodeKind(pub String);

impl FromStr for NodeCategory {
    type Err = UnknownNodeKind;

    /// Case-insensitive; accepts the legacy `MarketNode` spelling
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "factory" => Ok(NodeCategory::Factory),
            "port" => Ok(NodeCategory::Port),
            "warehouse" => Ok(NodeCategory::Warehouse),
            "market" | "marketnode" => Ok(NodeCategory::Market),
            "transporthub" | "transport_hub" => Ok(NodeCategory::TransportHub),
            _ => Err(UnknownNodeKind(s.to_string())),
        }
    }
}

/// A site in the supply chain network
///
/// # Example
/// ```
/// use supply_chain_sim_core_rs::models::node::{Node, NodeKind, PortAttributes};
///
/// let port = Node::new(
///     "PORT_CTG",
///     "Chittagong",
///     NodeKind::Port(PortAttributes { berthing_capacity: 10, ..Default::default() }),
/// )
/// .with_region("Chattogram");
///
/// assert_eq!(port.kind().name(), "Port");
/// assert!(port.status().is_operational());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: String,
    name: String,
    kind: NodeKind,
    location: Option<Location>,
    region: Option<String>,
    status: ElementStatus,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            location: None,
            region: None,
            status: ElementStatus::Operational,
        }
    }

    pub fn with_location(mut self, location: impl Into<Location>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Start life with a non-default status (e.g. loaded as disrupted)
    pub fn with_status(mut self, status: ElementStatus) -> Self {
        self.status = status;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn category(&self) -> NodeCategory {
        self.kind.category()
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn status(&self) -> &ElementStatus {
        &self.status
    }

    pub fn is_disrupted(&self) -> bool {
        self.status.is_disrupted()
    }

    pub(crate) fn set_status(&mut self, status: ElementStatus) {
        self.status = status;
    }
}
