//! Transport link model
//!
//! An edge is a directed link between two nodes: a road, rail line, sea
//! lane, air route or a contractual supply relationship. The graph is a
//! multigraph, so several edges may join the same ordered pair (e.g. road
//! and rail between a hub and a port).
//!
//! Numeric attributes are addressable by name so that path queries can
//! weight edges by any of them (see [`Edge::attribute`]).

use crate::models::status::ElementStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A directed link in the supply chain network
///
/// # Example
/// ```
/// use supply_chain_sim_core_rs::models::edge::Edge;
///
/// let road = Edge::new("E1", "FAC_1", "PORT_1", "Road")
///     .with_travel_time_hours(6.0)
///     .with_cost_per_unit(2.5);
///
/// assert_eq!(road.attribute("travel_time_hours"), Some(6.0));
/// assert_eq!(road.attribute("capacity"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    id: String,
    source_id: String,
    target_id: String,

    /// "Road", "Rail", "Sea", "Air", "Contract"
    mode: String,

    /// Units per day
    capacity: Option<f64>,
    travel_time_hours: Option<f64>,
    cost_per_unit: Option<f64>,
    distance_km: Option<f64>,

    /// Additional numeric attributes (e.g. "tariff", "emissions_kg")
    attributes: BTreeMap<String, f64>,

    status: ElementStatus,

    /// Units per day currently assigned to this link
    current_flow: f64,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        mode: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            mode: mode.into(),
            capacity: None,
            travel_time_hours: None,
            cost_per_unit: None,
            distance_km: None,
            attributes: BTreeMap::new(),
            status: ElementStatus::Operational,
            current_flow: 0.0,
        }
    }

    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_travel_time_hours(mut self, hours: f64) -> Self {
        self.travel_time_hours = Some(hours);
        self
    }

    pub fn with_cost_per_unit(mut self, cost: f64) -> Self {
        self.cost_per_unit = Some(cost);
        self
    }

    pub fn with_distance_km(mut self, km: f64) -> Self {
        self.distance_km = Some(km);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: f64) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn with_status(mut self, status: ElementStatus) -> Self {
        self.status = status;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn capacity(&self) -> Option<f64> {
        self.capacity
    }

    pub fn travel_time_hours(&self) -> Option<f64> {
        self.travel_time_hours
    }

    pub fn cost_per_unit(&self) -> Option<f64> {
        self.cost_per_unit
    }

    pub fn distance_km(&self) -> Option<f64> {
        self.distance_km
    }

    pub fn current_flow(&self) -> f64 {
        self.current_flow
    }

    pub fn status(&self) -> &ElementStatus {
        &self.status
    }

    pub fn is_disrupted(&self) -> bool {
        self.status.is_disrupted()
    }

    /// Extra numeric attributes
    pub fn attributes(&self) -> &BTreeMap<String, f64> {
        &self.attributes
    }

    /// Look up a numeric attribute by name
    ///
    /// Built-in fields are addressable by their field name and a short
    /// alias (`travel_time`, `distance`, `cost`, `flow`). Anything else is
    /// looked up in the extra attribute map. Returns `None` when the
    /// attribute is absent or unset; path queries treat that as an
    /// infinitely expensive edge.
    pub fn attribute(&self, name: &str) -> Option<f64> {
        match name {
            "capacity" => self.capacity,
            "travel_time_hours" | "travel_time" | "lead_time_hours" => self.travel_time_hours,
            "cost_per_unit" | "cost" => self.cost_per_unit,
            "distance_km" | "distance" => self.distance_km,
            "current_flow" | "flow" => Some(self.current_flow),
            other => self.attributes.get(other).copied(),
        }
    }

    /// Overwrite a numeric attribute by name (same naming as [`Edge::attribute`])
    pub(crate) fn set_attribute(&mut self, name: &str, value: f64) {
        match name {
            "capacity" => self.capacity = Some(value),
            "travel_time_hours" | "travel_time" | "lead_time_hours" => {
                self.travel_time_hours = Some(value)
            }
            "cost_per_unit" | "cost" => self.cost_per_unit = Some(value),
            "distance_km" | "distance" => self.distance_km = Some(value),
            "current_flow" | "flow" => self.current_flow = value,
            other => {
                self.attributes.insert(other.to_string(), value);
            }
        }
    }

    pub(crate) fn set_status(&mut self, status: ElementStatus) {
        self.status = status;
    }

    pub(crate) fn set_current_flow(&mut self, flow: f64) {
        self.current_flow = flow;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_aliases() {
        let edge = Edge::new("E", "A", "B", "Rail")
            .with_distance_km(320.0)
            .with_cost_per_unit(1.5);

        assert_eq!(edge.attribute("distance"), Some(320.0));
        assert_eq!(edge.attribute("distance_km"), Some(320.0));
        assert_eq!(edge.attribute("cost"), Some(1.5));
        assert_eq!(edge.attribute("flow"), Some(0.0));
    }

    #[test]
    fn test_unknown_attribute_is_none() {
        let edge = Edge::new("E", "A", "B", "Road");
        assert_eq!(edge.attribute("tariff"), None);
        assert_eq!(edge.attribute("travel_time_hours"), None);
    }

    #[test]
    fn test_set_attribute_routes_to_field_or_map() {
        let mut edge = Edge::new("E", "A", "B", "Sea");
        edge.set_attribute("travel_time", 480.0);
        edge.set_attribute("tariff", 0.12);

        assert_eq!(edge.travel_time_hours(), Some(480.0));
        assert_eq!(edge.attributes().get("tariff"), Some(&0.12));
    }
}
