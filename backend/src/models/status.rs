//! Operational status shared by nodes and edges
//!
//! A disruption never removes an element from the graph. It flips the
//! element's status to `Disrupted` and attaches metadata describing who
//! disrupted it and how badly, so path queries can penalise the element
//! while its nominal attributes stay readable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata stored on a disrupted node or edge
///
/// # Example
/// ```
/// use supply_chain_sim_core_rs::DisruptionDetails;
///
/// let details = DisruptionDetails::new("DisruptionAgent_1", "PortCongestion")
///     .with_magnitude(0.4)
///     .since(12);
/// assert_eq!(details.since_tick, Some(12));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisruptionDetails {
    /// Originator (agent id, scenario event description, topology file)
    pub source: String,

    /// Category, e.g. "NaturalDisaster", "PoliticalInstability"
    pub disruption_type: String,

    /// Severity in [0, 1] when known
    pub magnitude: Option<f64>,

    /// Tick the disruption was applied
    pub since_tick: Option<usize>,

    /// Free-form annotations
    pub notes: BTreeMap<String, String>,
}

impl DisruptionDetails {
    pub fn new(source: impl Into<String>, disruption_type: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            disruption_type: disruption_type.into(),
            ..Self::default()
        }
    }

    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = Some(magnitude);
        self
    }

    pub fn since(mut self, tick: usize) -> Self {
        self.since_tick = Some(tick);
        self
    }

    pub fn with_note(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.notes.insert(key.into(), value.into());
        self
    }
}

/// Operational status of a graph element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementStatus {
    #[default]
    Operational,
    Disrupted(DisruptionDetails),
}

impl ElementStatus {
    pub fn is_operational(&self) -> bool {
        matches!(self, ElementStatus::Operational)
    }

    pub fn is_disrupted(&self) -> bool {
        matches!(self, ElementStatus::Disrupted(_))
    }

    /// Disruption metadata, if disrupted
    pub fn disruption(&self) -> Option<&DisruptionDetails> {
        match self {
            ElementStatus::Operational => None,
            ElementStatus::Disrupted(details) => Some(details),
        }
    }

    /// Short label used in logs and digests
    pub fn label(&self) -> &'static str {
        match self {
            ElementStatus::Operational => "OPERATIONAL",
            ElementStatus::Disrupted(_) => "DISRUPTED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_operational() {
        let status = ElementStatus::default();
        assert!(status.is_operational());
        assert!(status.disruption().is_none());
        assert_eq!(status.label(), "OPERATIONAL");
    }

    #[test]
    fn test_disrupted_exposes_details() {
        let status = ElementStatus::Disrupted(
            DisruptionDetails::new("test", "Flood").with_note("river", "Meghna"),
        );
        assert!(status.is_disrupted());
        let details = status.disruption().unwrap();
        assert_eq!(details.disruption_type, "Flood");
        assert_eq!(details.notes.get("river").map(String::as_str), Some("Meghna"));
    }

    #[test]
    fn test_status_serializes_with_state_tag() {
        let json = serde_json::to_value(ElementStatus::Operational).unwrap();
        assert_eq!(json["state"], "OPERATIONAL");

        let disrupted = ElementStatus::Disrupted(DisruptionDetails::new("a", "b"));
        let json = serde_json::to_value(&disrupted).unwrap();
        assert_eq!(json["state"], "DISRUPTED");
        assert_eq!(json["source"], "a");
    }
}
