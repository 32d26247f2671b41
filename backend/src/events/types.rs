//! Scenario event types for simulation configuration
//!
//! Scenario events are one-shot interventions listed in the run
//! configuration, each bound to a tick. Before the run they are converted
//! into queued actions (see [`crate::events::handler`]).
//!
//! ```yaml
//! scenario_events:
//!   - tick: 10
//!     type: disruption_start
//!     target: "Port:Chittagong"
//!     disruption_type: Hartal
//!     magnitude: 0.6
//!   - tick: 14
//!     type: disruption_end
//!     target: "Port:Chittagong"
//!   - tick: 20
//!     type: edge_attribute_change
//!     edge_id: CTG_ROTTERDAM
//!     attribute: tariff
//!     value: 0.12
//! ```

use crate::events::EventKind;
use crate::network::TargetScope;
use serde::{Deserialize, Serialize};

/// A scenario intervention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioEvent {
    /// Disrupt every element matching `target`
    DisruptionStart {
        target: TargetScope,
        #[serde(default)]
        disruption_type: Option<String>,
        #[serde(default)]
        magnitude: Option<f64>,
    },

    /// Return every element matching `target` to operational
    DisruptionEnd { target: TargetScope },

    /// Overwrite a numeric edge attribute (tariffs, lead times, ...)
    EdgeAttributeChange {
        edge_id: String,
        attribute: String,
        value: f64,
    },

    /// Start a disruption agent ahead of (or instead of) its start tick
    TriggerDisruptionAgent { agent_id: String },

    /// End the run at the next tick boundary
    StopSimulation,
}

impl ScenarioEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ScenarioEvent::DisruptionStart { .. } => EventKind::DisruptionStart,
            ScenarioEvent::DisruptionEnd { .. } => EventKind::DisruptionEnd,
            ScenarioEvent::EdgeAttributeChange { .. } => EventKind::PolicyChange,
            ScenarioEvent::TriggerDisruptionAgent { .. } => EventKind::AgentAction,
            ScenarioEvent::StopSimulation => EventKind::General,
        }
    }

    /// Human-readable summary used when no description is configured
    pub fn describe(&self) -> String {
        match self {
            ScenarioEvent::DisruptionStart { target, .. } => format!("disrupt {}", target),
            ScenarioEvent::DisruptionEnd { target } => format!("restore {}", target),
            ScenarioEvent::EdgeAttributeChange {
                edge_id,
                attribute,
                value,
            } => format!("set {}.{} = {}", edge_id, attribute, value),
            ScenarioEvent::TriggerDisruptionAgent { agent_id } => format!("trigger {}", agent_id),
            ScenarioEvent::StopSimulation => "stop simulation".to_string(),
        }
    }
}

/// A scenario event paired with its tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledScenarioEvent {
    pub tick: usize,

    #[serde(flatten)]
    pub event: ScenarioEvent,

    #[serde(default)]
    pub description: Option<String>,
}

impl ScheduledScenarioEvent {
    pub fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| self.event.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduled_event_from_yaml() {
        let yaml = r#"
tick: 10
type: disruption_start
target: "Region:Dhaka"
magnitude: 0.5
"#;
        let scheduled: ScheduledScenarioEvent = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scheduled.tick, 10);
        assert_eq!(scheduled.event.kind(), EventKind::DisruptionStart);
        assert_eq!(scheduled.description(), "disrupt Region:Dhaka");
    }

    #[test]
    fn test_stop_event_has_no_fields() {
        let scheduled: ScheduledScenarioEvent =
            serde_json::from_value(serde_json::json!({"tick": 3, "type": "stop_simulation"}))
                .unwrap();
        assert_eq!(scheduled.event, ScenarioEvent::StopSimulation);
    }

    #[test]
    fn test_bad_scope_rejected_at_parse() {
        let result: Result<ScheduledScenarioEvent, _> = serde_json::from_value(serde_json::json!({
            "tick": 3, "type": "disruption_end", "target": "Dhaka"
        }));
        assert!(result.is_err());
    }
}
