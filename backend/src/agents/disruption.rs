//! Disruption agent
//!
//! # Lifecycle
//!
//! ```text
//! Inactive --(tick >= start_tick, start_tick >= 0)--> Active   apply_impact
//! Inactive --(trigger)------------------------------> Active   apply_impact
//! Active   --(remaining reaches 0)------------------> Completed remove_impact
//! ```
//!
//! An agent activated at tick `s` with duration `d` is active on ticks
//! `s..s+d` and removes its impact on the step at `s+d` (a zero duration
//! removes on the next step). A disruption runs at most once per agent.
//! A negative `start_tick` disables automatic activation; only
//! [`DisruptionState::trigger`] can start it.

use crate::agents::AgentError;
use crate::models::DisruptionDetails;
use crate::network::{ElementRef, NetworkGraph, TargetScope};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Disruption parameters, fixed at agent creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisruptionConfig {
    /// e.g. "PoliticalInstability", "NaturalDisaster", "EnergyCrisis"
    pub disruption_type: String,

    /// Severity in [0, 1]
    pub magnitude: f64,

    /// Ticks the disruption stays active
    pub duration: usize,

    pub target_scope: TargetScope,

    /// First tick of automatic activation; negative means trigger-only
    #[serde(alias = "start_step")]
    pub start_tick: i64,
}

impl Default for DisruptionConfig {
    fn default() -> Self {
        Self {
            disruption_type: "GenericDisruption".to_string(),
            magnitude: 0.1,
            duration: 1,
            target_scope: TargetScope::All,
            start_tick: -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisruptionPhase {
    Inactive,
    Active { activated_at: usize, remaining: usize },
    Completed { activated_at: usize, ended_at: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisruptionState {
    config: DisruptionConfig,
    phase: DisruptionPhase,

    /// Elements this agent disrupted on activation
    impacted: Vec<ElementRef>,

    applications: usize,
    removals: usize,
}

impl DisruptionState {
    pub fn new(config: DisruptionConfig) -> Self {
        Self {
            config,
            phase: DisruptionPhase::Inactive,
            impacted: Vec::new(),
            applications: 0,
            removals: 0,
        }
    }

    pub fn config(&self) -> &DisruptionConfig {
        &self.config
    }

    pub fn phase(&self) -> DisruptionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, DisruptionPhase::Active { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.phase, DisruptionPhase::Completed { .. })
    }

    pub fn impacted(&self) -> &[ElementRef] {
        &self.impacted
    }

    /// Number of times `apply_impact` ran (0 or 1)
    pub fn applications(&self) -> usize {
        self.applications
    }

    /// Number of times `remove_impact` ran (0 or 1)
    pub fn removals(&self) -> usize {
        self.removals
    }

    pub(crate) fn step(
        &mut self,
        agent_id: &str,
        tick: usize,
        graph: &mut NetworkGraph,
    ) -> Result<(), AgentError> {
        match self.phase {
            DisruptionPhase::Inactive => {
                let due = usize::try_from(self.config.start_tick).map_or(false, |start| tick >= start);
                if due {
                    self.activate(agent_id, tick, graph)?;
                }
            }
            DisruptionPhase::Active {
                activated_at,
                remaining,
            } => {
                // A same-tick trigger already counted as the first active tick
                if tick == activated_at {
                    return Ok(());
                }
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.remove_impact(agent_id, tick, graph)?;
                    self.phase = DisruptionPhase::Completed {
                        activated_at,
                        ended_at: tick,
                    };
                    info!(agent_id, tick, disruption_type = %self.config.disruption_type, "Disruption ended");
                } else {
                    debug!(agent_id, tick, remaining, "Disruption ongoing");
                    self.phase = DisruptionPhase::Active {
                        activated_at,
                        remaining,
                    };
                }
            }
            DisruptionPhase::Completed { .. } => {}
        }
        Ok(())
    }

    /// Activate now, regardless of `start_tick`
    ///
    /// Returns `false` without touching the graph if the disruption is
    /// already active or has completed.
    pub fn trigger(
        &mut self,
        agent_id: &str,
        tick: usize,
        graph: &mut NetworkGraph,
    ) -> Result<bool, AgentError> {
        if !matches!(self.phase, DisruptionPhase::Inactive) {
            debug!(agent_id, tick, "Trigger ignored, disruption not inactive");
            return Ok(false);
        }
        self.activate(agent_id, tick, graph)?;
        Ok(true)
    }

    fn activate(
        &mut self,
        agent_id: &str,
        tick: usize,
        graph: &mut NetworkGraph,
    ) -> Result<(), AgentError> {
        self.phase = DisruptionPhase::Active {
            activated_at: tick,
            remaining: self.config.duration,
        };
        info!(
            agent_id,
            tick,
            disruption_type = %self.config.disruption_type,
            target = %self.config.target_scope,
            magnitude = self.config.magnitude,
            duration = self.config.duration,
            "Disruption active"
        );
        self.apply_impact(agent_id, tick, graph)
    }

    fn apply_impact(
        &mut self,
        agent_id: &str,
        tick: usize,
        graph: &mut NetworkGraph,
    ) -> Result<(), AgentError> {
        let targets = self.config.target_scope.resolve(graph);
        if targets.is_empty() {
            warn!(agent_id, target = %self.config.target_scope, "Target scope matched no elements");
        }

        for target in &targets {
            let details = DisruptionDetails::new(agent_id, self.config.disruption_type.clone())
                .with_magnitude(self.config.magnitude)
                .since(tick);
            graph.apply_disruption(target, details)?;
        }
        self.impacted = targets;
        self.applications += 1;
        Ok(())
    }

    /// Clear what this agent disrupted, leaving elements another source
    /// has since re-disrupted alone
    fn remove_impact(
        &mut self,
        agent_id: &str,
        tick: usize,
        graph: &mut NetworkGraph,
    ) -> Result<(), AgentError> {
        for target in &self.impacted {
            let owned = graph
                .status_of(target)
                .and_then(|status| status.disruption())
                .map_or(false, |details| details.source == agent_id);
            if owned {
                graph.clear_disruption(target)?;
            } else {
                debug!(agent_id, tick, target = %target, "Element no longer held by this disruption");
            }
        }
        self.removals += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::node::{NodeKind, PortAttributes};
    use crate::models::Node;

    fn port_graph() -> NetworkGraph {
        let mut graph = NetworkGraph::new("ports");
        graph
            .add_node(Node::new("P1", "Chittagong", NodeKind::Port(PortAttributes::default())))
            .unwrap();
        graph
            .add_node(Node::new("P2", "Mongla", NodeKind::Port(PortAttributes::default())))
            .unwrap();
        graph
    }

    fn config(start_tick: i64, duration: usize) -> DisruptionConfig {
        DisruptionConfig {
            disruption_type: "Cyclone".to_string(),
            magnitude: 0.8,
            duration,
            target_scope: TargetScope::parse("Port:Chittagong").unwrap(),
            start_tick,
        }
    }

    #[test]
    fn test_negative_start_never_self_activates() {
        let mut graph = port_graph();
        let mut state = DisruptionState::new(config(-1, 2));
        for tick in 0..20 {
            state.step("D", tick, &mut graph).unwrap();
        }
        assert_eq!(state.phase(), DisruptionPhase::Inactive);
        assert!(graph.disrupted_nodes().is_empty());
    }

    #[test]
    fn test_trigger_activates_once() {
        let mut graph = port_graph();
        let mut state = DisruptionState::new(config(-1, 1));

        assert!(state.trigger("D", 3, &mut graph).unwrap());
        assert!(!state.trigger("D", 3, &mut graph).unwrap());
        assert!(graph.get_node("P1").unwrap().is_disrupted());

        // Same-tick step does not consume duration
        state.step("D", 3, &mut graph).unwrap();
        assert!(state.is_active());

        state.step("D", 4, &mut graph).unwrap();
        assert!(state.is_completed());
        assert!(!graph.get_node("P1").unwrap().is_disrupted());
        assert!(!state.trigger("D", 5, &mut graph).unwrap());
    }

    #[test]
    fn test_zero_duration_removes_next_step() {
        let mut graph = port_graph();
        let mut state = DisruptionState::new(config(2, 0));

        state.step("D", 2, &mut graph).unwrap();
        assert!(graph.get_node("P1").unwrap().is_disrupted());
        state.step("D", 3, &mut graph).unwrap();
        assert!(!graph.get_node("P1").unwrap().is_disrupted());
        assert_eq!(
            state.phase(),
            DisruptionPhase::Completed {
                activated_at: 2,
                ended_at: 3
            }
        );
    }

    #[test]
    fn test_removal_skips_elements_taken_over() {
        let mut graph = port_graph();
        let mut state = DisruptionState::new(config(0, 1));
        state.step("D", 0, &mut graph).unwrap();

        let target = ElementRef::node("P1");
        graph
            .apply_disruption(&target, DisruptionDetails::new("scenario", "Strike"))
            .unwrap();

        state.step("D", 1, &mut graph).unwrap();
        assert!(state.is_completed());
        assert!(graph.get_node("P1").unwrap().is_disrupted());
    }

    #[test]
    fn test_config_defaults() {
        let config: DisruptionConfig = serde_json::from_value(serde_json::json!({
            "target_scope": "Sector:RMG",
            "start_step": 4
        }))
        .unwrap();
        assert_eq!(config.start_tick, 4);
        assert_eq!(config.duration, 1);
        assert_eq!(config.target_scope, TargetScope::Sector("RMG".to_string()));
    }
}
