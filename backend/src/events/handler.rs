//! Scenario event execution and scheduling
//!
//! This module handles:
//! - Turning configured scenario events into queued actions
//! - Executing those actions against the simulation world

use crate::events::types::{ScenarioEvent, ScheduledScenarioEvent};
use crate::events::ActionError;
use crate::models::DisruptionDetails;
use crate::orchestrator::{SimulationLoop, World};
use tracing::{info, warn};

/// Source recorded on elements disrupted by a scenario event
pub const SCENARIO_SOURCE: &str = "scenario";

/// Queue every scenario event on `sim`
///
/// Returns the number of events accepted. Events for ticks already in the
/// past are rejected by the queue and logged by the loop.
pub fn schedule_scenario_events(
    sim: &mut SimulationLoop<'_>,
    events: &[ScheduledScenarioEvent],
) -> usize {
    let mut accepted = 0;
    for scheduled in events {
        let event = scheduled.event.clone();
        let result = sim.schedule(
            scheduled.tick,
            event.kind(),
            scheduled.description(),
            move |world| event.execute(world),
        );
        if result.is_ok() {
            accepted += 1;
        }
    }
    info!(accepted, total = events.len(), "Scheduled scenario events");
    accepted
}

impl ScenarioEvent {
    /// Execute this event against the world
    ///
    /// # Returns
    /// Ok(()) if successful, Err describing why the event could not apply
    pub fn execute(&self, world: &mut World<'_>) -> Result<(), ActionError> {
        match self {
            ScenarioEvent::DisruptionStart {
                target,
                disruption_type,
                magnitude,
            } => {
                let elements = target.resolve(&*world.graph);
                if elements.is_empty() {
                    warn!(target = %target, "Scenario disruption matched no elements");
                }
                for element in &elements {
                    let mut details = DisruptionDetails::new(
                        SCENARIO_SOURCE,
                        disruption_type.as_deref().unwrap_or("ScenarioDisruption"),
                    )
                    .since(world.tick());
                    if let Some(m) = magnitude {
                        details = details.with_magnitude(*m);
                    }
                    world.graph.apply_disruption(element, details)?;
                }
                Ok(())
            }

            ScenarioEvent::DisruptionEnd { target } => {
                let elements = target.resolve(&*world.graph);
                let mut cleared = 0;
                for element in &elements {
                    if world.graph.clear_disruption(element)? {
                        cleared += 1;
                    }
                }
                info!(target = %target, cleared, "Scenario restored elements");
                Ok(())
            }

            ScenarioEvent::EdgeAttributeChange {
                edge_id,
                attribute,
                value,
            } => {
                world.graph.set_edge_attribute(edge_id, attribute, *value)?;
                Ok(())
            }

            ScenarioEvent::TriggerDisruptionAgent { agent_id } => {
                let tick = world.tick();
                let activated = world.agents.trigger_disruption(agent_id, tick, &mut *world.graph)?;
                if !activated {
                    warn!(agent_id = %agent_id, tick, "Disruption agent already started");
                }
                Ok(())
            }

            ScenarioEvent::StopSimulation => {
                world.request_stop();
                Ok(())
            }
        }
    }
}
