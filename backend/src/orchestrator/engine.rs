//! Simulation loop
//!
//! Drives the network, the agents and the event queue through discrete
//! ticks (one tick = one day).
//!
//! # Tick Loop
//!
//! ```text
//! for each tick:
//!     1. Process events due at this tick
//!     2. Step every agent in registration order (failures isolated)
//!     3. Collect step metrics
//!     4. Advance; FINISHED at the horizon, STOPPED if a stop was requested
//! ```
//!
//! Events due at tick T therefore run before, and are visible to, every
//! agent's step at T.
//!
//! # State Machine
//!
//! ```text
//! NOT_STARTED --> RUNNING --> FINISHED
//!                    \------> STOPPED
//! ```
//!
//! Results are computed exactly once, on entering FINISHED or STOPPED.

use crate::agents::{AgentKind, AgentRegistry};
use crate::core::time::TimeManager;
use crate::events::{ActionError, EventId, EventKind, EventQueue, ScheduleError};
use crate::models::event::{Event, EventLog};
use crate::network::NetworkGraph;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Flat mapping of result metric name → value
pub type SimulationResults = BTreeMap<String, serde_json::Value>;

// ============================================================================
// World
// ============================================================================

/// Cloneable request to end the run at the next tick boundary
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything an event action may touch
pub struct World<'g> {
    pub graph: &'g mut NetworkGraph,
    pub agents: AgentRegistry,
    tick: usize,
    stop: StopHandle,
}

impl<'g> World<'g> {
    pub fn new(graph: &'g mut NetworkGraph, agents: AgentRegistry) -> Self {
        Self {
            graph,
            agents,
            tick: 0,
            stop: StopHandle::default(),
        }
    }

    /// Tick currently being executed
    pub fn tick(&self) -> usize {
        self.tick
    }

    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.is_stop_requested()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}

// ============================================================================
// Run state and results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    NotStarted,
    Running,
    Finished,
    Stopped,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Finished | RunState::Stopped)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunState::NotStarted => "NOT_STARTED",
            RunState::Running => "RUNNING",
            RunState::Finished => "FINISHED",
            RunState::Stopped => "STOPPED",
        };
        f.write_str(label)
    }
}

/// Metrics collected once per tick, after all agents stepped
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepMetrics {
    pub tick: usize,
    pub events_processed: usize,
    pub events_fired: usize,
    pub event_failures: usize,
    pub agents_stepped: usize,
    pub agent_failures: usize,
    pub disrupted_nodes: usize,
    pub disrupted_edges: usize,
}

/// Result of a single tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    pub metrics: StepMetrics,

    /// Loop state after the tick
    pub state: RunState,
}

/// Simulation error types
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// No agents registered at run start
    NoAgents,

    /// Tick requested after the run ended
    NotRunning(RunState),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::NoAgents => write!(f, "No agents registered; cannot start simulation"),
            SimulationError::NotRunning(state) => {
                write!(f, "Simulation is not running (state: {})", state)
            }
        }
    }
}

impl std::error::Error for SimulationError {}

#[derive(Debug, Clone, Copy, Default)]
struct RunTotals {
    events_fired: usize,
    event_failures: usize,
    events_missed: usize,
    agent_step_failures: usize,
    peak_disrupted_elements: usize,
}

// ============================================================================
// Simulation loop
// ============================================================================

/// Tick-driven simulation over a borrowed network
///
/// # Example
///
/// ```rust
/// use supply_chain_sim_core_rs::agents::{Agent, AgentRegistry, DisruptionConfig};
/// use supply_chain_sim_core_rs::orchestrator::{RunState, SimulationLoop};
/// use supply_chain_sim_core_rs::NetworkGraph;
///
/// let mut graph = NetworkGraph::new("empty");
/// let mut agents = AgentRegistry::new();
/// agents.register(Agent::disruption("DisruptionAgent_1", DisruptionConfig::default())).unwrap();
///
/// let mut sim = SimulationLoop::new("demo", &mut graph, agents, 5);
/// let results = sim.run().unwrap();
///
/// assert_eq!(sim.state(), RunState::Finished);
/// assert_eq!(results["total_ticks_run"], 5);
/// ```
pub struct SimulationLoop<'g> {
    name: String,
    world: World<'g>,
    events: EventQueue<World<'g>>,
    time: TimeManager,
    state: RunState,
    event_log: EventLog,
    metrics: Vec<StepMetrics>,
    totals: RunTotals,
    results: Option<SimulationResults>,
}

impl<'g> SimulationLoop<'g> {
    pub fn new(
        name: impl Into<String>,
        graph: &'g mut NetworkGraph,
        agents: AgentRegistry,
        total_ticks: usize,
    ) -> Self {
        let name = name.into();
        info!(
            simulation = %name,
            network = graph.name(),
            total_ticks,
            agents = agents.len(),
            "Simulation loop initialized"
        );
        Self {
            name,
            world: World::new(graph, agents),
            events: EventQueue::new(),
            time: TimeManager::new(total_ticks),
            state: RunState::NotStarted,
            event_log: EventLog::new(),
            metrics: Vec::new(),
            totals: RunTotals::default(),
            results: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn current_tick(&self) -> usize {
        self.time.current_tick()
    }

    pub fn total_ticks(&self) -> usize {
        self.time.total_ticks()
    }

    pub fn graph(&self) -> &NetworkGraph {
        &*self.world.graph
    }

    pub fn agents(&self) -> &AgentRegistry {
        &self.world.agents
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Per-tick metrics, one entry per executed tick
    pub fn metrics(&self) -> &[StepMetrics] {
        &self.metrics
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Final results; `None` until the loop reaches a terminal state
    pub fn results(&self) -> Option<&SimulationResults> {
        self.results.as_ref()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.world.stop_handle()
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Queue an action for `tick`
    ///
    /// A rejected request is recorded in the event log and returned.
    pub fn schedule<F>(
        &mut self,
        tick: usize,
        kind: EventKind,
        description: impl Into<String>,
        action: F,
    ) -> Result<EventId, ScheduleError>
    where
        F: FnOnce(&mut World<'g>) -> Result<(), ActionError> + 'static,
    {
        let description = description.into();
        let result = self.events.schedule(tick, kind, description.clone(), action);
        if result.is_err() {
            self.event_log.log(Event::ScheduleRejected {
                tick: self.time.current_tick(),
                requested_tick: tick,
                kind,
                description,
            });
        }
        result
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Transition NOT_STARTED → RUNNING
    ///
    /// A zero-tick horizon (or a stop requested before start) moves straight
    /// on to a terminal state. Calling this on a started loop is a no-op.
    ///
    /// # Errors
    /// `NoAgents` if the registry is empty.
    pub fn start(&mut self) -> Result<(), SimulationError> {
        if self.state != RunState::NotStarted {
            return Ok(());
        }
        if self.world.agents.is_empty() {
            error!(simulation = %self.name, "No agents registered, aborting simulation");
            return Err(SimulationError::NoAgents);
        }

        self.state = RunState::Running;
        self.totals.peak_disrupted_elements = self.disrupted_element_count();
        self.event_log.log(Event::RunStarted {
            tick: self.time.current_tick(),
            total_ticks: self.time.total_ticks(),
            agent_count: self.world.agents.len(),
        });
        info!(
            simulation = %self.name,
            total_ticks = self.time.total_ticks(),
            agents = self.world.agents.len(),
            "Simulation started"
        );

        if self.time.is_finished() {
            self.finish(RunState::Finished);
        } else if self.world.stop_requested() {
            self.finish(RunState::Stopped);
        }
        Ok(())
    }

    /// Execute one tick, starting the loop if needed
    pub fn tick(&mut self) -> Result<TickResult, SimulationError> {
        self.start()?;
        if self.state != RunState::Running {
            return Err(SimulationError::NotRunning(self.state));
        }

        let tick = self.time.current_tick();
        self.world.tick = tick;
        debug!(tick, "Tick start");

        // STEP 1: EVENTS
        let summary = self.events.process(tick, &mut self.world);
        for outcome in &summary.outcomes {
            let record = &outcome.record;
            let event = match &outcome.error {
                None => Event::EventFired {
                    tick,
                    kind: record.kind,
                    description: record.description.clone(),
                },
                Some(e) => Event::EventFailed {
                    tick,
                    kind: record.kind,
                    description: record.description.clone(),
                    error: e.to_string(),
                },
            };
            self.event_log.log(event);
        }

        // STEP 2: AGENTS
        let mut agents_stepped = 0;
        let mut agent_failures = 0;
        for agent in self.world.agents.iter_mut() {
            agents_stepped += 1;
            if let Err(e) = agent.step(tick, &mut *self.world.graph) {
                agent_failures += 1;
                error!(agent_id = agent.id(), tick, error = %e, "Agent step failed");
                self.event_log.log(Event::AgentStepFailed {
                    tick,
                    agent_id: agent.id().to_string(),
                    error: e.to_string(),
                });
            }
        }

        // STEP 3: METRICS
        let metrics = StepMetrics {
            tick,
            events_processed: summary.count(),
            events_fired: summary.fired_count(),
            event_failures: summary.failed_count(),
            agents_stepped,
            agent_failures,
            disrupted_nodes: self.world.graph.disrupted_nodes().len(),
            disrupted_edges: self.world.graph.disrupted_edges().len(),
        };
        self.collect_step_metrics(&metrics, summary.missed);

        // STEP 4: ADVANCE
        self.time.advance_tick();
        self.events.advance_to(self.time.current_tick());
        if self.time.is_finished() {
            self.finish(RunState::Finished);
        } else if self.world.stop_requested() {
            info!(tick, "Stop requested, terminating after this tick");
            self.finish(RunState::Stopped);
        }

        Ok(TickResult {
            metrics,
            state: self.state,
        })
    }

    /// Run to a terminal state and return the results
    ///
    /// # Errors
    /// `NoAgents` if the registry is empty at start.
    pub fn run(&mut self) -> Result<SimulationResults, SimulationError> {
        self.start()?;
        while self.state == RunState::Running {
            self.tick()?;
        }
        Ok(self.results.clone().unwrap_or_default())
    }

    /// Request termination
    ///
    /// Between ticks the loop stops immediately; from inside a tick (via a
    /// [`StopHandle`]) the request is honoured at the end of that tick.
    pub fn stop(&mut self) {
        self.world.request_stop();
        if self.state == RunState::Running {
            info!(tick = self.time.current_tick(), "Stop signal received");
            self.finish(RunState::Stopped);
        }
    }

    fn collect_step_metrics(&mut self, metrics: &StepMetrics, missed: usize) {
        self.totals.events_fired += metrics.events_fired;
        self.totals.event_failures += metrics.event_failures;
        self.totals.events_missed += missed;
        self.totals.agent_step_failures += metrics.agent_failures;
        self.totals.peak_disrupted_elements = self
            .totals
            .peak_disrupted_elements
            .max(metrics.disrupted_nodes + metrics.disrupted_edges);
        self.metrics.push(metrics.clone());
    }

    fn disrupted_element_count(&self) -> usize {
        self.world.graph.disrupted_nodes().len() + self.world.graph.disrupted_edges().len()
    }

    fn finish(&mut self, state: RunState) {
        self.state = state;
        let ticks_run = self.metrics.len();
        self.event_log.log(Event::RunFinished {
            tick: self.time.current_tick(),
            ticks_run,
            stopped_early: state == RunState::Stopped,
        });
        if self.results.is_none() {
            self.results = Some(self.collect_final_results());
        }
        if !self.events.is_empty() {
            warn!(pending = self.events.len(), "Events left unprocessed at end of run");
        }
        info!(
            simulation = %self.name,
            state = %state,
            ticks_run,
            events_fired = self.totals.events_fired,
            agent_step_failures = self.totals.agent_step_failures,
            "Simulation ended"
        );
    }

    fn collect_final_results(&self) -> SimulationResults {
        let graph = &*self.world.graph;
        let mut results = SimulationResults::new();

        results.insert("simulation_name".into(), json!(self.name));
        results.insert("final_state".into(), json!(self.state.to_string()));
        results.insert("total_ticks_run".into(), json!(self.metrics.len()));
        results.insert("total_agents".into(), json!(self.world.agents.len()));
        for (kind, count) in self.world.agents.counts_by_kind() {
            results.insert(kind.result_key().into(), json!(count));
        }
        results.insert("total_events_fired".into(), json!(self.totals.events_fired));
        results.insert("total_event_failures".into(), json!(self.totals.event_failures));
        results.insert("total_events_missed".into(), json!(self.totals.events_missed));
        results.insert("events_pending_at_end".into(), json!(self.events.len()));
        results.insert(
            "total_agent_step_failures".into(),
            json!(self.totals.agent_step_failures),
        );
        results.insert(
            "disrupted_nodes_at_end".into(),
            json!(graph.disrupted_nodes().len()),
        );
        results.insert(
            "disrupted_edges_at_end".into(),
            json!(graph.disrupted_edges().len()),
        );
        results.insert(
            "peak_disrupted_elements".into(),
            json!(self.totals.peak_disrupted_elements),
        );
        results.insert("network_digest".into(), json!(graph.state_digest()));
        results
    }
}

/// Count of agents of `kind` in a results mapping
pub fn agent_count(results: &SimulationResults, kind: AgentKind) -> Option<u64> {
    results.get(kind.result_key()).and_then(|v| v.as_u64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{Agent, DisruptionConfig};

    fn one_agent() -> AgentRegistry {
        let mut agents = AgentRegistry::new();
        agents
            .register(Agent::disruption("DisruptionAgent_1", DisruptionConfig::default()))
            .unwrap();
        agents
    }

    #[test]
    fn test_tick_after_finish_errors() {
        let mut graph = NetworkGraph::new("t");
        let mut sim = SimulationLoop::new("t", &mut graph, one_agent(), 1);

        let result = sim.tick().unwrap();
        assert_eq!(result.state, RunState::Finished);
        assert_eq!(
            sim.tick().unwrap_err(),
            SimulationError::NotRunning(RunState::Finished)
        );
    }

    #[test]
    fn test_stop_between_ticks_is_immediate() {
        let mut graph = NetworkGraph::new("t");
        let mut sim = SimulationLoop::new("t", &mut graph, one_agent(), 10);
        sim.tick().unwrap();
        sim.stop();

        assert_eq!(sim.state(), RunState::Stopped);
        assert_eq!(sim.results().unwrap()["total_ticks_run"], 1);
        assert_eq!(sim.results().unwrap()["final_state"], "STOPPED");
    }

    #[test]
    fn test_per_kind_counts_in_results() {
        let mut graph = NetworkGraph::new("t");
        let mut sim = SimulationLoop::new("t", &mut graph, one_agent(), 2);
        let results = sim.run().unwrap();

        assert_eq!(agent_count(&results, AgentKind::Disruption), Some(1));
        assert_eq!(agent_count(&results, AgentKind::Market), Some(0));
        assert_eq!(sim.metrics().len(), 2);
    }
}
