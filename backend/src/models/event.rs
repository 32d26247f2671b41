//! Run event log for auditing and reporting.
//!
//! Records every significant happening of a simulation run in the order it
//! occurred. Scheduled events themselves live in
//! [`crate::events::EventQueue`]; this log is the after-the-fact record of
//! what the loop did with them, and of what went wrong along the way.
//!
//! # Example
//!
//! ```rust
//! use supply_chain_sim_core_rs::models::{Event, EventLog};
//!
//! let mut log = EventLog::new();
//! log.log(Event::AgentStepFailed {
//!     tick: 3,
//!     agent_id: "LogisticsAgent_PORT_1".to_string(),
//!     error: "node PORT_1 not found".to_string(),
//! });
//!
//! assert_eq!(log.events_for_agent("LogisticsAgent_PORT_1").len(), 1);
//! ```

use crate::events::EventKind;
use serde::{Deserialize, Serialize};

/// Something the simulation loop did or observed.
///
/// All events include a tick number for temporal ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Loop transitioned to RUNNING
    RunStarted {
        tick: usize,
        total_ticks: usize,
        agent_count: usize,
    },

    /// A schedule request targeted a tick already in the past
    ScheduleRejected {
        tick: usize,
        requested_tick: usize,
        kind: EventKind,
        description: String,
    },

    /// A scheduled action ran successfully
    EventFired {
        tick: usize,
        kind: EventKind,
        description: String,
    },

    /// A scheduled action returned an error; the event is discarded
    EventFailed {
        tick: usize,
        kind: EventKind,
        description: String,
        error: String,
    },

    /// An agent's step returned an error; the tick continued
    AgentStepFailed {
        tick: usize,
        agent_id: String,
        error: String,
    },

    /// Loop reached FINISHED or STOPPED
    RunFinished {
        tick: usize,
        ticks_run: usize,
        stopped_early: bool,
    },
}

impl Event {
    /// Get the tick number when this event occurred
    pub fn tick(&self) -> usize {
        match self {
            Event::RunStarted { tick, .. } => *tick,
            Event::ScheduleRejected { tick, .. } => *tick,
            Event::EventFired { tick, .. } => *tick,
            Event::EventFailed { tick, .. } => *tick,
            Event::AgentStepFailed { tick, .. } => *tick,
            Event::RunFinished { tick, .. } => *tick,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::RunStarted { .. } => "RunStarted",
            Event::ScheduleRejected { .. } => "ScheduleRejected",
            Event::EventFired { .. } => "EventFired",
            Event::EventFailed { .. } => "EventFailed",
            Event::AgentStepFailed { .. } => "AgentStepFailed",
            Event::RunFinished { .. } => "RunFinished",
        }
    }

    /// Get agent ID if event relates to a specific agent
    pub fn agent_id(&self) -> Option<&str> {
        match self {
            Event::AgentStepFailed { agent_id, .. } => Some(agent_id),
            _ => None,
        }
    }
}

/// Event log for storing and querying run events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific tick
    pub fn events_at_tick(&self, tick: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.tick() == tick).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific agent
    pub fn events_for_agent(&self, agent_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.agent_id() == Some(agent_id))
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
