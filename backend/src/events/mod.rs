//! Scheduled events
//!
//! - **queue**: tick-ordered queue of one-shot actions
//! - **types**: scenario events as they appear in configuration
//! - **handler**: scenario events → queued world actions

pub mod handler;
pub mod queue;
pub mod types;

pub use handler::schedule_scenario_events;
pub use queue::{
    Action, ActionError, EventId, EventKind, EventOutcome, EventQueue, EventRecord,
    ProcessSummary, ScheduleError,
};
pub use types::{ScenarioEvent, ScheduledScenarioEvent};
