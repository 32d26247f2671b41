//! Tick-ordered event queue
//!
//! Events carry an action bound at scheduling time. The queue is generic
//! over the context the actions receive, so it has no knowledge of the
//! simulation loop that drives it.
//!
//! # Critical Invariants
//!
//! 1. **Ordering**: pending events are ordered by `(tick, seq)`; events for
//!    the same tick fire in scheduling order
//! 2. **No past scheduling**: `schedule` rejects `tick < current_tick`
//! 3. **Exactly once**: a due event's action runs once, then the event
//!    leaves the queue whether or not the action succeeded

use crate::agents::AgentError;
use crate::network::{GraphError, ScopeError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Category of a scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    General,
    DisruptionStart,
    DisruptionEnd,
    PolicyChange,
    AgentAction,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::General => "GENERAL",
            EventKind::DisruptionStart => "DISRUPTION_START",
            EventKind::DisruptionEnd => "DISRUPTION_END",
            EventKind::PolicyChange => "POLICY_CHANGE",
            EventKind::AgentAction => "AGENT_ACTION",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Cannot schedule event for tick {requested}: current tick is {current}")]
    PastTick { requested: usize, current: usize },
}

/// Failure reported by an event action
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActionError {
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// Action run when an event fires
pub type Action<C> = Box<dyn FnOnce(&mut C) -> Result<(), ActionError>>;

/// Identifier returned by [`EventQueue::schedule`]
pub type EventId = u64;

struct PendingEvent<C> {
    kind: EventKind,
    description: String,
    action: Action<C>,
}

/// What happened to one event during [`EventQueue::process`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub tick: usize,
    pub kind: EventKind,
    pub description: String,

    /// Set only when the action returned `Ok`
    pub fired: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventOutcome {
    pub record: EventRecord,
    pub error: Option<ActionError>,
}

/// Result of processing one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessSummary {
    pub tick: usize,

    /// One entry per invoked action, in firing order
    pub outcomes: Vec<EventOutcome>,

    /// Events left behind for a tick that was never processed
    pub missed: usize,
}

impl ProcessSummary {
    /// Number of actions invoked, failures included
    pub fn count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn fired_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.record.fired).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &EventOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some())
    }
}

/// Time-ordered queue of one-shot actions
///
/// # Example
///
/// ```rust
/// use supply_chain_sim_core_rs::events::{EventKind, EventQueue};
///
/// let mut queue: EventQueue<Vec<&'static str>> = EventQueue::new();
/// queue.schedule(2, EventKind::General, "second", |log| { log.push("b"); Ok(()) }).unwrap();
/// queue.schedule(1, EventKind::General, "first", |log| { log.push("a"); Ok(()) }).unwrap();
///
/// let mut log = Vec::new();
/// for tick in 0..3 {
///     queue.process(tick, &mut log);
/// }
/// assert_eq!(log, vec!["a", "b"]);
/// assert!(queue.is_empty());
/// ```
pub struct EventQueue<C> {
    current_tick: usize,
    next_seq: u64,
    pending: BTreeMap<(usize, EventId), PendingEvent<C>>,
}

impl<C> Default for EventQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for EventQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("current_tick", &self.current_tick)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl<C> EventQueue<C> {
    pub fn new() -> Self {
        Self {
            current_tick: 0,
            next_seq: 0,
            pending: BTreeMap::new(),
        }
    }

    pub fn current_tick(&self) -> usize {
        self.current_tick
    }

    /// Queue `action` to run at `tick`
    ///
    /// An empty description is replaced by `"<KIND> at tick <tick>"`.
    ///
    /// # Errors
    /// `PastTick` if `tick` is before the queue's current tick. Nothing is
    /// inserted in that case.
    pub fn schedule<F>(
        &mut self,
        tick: usize,
        kind: EventKind,
        description: impl Into<String>,
        action: F,
    ) -> Result<EventId, ScheduleError>
    where
        F: FnOnce(&mut C) -> Result<(), ActionError> + 'static,
    {
        let mut description = description.into();
        if tick < self.current_tick {
            warn!(
                requested = tick,
                current = self.current_tick,
                kind = %kind,
                description = %description,
                "Rejected event scheduled in the past"
            );
            return Err(ScheduleError::PastTick {
                requested: tick,
                current: self.current_tick,
            });
        }
        if description.is_empty() {
            description = format!("{} at tick {}", kind, tick);
        }

        let id = self.next_seq;
        self.next_seq += 1;
        debug!(id, tick, kind = %kind, description = %description, "Scheduled event");
        self.pending.insert(
            (tick, id),
            PendingEvent {
                kind,
                description,
                action: Box::new(action),
            },
        );
        Ok(id)
    }

    /// Run every event due at `tick`, in order, then drop them
    ///
    /// Failing actions are logged and discarded; they are never retried.
    /// Events for ticks before `tick` that were never processed are dropped
    /// with a warning and counted in [`ProcessSummary::missed`].
    pub fn process(&mut self, tick: usize, ctx: &mut C) -> ProcessSummary {
        self.advance_to(tick);

        let due = match tick.checked_add(1) {
            Some(next) => {
                let later = self.pending.split_off(&(next, 0));
                std::mem::replace(&mut self.pending, later)
            }
            // Nothing can be pending beyond the last representable tick
            None => std::mem::take(&mut self.pending),
        };

        let mut summary = ProcessSummary {
            tick,
            ..ProcessSummary::default()
        };

        for ((event_tick, id), event) in due {
            if event_tick < tick {
                warn!(id, event_tick, tick, description = %event.description, "Dropped missed event");
                summary.missed += 1;
                continue;
            }

            let PendingEvent {
                kind,
                description,
                action,
            } = event;
            let result = action(ctx);

            let fired = result.is_ok();
            match &result {
                Ok(()) => debug!(id, tick, kind = %kind, description = %description, "Event fired"),
                Err(e) => error!(
                    id,
                    tick,
                    kind = %kind,
                    description = %description,
                    error = %e,
                    "Event action failed"
                ),
            }

            summary.outcomes.push(EventOutcome {
                record: EventRecord {
                    id,
                    tick: event_tick,
                    kind,
                    description,
                    fired,
                },
                error: result.err(),
            });
        }

        summary
    }

    /// Move the queue clock forward; never moves it back
    pub fn advance_to(&mut self, tick: usize) {
        if tick > self.current_tick {
            self.current_tick = tick;
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of events waiting for `tick`
    pub fn pending_at(&self, tick: usize) -> usize {
        self.pending.range((tick, 0)..=(tick, EventId::MAX)).count()
    }

    /// Earliest tick with a pending event
    pub fn next_tick(&self) -> Option<usize> {
        self.pending.keys().next().map(|&(tick, _)| tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_description_gets_default() {
        let mut queue: EventQueue<()> = EventQueue::new();
        queue.schedule(4, EventKind::PolicyChange, "", |_| Ok(())).unwrap();

        let summary = queue.process(4, &mut ());
        assert_eq!(summary.outcomes[0].record.description, "POLICY_CHANGE at tick 4");
    }

    #[test]
    fn test_pending_at_and_next_tick() {
        let mut queue: EventQueue<()> = EventQueue::new();
        assert_eq!(queue.next_tick(), None);

        queue.schedule(7, EventKind::General, "a", |_| Ok(())).unwrap();
        queue.schedule(3, EventKind::General, "b", |_| Ok(())).unwrap();
        queue.schedule(7, EventKind::General, "c", |_| Ok(())).unwrap();

        assert_eq!(queue.next_tick(), Some(3));
        assert_eq!(queue.pending_at(7), 2);
        assert_eq!(queue.pending_at(5), 0);
    }

    #[test]
    fn test_skipped_tick_events_are_dropped() {
        let mut queue: EventQueue<u32> = EventQueue::new();
        queue.schedule(2, EventKind::General, "skipped", |n| {
            *n += 1;
            Ok(())
        })
        .unwrap();

        let mut counter = 0;
        let summary = queue.process(5, &mut counter);
        assert_eq!(summary.missed, 1);
        assert_eq!(summary.count(), 0);
        assert_eq!(counter, 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&EventKind::DisruptionStart).unwrap();
        assert_eq!(json, "\"DISRUPTION_START\"");
    }
}
