//! Tests for EventQueue ordering and exactly-once firing

use proptest::prelude::*;
use supply_chain_sim_core_rs::events::ActionError;
use supply_chain_sim_core_rs::{EventKind, EventQueue, ScheduleError};

type Log = Vec<String>;

fn push(label: &str) -> impl FnOnce(&mut Log) -> Result<(), ActionError> + 'static {
    let label = label.to_string();
    move |log: &mut Log| {
        log.push(label);
        Ok(())
    }
}

fn run_ticks(queue: &mut EventQueue<Log>, ticks: std::ops::Range<usize>) -> Log {
    let mut log = Vec::new();
    for tick in ticks {
        queue.process(tick, &mut log);
    }
    log
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_events_fire_in_tick_order() {
    let mut queue = EventQueue::new();
    queue.schedule(3, EventKind::General, "c", push("c")).unwrap();
    queue.schedule(0, EventKind::General, "a", push("a")).unwrap();
    queue.schedule(1, EventKind::General, "b", push("b")).unwrap();

    assert_eq!(run_ticks(&mut queue, 0..5), vec!["a", "b", "c"]);
}

#[test]
fn test_same_tick_fires_in_scheduling_order() {
    let mut queue = EventQueue::new();
    for label in ["first", "second", "third"] {
        queue.schedule(2, EventKind::General, label, push(label)).unwrap();
    }

    let mut log = Vec::new();
    let summary = queue.process(2, &mut log);

    assert_eq!(log, vec!["first", "second", "third"]);
    let ids: Vec<u64> = summary.outcomes.iter().map(|o| o.record.id).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

// ============================================================================
// Exactly once
// ============================================================================

#[test]
fn test_reprocessing_a_tick_never_refires() {
    let mut queue = EventQueue::new();
    queue.schedule(1, EventKind::DisruptionStart, "once", push("x")).unwrap();

    let mut log = Vec::new();
    assert_eq!(queue.process(1, &mut log).count(), 1);
    assert_eq!(queue.process(1, &mut log).count(), 0);
    assert_eq!(log, vec!["x"]);
    assert!(queue.is_empty());
}

#[test]
fn test_event_for_current_tick_is_accepted() {
    let mut queue = EventQueue::new();
    let mut log = Vec::new();
    queue.process(4, &mut log);

    assert!(queue.schedule(4, EventKind::General, "now", push("now")).is_ok());
    assert_eq!(queue.process(4, &mut log).fired_count(), 1);
}

#[test]
fn test_past_tick_rejected_and_never_processed() {
    let mut queue = EventQueue::new();
    let mut log = Vec::new();
    queue.process(5, &mut log);

    let err = queue
        .schedule(3, EventKind::General, "late", push("late"))
        .unwrap_err();
    assert_eq!(
        err,
        ScheduleError::PastTick {
            requested: 3,
            current: 5
        }
    );
    assert!(queue.is_empty());

    for tick in 5..10 {
        queue.process(tick, &mut log);
    }
    assert!(log.is_empty());
}

#[test]
fn test_failing_action_is_discarded() {
    let mut queue: EventQueue<Log> = EventQueue::new();
    queue
        .schedule(2, EventKind::PolicyChange, "bad", |_| {
            Err(ActionError::Failed("boom".to_string()))
        })
        .unwrap();
    queue.schedule(2, EventKind::General, "good", push("good")).unwrap();

    let mut log = Vec::new();
    let summary = queue.process(2, &mut log);

    assert_eq!(summary.count(), 2);
    assert_eq!(summary.fired_count(), 1);
    assert_eq!(summary.failed_count(), 1);

    let failure = summary.failures().next().unwrap();
    assert_eq!(failure.record.description, "bad");
    assert!(!failure.record.fired);
    assert_eq!(failure.error, Some(ActionError::Failed("boom".to_string())));

    assert_eq!(log, vec!["good"]);
    assert!(queue.is_empty());
    assert_eq!(queue.process(3, &mut log).count(), 0);
}

#[test]
fn test_action_can_mutate_context() {
    let mut queue: EventQueue<u32> = EventQueue::new();
    for _ in 0..3 {
        queue
            .schedule(0, EventKind::AgentAction, "inc", |n: &mut u32| {
                *n += 10;
                Ok(())
            })
            .unwrap();
    }

    let mut counter = 0;
    queue.process(0, &mut counter);
    assert_eq!(counter, 30);
}

#[test]
fn test_last_representable_tick_fires() {
    let mut queue = EventQueue::new();
    queue.schedule(usize::MAX - 1, EventKind::General, "penultimate", push("a")).unwrap();
    queue.schedule(usize::MAX, EventKind::General, "last", push("b")).unwrap();
    queue.schedule(usize::MAX, EventKind::General, "last again", push("c")).unwrap();

    let mut log = Vec::new();
    assert_eq!(queue.process(usize::MAX - 1, &mut log).count(), 1);
    let summary = queue.process(usize::MAX, &mut log);

    assert_eq!(summary.fired_count(), 2);
    assert_eq!(log, vec!["a", "b", "c"]);
    assert!(queue.is_empty());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_every_event_fires_once_in_order(ticks in prop::collection::vec(0usize..20, 0..40)) {
        let mut queue = EventQueue::new();
        for (i, &tick) in ticks.iter().enumerate() {
            let label = format!("{}:{}", tick, i);
            queue.schedule(tick, EventKind::General, label.clone(), push(&label)).unwrap();
        }

        let log = run_ticks(&mut queue, 0..20);

        let mut expected: Vec<(usize, usize)> =
            ticks.iter().enumerate().map(|(i, &t)| (t, i)).collect();
        expected.sort();
        let expected: Vec<String> =
            expected.into_iter().map(|(t, i)| format!("{}:{}", t, i)).collect();

        prop_assert_eq!(log, expected);
        prop_assert!(queue.is_empty());
    }
}
