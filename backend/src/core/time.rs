//! Time management for the simulation
//!
//! The simulation operates in discrete ticks; one tick is nominally one day.
//! A run has a fixed horizon of `total_ticks`. This module provides
//! deterministic time advancement towards that horizon.

use serde::{Deserialize, Serialize};

/// Tracks the current tick of a run and its horizon
///
/// # Example
/// ```
/// use supply_chain_sim_core_rs::TimeManager;
///
/// let mut time = TimeManager::new(30); // 30-day run
/// assert_eq!(time.current_tick(), 0);
/// assert!(!time.is_finished());
///
/// time.advance_tick();
/// assert_eq!(time.current_tick(), 1);
/// assert_eq!(time.remaining_ticks(), 29);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeManager {
    /// Ticks elapsed since the run started
    current_tick: usize,
    /// Number of ticks the run lasts
    total_ticks: usize,
}

impl TimeManager {
    /// Create a new TimeManager
    ///
    /// A horizon of zero is allowed: such a run is finished before any
    /// tick executes.
    ///
    /// # Arguments
    /// * `total_ticks` - Number of ticks (days) to simulate
    pub fn new(total_ticks: usize) -> Self {
        Self {
            current_tick: 0,
            total_ticks,
        }
    }

    /// Advance time by one tick
    ///
    /// Advancing past the horizon is a no-op so the clock never reports a
    /// tick the run did not execute.
    ///
    /// # Example
    /// ```
    /// use supply_chain_sim_core_rs::TimeManager;
    ///
    /// let mut time = TimeManager::new(1);
    /// time.advance_tick();
    /// time.advance_tick();
    /// assert_eq!(time.current_tick(), 1);
    /// ```
    pub fn advance_tick(&mut self) {
        if self.current_tick < self.total_ticks {
            self.current_tick += 1;
        }
    }

    /// Get the current tick (ticks elapsed since start)
    pub fn current_tick(&self) -> usize {
        self.current_tick
    }

    /// Get the run horizon
    pub fn total_ticks(&self) -> usize {
        self.total_ticks
    }

    /// Ticks left before the horizon is reached
    pub fn remaining_ticks(&self) -> usize {
        self.total_ticks - self.current_tick
    }

    /// True once the current tick has reached the horizon
    ///
    /// # Example
    /// ```
    /// use supply_chain_sim_core_rs::TimeManager;
    ///
    /// let time = TimeManager::new(0);
    /// assert!(time.is_finished());
    /// ```
    pub fn is_finished(&self) -> bool {
        self.current_tick >= self.total_ticks
    }

    /// True if the current tick is the final tick of the run
    pub fn is_last_tick(&self) -> bool {
        self.total_ticks > 0 && self.current_tick == self.total_ticks - 1
    }
}
