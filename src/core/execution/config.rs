//! Configuration for restaurant simulation runs
//!
//! This module provides the configuration types for a single simulation run
//! (staffing, service times, pacing) and for batches of independent runs,
//! including concurrency settings and thread pool management.

use crate::core::errors::SimError;
use crate::core::types::Minutes;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one simulation run
///
/// The defaults reproduce the reference restaurant: ten tables, five waiters,
/// two cooks, closing at 3:00 pm and 100 ms of real time per simulated minute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of tables, one per party
    pub table_capacity: usize,
    /// Number of waiter actors
    pub waiter_count: usize,
    /// Number of cook actors
    pub cook_count: usize,
    /// Minutes after opening past which arrivals are turned away
    pub closing_time: Minutes,
    /// Minutes a waiter spends taking an order
    pub order_taking_minutes: Minutes,
    /// Minutes of cooking per guest in the party
    pub cooking_minutes_per_guest: Minutes,
    /// Minutes a party spends eating
    pub eating_minutes: Minutes,
    /// Real time per simulated minute; zero disables pacing
    pub time_scale: Duration,
    /// Maximum number of customers holding a wake signal at once
    pub customer_capacity: usize,
}

impl SimulationConfig {
    /// Create a new simulation configuration with default values
    pub fn new() -> Self {
        Self {
            table_capacity: 10,
            waiter_count: 5,
            cook_count: 2,
            closing_time: 240,
            order_taking_minutes: 1,
            cooking_minutes_per_guest: 5,
            eating_minutes: 30,
            time_scale: Duration::from_millis(100),
            customer_capacity: 200,
        }
    }

    pub fn with_tables(mut self, tables: usize) -> Self {
        self.table_capacity = tables;
        self
    }

    pub fn with_waiters(mut self, waiters: usize) -> Self {
        self.waiter_count = waiters;
        self
    }

    pub fn with_cooks(mut self, cooks: usize) -> Self {
        self.cook_count = cooks;
        self
    }

    pub fn with_closing_time(mut self, closing_time: Minutes) -> Self {
        self.closing_time = closing_time;
        self
    }

    /// Set the real duration of one simulated minute
    ///
    /// # Note
    /// Event ordering across actors only follows the virtual clock when the
    /// scale leaves the threads enough room; a zero scale still keeps every
    /// invariant but lets unrelated actors overtake each other freely.
    pub fn with_time_scale(mut self, per_minute: Duration) -> Self {
        self.time_scale = per_minute;
        self
    }

    pub fn with_customer_capacity(mut self, capacity: usize) -> Self {
        self.customer_capacity = capacity;
        self
    }

    /// Cooking time for a party of `party_size`
    pub fn cooking_minutes(&self, party_size: u32) -> Minutes {
        self.cooking_minutes_per_guest.saturating_mul(party_size)
    }

    /// Reject configurations the actors cannot run with
    pub fn validate(&self) -> Result<(), SimError> {
        if self.table_capacity == 0 {
            return Err(SimError::InvalidConfig("at least one table is required".to_string()));
        }
        if self.waiter_count == 0 {
            return Err(SimError::InvalidConfig("at least one waiter is required".to_string()));
        }
        if self.cook_count == 0 {
            return Err(SimError::InvalidConfig("at least one cook is required".to_string()));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Enumeration of supported concurrency modes for batch runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcurrencyMode {
    /// Runs are executed one after another on the calling thread
    Sequential,
    /// Runs are spread over a Rayon thread pool
    Rayon,
}

impl Default for ConcurrencyMode {
    fn default() -> Self {
        ConcurrencyMode::Sequential
    }
}

/// Configuration for a batch of independent simulation runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// The concurrency mode to use for execution
    pub concurrency_mode: ConcurrencyMode,
    /// The size of the thread pool for parallel execution
    /// Only relevant when concurrency_mode is Rayon
    pub thread_pool_size: Option<usize>,
}

impl BatchConfig {
    /// Create a new batch configuration with default values
    ///
    /// Default configuration uses Sequential mode with no thread pool
    pub fn new() -> Self {
        Self {
            concurrency_mode: ConcurrencyMode::default(),
            thread_pool_size: None,
        }
    }

    /// Set the concurrency mode for the batch
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    /// Set the thread pool size for parallel execution
    ///
    /// # Note
    /// This setting only affects execution when concurrency_mode is Rayon
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new()
    }
}
