use crate::core::actors::{CookReport, CustomerOutcome, CustomerReport, WaiterReport};
use crate::core::events::{Event, EventKind, TurnAwayReason};
use crate::core::execution::config::SimulationConfig;
use crate::core::types::{Minutes, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything a finished simulation run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub config: SimulationConfig,
    /// Chronological event stream
    pub events: Vec<Event>,
    /// One entry per scheduled customer, in schedule order
    pub customers: Vec<CustomerReport>,
    pub waiters: Vec<WaiterReport>,
    pub cooks: Vec<CookReport>,
    pub final_time: Minutes,
    pub free_tables: usize,
}

impl SimulationReport {
    /// Customers that were seated and left after eating
    pub fn served(&self) -> usize {
        self.customers
            .iter()
            .filter(|c| matches!(c.outcome, CustomerOutcome::Departed { .. }))
            .count()
    }

    pub fn turned_away(&self, reason: TurnAwayReason) -> usize {
        self.customers
            .iter()
            .filter(|c| matches!(c.outcome, CustomerOutcome::TurnedAway { reason: r, .. } if r == reason))
            .count()
    }

    /// Mean time from seating to food, over served customers
    pub fn average_waiting_time(&self) -> Option<f64> {
        let waits: Vec<Minutes> = self
            .customers
            .iter()
            .filter_map(|c| match c.outcome {
                CustomerOutcome::Departed { waiting_time, .. } => Some(waiting_time),
                CustomerOutcome::TurnedAway { .. } => None,
            })
            .collect();
        if waits.is_empty() {
            return None;
        }
        Some(waits.iter().map(|&w| f64::from(w)).sum::<f64>() / waits.len() as f64)
    }

    pub fn longest_waiting_time(&self) -> Option<Minutes> {
        self.customers
            .iter()
            .filter_map(|c| match c.outcome {
                CustomerOutcome::Departed { waiting_time, .. } => Some(waiting_time),
                CustomerOutcome::TurnedAway { .. } => None,
            })
            .max()
    }

    /// Events recorded by one actor, in order
    pub fn events_of(&self, role: Role) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.actor == role)
    }

    /// Events of a given shape, e.g. every `ServingFood`
    pub fn events_matching<'a, F>(&'a self, predicate: F) -> impl Iterator<Item = &'a Event>
    where
        F: Fn(&EventKind) -> bool + 'a,
    {
        self.events.iter().filter(move |e| predicate(&e.kind))
    }

    /// The console rendering of the whole run, one line per event
    pub fn render(&self) -> String {
        self.events.iter().map(|e| format!("{}\n", e)).collect()
    }
}
