use crate::core::clock::format_wall_clock;
use crate::core::types::{CustomerId, Minutes, Role, WaiterId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a customer left without being seated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnAwayReason {
    /// Arrived after closing time
    LateArrival,
    /// Every table was taken
    NoTable,
    /// The signal board had no room left for another customer
    Overflow,
}

impl fmt::Display for TurnAwayReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnAwayReason::LateArrival => write!(f, "late arrival"),
            TurnAwayReason::NoTable => write!(f, "no empty table"),
            TurnAwayReason::Overflow => write!(f, "restaurant overbooked"),
        }
    }
}

/// What happened, with the data the event carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Ready,
    Arrives { party_size: u32, waiter: WaiterId },
    TurnedAway { reason: TurnAwayReason },
    OrderPlaced { customer: CustomerId },
    OrderAcked { waiter: WaiterId },
    PreparingOrder { waiter: WaiterId, customer: CustomerId, party_size: u32 },
    OrderPrepared { waiter: WaiterId, customer: CustomerId, party_size: u32 },
    ServingFood { customer: CustomerId },
    FoodReady { waiting_time: Minutes },
    Departs { tables_available: usize },
    ShiftEnded,
    CookLeaving,
}

/// A single entry of the simulation's event stream.
///
/// Events are appended under the world lock with the clock value current at
/// that moment, so the stream is ordered by virtual time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub time: Minutes,
    pub actor: Role,
    pub kind: EventKind,
}

impl Event {
    pub fn new(time: Minutes, actor: Role, kind: EventKind) -> Self {
        Self { time, actor, kind }
    }

    /// The customer this event concerns, whichever role recorded it
    pub fn customer(&self) -> Option<CustomerId> {
        match (self.actor, self.kind) {
            (Role::Customer(id), _) => Some(id),
            (_, EventKind::OrderPlaced { customer })
            | (_, EventKind::ServingFood { customer })
            | (_, EventKind::PreparingOrder { customer, .. })
            | (_, EventKind::OrderPrepared { customer, .. }) => Some(customer),
            _ => None,
        }
    }

    // Console layout: each role gets its own column so interleaved output stays readable.
    fn indent(&self) -> String {
        match self.actor {
            Role::Cook(id) => "\t".repeat(id.index()),
            Role::Waiter(id) => "  ".repeat(id.index()),
            Role::Customer(_) => match self.kind {
                EventKind::TurnedAway { .. } => " \t\t\t\t".to_string(),
                EventKind::OrderAcked { .. } => "   ".to_string(),
                EventKind::FoodReady { .. } => " \t  ".to_string(),
                EventKind::Departs { .. } => " \t\t  ".to_string(),
                _ => " ".to_string(),
            },
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", format_wall_clock(self.time), self.indent(), self.actor)?;
        match self.kind {
            EventKind::Ready => write!(f, " is ready"),
            EventKind::Arrives { party_size, .. } => write!(f, " arrives (count = {})", party_size),
            EventKind::TurnedAway { reason } => write!(f, " leaves ({})", reason),
            EventKind::OrderPlaced { customer } => {
                write!(f, ": Placed order for customer {}", customer)
            }
            EventKind::OrderAcked { waiter } => write!(f, ": Order placed to waiter {}", waiter),
            EventKind::PreparingOrder { waiter, customer, party_size } => write!(
                f,
                ": Preparing order (Waiter {}, Customer {}, Count {})",
                waiter, customer, party_size
            ),
            EventKind::OrderPrepared { waiter, customer, party_size } => write!(
                f,
                ": Prepared order (Waiter {}, Customer {}, Count {})",
                waiter, customer, party_size
            ),
            EventKind::ServingFood { customer } => {
                write!(f, ": Serving food to customer {}", customer)
            }
            EventKind::FoodReady { waiting_time } => {
                write!(f, ": gets food [waiting time = {}]", waiting_time)
            }
            EventKind::Departs { tables_available } => write!(
                f,
                ": Finished eating, leaving ({} tables available)",
                tables_available
            ),
            EventKind::ShiftEnded => write!(f, ": Shift ended"),
            EventKind::CookLeaving => write!(f, ": Leaving"),
        }
    }
}
