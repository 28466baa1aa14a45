use crate::core::actors::Actor;
use crate::core::errors::SimError;
use crate::core::events::{EventKind, TurnAwayReason};
use crate::core::restaurant::Restaurant;
use crate::core::schedule::ScheduleEntry;
use crate::core::signals::SignalError;
use crate::core::types::{CustomerId, Minutes, Role, WaiterId};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a customer's visit ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerOutcome {
    Departed {
        waiter: WaiterId,
        seated_at: Minutes,
        waiting_time: Minutes,
        departed_at: Minutes,
    },
    TurnedAway {
        reason: TurnAwayReason,
        at: Minutes,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerReport {
    pub customer: CustomerId,
    pub party_size: u32,
    pub outcome: CustomerOutcome,
}

/// One customer party, from arrival to departure or turn-away
pub struct CustomerActor {
    restaurant: Arc<Restaurant>,
    entry: ScheduleEntry,
    last_seen: Minutes,
}

impl CustomerActor {
    pub fn new(restaurant: Arc<Restaurant>, entry: ScheduleEntry) -> Self {
        Self {
            restaurant,
            entry,
            last_seen: 0,
        }
    }

    fn report(&self, outcome: CustomerOutcome) -> CustomerReport {
        CustomerReport {
            customer: self.entry.customer,
            party_size: self.entry.party_size,
            outcome,
        }
    }

    fn turn_away(&mut self, reason: TurnAwayReason) -> Result<CustomerReport, SimError> {
        let restaurant = Arc::clone(&self.restaurant);
        let mut world = restaurant.lock()?;
        let now = world.advance_time(self.entry.arrival);
        self.last_seen = now;
        world.record(self.role(), EventKind::TurnedAway { reason });
        Ok(self.report(CustomerOutcome::TurnedAway { reason, at: now }))
    }

    fn visit(&mut self) -> Result<CustomerReport, SimError> {
        let restaurant = Arc::clone(&self.restaurant);
        let signals = restaurant.signals();
        let id = self.entry.customer;
        let role = self.role();

        // Arrival: the late check and the seating decision share one critical section.
        let (seated_at, waiter) = {
            let mut world = restaurant.lock()?;
            let now = world.advance_time(self.entry.arrival);
            self.last_seen = now;
            if world.is_late(now) {
                drop(world);
                return self.turn_away(TurnAwayReason::LateArrival);
            }
            if !world.try_seat() {
                drop(world);
                return self.turn_away(TurnAwayReason::NoTable);
            }
            let waiter = world.next_waiter();
            world.record(role, EventKind::Arrives { party_size: self.entry.party_size, waiter });
            world.enqueue_customer_order(waiter, id, self.entry.party_size)?;
            (now, waiter)
        };
        signals.wake_waiter(waiter)?;

        signals.wait_customer(id)?;
        {
            let mut world = restaurant.lock()?;
            self.last_seen = world.now();
            world.record(role, EventKind::OrderAcked { waiter });
        }

        signals.wait_customer(id)?;
        let food_at = {
            let mut world = restaurant.lock()?;
            let now = world.now();
            self.last_seen = now;
            let waiting_time = now.saturating_sub(seated_at);
            world.record(role, EventKind::FoodReady { waiting_time });
            now
        };

        let eating = restaurant.config().eating_minutes;
        restaurant.pacer().pause(eating);

        let departed_at = {
            let mut world = restaurant.lock()?;
            let now = world.advance_time(food_at.saturating_add(eating));
            self.last_seen = now;
            let tables_available = world.release_table()?;
            world.record(role, EventKind::Departs { tables_available });
            now
        };
        debug!("Customer {} left after waiting {} minutes", id, food_at - seated_at);

        Ok(self.report(CustomerOutcome::Departed {
            waiter,
            seated_at,
            waiting_time: food_at - seated_at,
            departed_at,
        }))
    }
}

impl Actor for CustomerActor {
    type Output = CustomerReport;

    fn role(&self) -> Role {
        Role::Customer(self.entry.customer)
    }

    fn restaurant(&self) -> &Restaurant {
        &self.restaurant
    }

    fn last_seen(&self) -> Minutes {
        self.last_seen
    }

    fn run(&mut self) -> Result<CustomerReport, SimError> {
        let id = self.entry.customer;
        match self.restaurant.signals().register_customer(id) {
            Ok(()) => {}
            Err(SignalError::Capacity(capacity)) => {
                warn!("Customer {}: no signal left ({} in use), turning away", id, capacity);
                return self.turn_away(TurnAwayReason::Overflow);
            }
            Err(err) => return Err(err.into()),
        }
        let visit = self.visit();
        self.restaurant.signals().unregister_customer(id);
        visit
    }
}
