use crate::core::actors::Actor;
use crate::core::errors::SimError;
use crate::core::events::EventKind;
use crate::core::restaurant::Restaurant;
use crate::core::types::{CookId, CookOrder, Minutes, Role, WaiterId};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookReport {
    pub cook: CookId,
    pub orders_cooked: usize,
    pub left_at: Minutes,
}

/// Takes orders from the shared cook queue and hands the food to the
/// ordering waiter's ready-slot
pub struct CookActor {
    restaurant: Arc<Restaurant>,
    id: CookId,
    last_seen: Minutes,
    orders_cooked: usize,
}

impl CookActor {
    pub fn new(restaurant: Arc<Restaurant>, id: CookId) -> Self {
        Self {
            restaurant,
            id,
            last_seen: 0,
            orders_cooked: 0,
        }
    }

    /// Wake every waiter so each can check whether its own shift is over
    fn broadcast_closing(&self) -> Result<(), SimError> {
        let signals = self.restaurant.signals();
        for index in 0..self.restaurant.config().waiter_count {
            signals.wake_waiter(WaiterId::new(index))?;
        }
        Ok(())
    }

    fn cook(&mut self, order: CookOrder, started_at: Minutes) -> Result<(), SimError> {
        let restaurant = Arc::clone(&self.restaurant);
        let duration = restaurant.config().cooking_minutes(order.party_size);
        restaurant.pacer().pause(duration);

        {
            let world = restaurant.lock()?;
            // Older orders of this waiter go out first, and one at a time.
            let mut world = restaurant.wait_for_free_slot(world, order.waiter, order.customer)?;
            self.last_seen = world.advance_time(started_at.saturating_add(duration));
            world.set_ready(order.waiter, order.customer)?;
            world.record(
                self.role(),
                EventKind::OrderPrepared {
                    waiter: order.waiter,
                    customer: order.customer,
                    party_size: order.party_size,
                },
            );
        }
        restaurant.signals().wake_waiter(order.waiter)?;
        self.orders_cooked += 1;
        Ok(())
    }
}

impl Actor for CookActor {
    type Output = CookReport;

    fn role(&self) -> Role {
        Role::Cook(self.id)
    }

    fn restaurant(&self) -> &Restaurant {
        &self.restaurant
    }

    fn last_seen(&self) -> Minutes {
        self.last_seen
    }

    fn announce_ready(&mut self) -> Result<(), SimError> {
        let restaurant = Arc::clone(&self.restaurant);
        let mut world = restaurant.lock()?;
        self.last_seen = world.now();
        world.record(self.role(), EventKind::Ready);
        Ok(())
    }

    fn run(&mut self) -> Result<CookReport, SimError> {
        let restaurant = Arc::clone(&self.restaurant);
        loop {
            restaurant.signals().wait_cook()?;
            let (order, started_at) = {
                let mut world = restaurant.lock()?;
                self.last_seen = world.now();
                if world.cook_may_leave() {
                    world.record(self.role(), EventKind::CookLeaving);
                    drop(world);
                    self.broadcast_closing()?;
                    break;
                }
                if world.cook_queue_len() == 0 {
                    trace!("Cook {}: queue already drained", self.id);
                    continue;
                }
                let order = world.dequeue_cook_order()?;
                world.record(
                    self.role(),
                    EventKind::PreparingOrder {
                        waiter: order.waiter,
                        customer: order.customer,
                        party_size: order.party_size,
                    },
                );
                (order, world.now())
            };
            self.cook(order, started_at)?;
        }
        debug!("Cook {}: cooked {} orders", self.id, self.orders_cooked);
        Ok(CookReport {
            cook: self.id,
            orders_cooked: self.orders_cooked,
            left_at: self.last_seen,
        })
    }
}
