use crate::core::actors::Actor;
use crate::core::errors::SimError;
use crate::core::events::EventKind;
use crate::core::restaurant::Restaurant;
use crate::core::types::{CustomerId, CustomerOrder, Minutes, Role, WaiterId};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaiterReport {
    pub waiter: WaiterId,
    pub orders_relayed: usize,
    pub dishes_served: usize,
    pub shift_ended_at: Minutes,
}

/// What a waiter decided to do after waking up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    EndShift,
    Serve(CustomerId),
    Relay { order: CustomerOrder, taken_at: Minutes },
    Idle,
}

/// Relays orders from its customers to the kitchen and food back to them
pub struct WaiterActor {
    restaurant: Arc<Restaurant>,
    id: WaiterId,
    last_seen: Minutes,
    orders_relayed: usize,
    dishes_served: usize,
}

impl WaiterActor {
    pub fn new(restaurant: Arc<Restaurant>, id: WaiterId) -> Self {
        Self {
            restaurant,
            id,
            last_seen: 0,
            orders_relayed: 0,
            dishes_served: 0,
        }
    }

    /// Decide on the next task; finished food is served before new orders are taken
    fn next_task(&mut self) -> Result<Task, SimError> {
        let restaurant = Arc::clone(&self.restaurant);
        let mut world = restaurant.lock()?;
        self.last_seen = world.now();

        if world.waiter_may_leave(self.id)? {
            world.record(self.role(), EventKind::ShiftEnded);
            return Ok(Task::EndShift);
        }
        if let Some(customer) = world.take_ready(self.id)? {
            world.record(self.role(), EventKind::ServingFood { customer });
            restaurant.notify_slot_freed();
            return Ok(Task::Serve(customer));
        }
        if world.pending_customer_orders(self.id)? > 0 {
            let order = world.dequeue_customer_order(self.id)?;
            return Ok(Task::Relay { order, taken_at: world.now() });
        }
        Ok(Task::Idle)
    }

    fn relay(&mut self, order: CustomerOrder, taken_at: Minutes) -> Result<(), SimError> {
        let restaurant = Arc::clone(&self.restaurant);
        let taking = restaurant.config().order_taking_minutes;
        restaurant.pacer().pause(taking);

        {
            let mut world = restaurant.lock()?;
            self.last_seen = world.advance_time(taken_at.saturating_add(taking));
            world.enqueue_cook_order(self.id, order.customer, order.party_size)?;
            world.record(self.role(), EventKind::OrderPlaced { customer: order.customer });
        }
        restaurant.signals().wake_cook()?;
        restaurant.signals().wake_customer(order.customer)?;
        self.orders_relayed += 1;
        Ok(())
    }
}

impl Actor for WaiterActor {
    type Output = WaiterReport;

    fn role(&self) -> Role {
        Role::Waiter(self.id)
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

    fn run(&mut self) -> Result<WaiterReport, SimError> {
        loop {
            self.restaurant.signals().wait_waiter(self.id)?;
            match self.next_task()? {
                Task::EndShift => break,
                Task::Serve(customer) => {
                    self.restaurant.signals().wake_customer(customer)?;
                    self.dishes_served += 1;
                }
                Task::Relay { order, taken_at } => self.relay(order, taken_at)?,
                Task::Idle => trace!("Waiter {}: woke up with nothing to do", self.id),
            }
        }
        debug!(
            "Waiter {}: relayed {} orders, served {} dishes",
            self.id, self.orders_relayed, self.dishes_served
        );
        Ok(WaiterReport {
            waiter: self.id,
            orders_relayed: self.orders_relayed,
            dishes_served: self.dishes_served,
            shift_ended_at: self.last_seen,
        })
    }
}
