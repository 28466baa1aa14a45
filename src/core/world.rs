use crate::core::clock::VirtualClock;
use crate::core::errors::SimError;
use crate::core::events::{Event, EventKind};
use crate::core::execution::config::SimulationConfig;
use crate::core::fifo::BoundedFifo;
use crate::core::types::{CookOrder, CustomerId, CustomerOrder, Minutes, Role, WaiterId};
use std::collections::BTreeMap;

/// Per-waiter substate
#[derive(Debug, Clone)]
pub struct WaiterStation {
    /// Orders placed by seated customers, oldest first
    orders: BoundedFifo<CustomerOrder>,
    /// Food finished by a cook and not yet served
    ready: Option<CustomerId>,
    /// Customers whose orders were relayed to the kitchen, in relay order.
    /// Food reaches the ready-slot strictly in this order.
    in_kitchen: BoundedFifo<CustomerId>,
    /// Orders of this waiter's customers that have not been served yet
    open_orders: usize,
}

impl WaiterStation {
    fn new(queue_capacity: usize) -> Self {
        Self {
            orders: BoundedFifo::new(queue_capacity),
            ready: None,
            in_kitchen: BoundedFifo::new(queue_capacity),
            open_orders: 0,
        }
    }
}

/// The restaurant's mutable state.
///
/// `SharedWorld` itself is a plain struct; mutual exclusion comes from the
/// single `Mutex` that wraps it in [`crate::core::restaurant::Restaurant`].
/// Every method assumes the caller holds that lock.
#[derive(Debug)]
pub struct SharedWorld {
    clock: VirtualClock,
    closing_time: Minutes,
    table_capacity: usize,
    free_tables: usize,
    waiter_count: usize,
    next_waiter: usize,
    cook_queue: BoundedFifo<CookOrder>,
    stations: BTreeMap<WaiterId, WaiterStation>,
    doors_closed: bool,
    torn_down: bool,
    events: Vec<Event>,
}

impl SharedWorld {
    /// Create the opening-time state described by `config`
    pub fn new(config: &SimulationConfig) -> Self {
        // At most one order per occupied table can be in flight.
        let queue_capacity = config.table_capacity;
        let stations = (0..config.waiter_count)
            .map(|i| (WaiterId::new(i), WaiterStation::new(queue_capacity)))
            .collect();
        Self {
            clock: VirtualClock::new(),
            closing_time: config.closing_time,
            table_capacity: config.table_capacity,
            free_tables: config.table_capacity,
            waiter_count: config.waiter_count,
            next_waiter: 0,
            cook_queue: BoundedFifo::new(queue_capacity),
            stations,
            doors_closed: false,
            torn_down: false,
            events: Vec::new(),
        }
    }

    // ---- clock ----

    pub fn now(&self) -> Minutes {
        self.clock.now()
    }

    /// Set the clock to `max(now, proposed)` and return the new value
    pub fn advance_time(&mut self, proposed: Minutes) -> Minutes {
        self.clock.advance_to(proposed)
    }

    /// Whether a customer arriving at `time` is too late to be seated
    pub fn is_late(&self, time: Minutes) -> bool {
        time > self.closing_time
    }

    /// Closing time has passed, or the runtime has closed the doors
    pub fn is_past_closing(&self) -> bool {
        self.doors_closed || self.is_late(self.clock.now())
    }

    // ---- tables ----

    pub fn free_tables(&self) -> usize {
        self.free_tables
    }

    /// Claim a table; `false` means the customer has to turn away
    pub fn try_seat(&mut self) -> bool {
        if self.free_tables == 0 {
            return false;
        }
        self.free_tables -= 1;
        true
    }

    /// Return a table to the pool and report how many are free afterwards
    pub fn release_table(&mut self) -> Result<usize, SimError> {
        if self.free_tables >= self.table_capacity {
            return Err(SimError::ProtocolViolation(format!(
                "table released while all {} tables are already free",
                self.table_capacity
            )));
        }
        self.free_tables += 1;
        Ok(self.free_tables)
    }

    // ---- waiter assignment ----

    /// Round-robin waiter assignment
    pub fn next_waiter(&mut self) -> WaiterId {
        let waiter = WaiterId::new(self.next_waiter);
        self.next_waiter = (self.next_waiter + 1) % self.waiter_count;
        waiter
    }

    // ---- per-waiter queues ----

    fn station(&self, waiter: WaiterId) -> Result<&WaiterStation, SimError> {
        self.stations
            .get(&waiter)
            .ok_or_else(|| SimError::ProtocolViolation(format!("unknown waiter {}", waiter)))
    }

    fn station_mut(&mut self, waiter: WaiterId) -> Result<&mut WaiterStation, SimError> {
        self.stations
            .get_mut(&waiter)
            .ok_or_else(|| SimError::ProtocolViolation(format!("unknown waiter {}", waiter)))
    }

    pub fn enqueue_customer_order(
        &mut self,
        waiter: WaiterId,
        customer: CustomerId,
        party_size: u32,
    ) -> Result<(), SimError> {
        let station = self.station_mut(waiter)?;
        station
            .orders
            .push(CustomerOrder { customer, party_size })
            .map_err(|order| {
                SimError::ProtocolViolation(format!(
                    "order queue of waiter {} is full, dropping customer {}",
                    waiter, order.customer
                ))
            })?;
        station.open_orders += 1;
        Ok(())
    }

    pub fn dequeue_customer_order(&mut self, waiter: WaiterId) -> Result<CustomerOrder, SimError> {
        self.station_mut(waiter)?.orders.pop().ok_or_else(|| {
            SimError::ProtocolViolation(format!("order queue of waiter {} popped while empty", waiter))
        })
    }

    pub fn pending_customer_orders(&self, waiter: WaiterId) -> Result<usize, SimError> {
        Ok(self.station(waiter)?.orders.len())
    }

    // ---- cook queue ----

    pub fn enqueue_cook_order(
        &mut self,
        waiter: WaiterId,
        customer: CustomerId,
        party_size: u32,
    ) -> Result<(), SimError> {
        self.station_mut(waiter)?
            .in_kitchen
            .push(customer)
            .map_err(|customer| {
                SimError::ProtocolViolation(format!(
                    "kitchen backlog of waiter {} is full, dropping customer {}",
                    waiter, customer
                ))
            })?;
        self.cook_queue
            .push(CookOrder { waiter, customer, party_size })
            .map_err(|order| {
                SimError::ProtocolViolation(format!(
                    "cook queue is full, dropping order of customer {}",
                    order.customer
                ))
            })
    }

    pub fn dequeue_cook_order(&mut self) -> Result<CookOrder, SimError> {
        self.cook_queue
            .pop()
            .ok_or_else(|| SimError::ProtocolViolation("cook queue popped while empty".to_string()))
    }

    pub fn cook_queue_len(&self) -> usize {
        self.cook_queue.len()
    }

    // ---- ready-slots ----

    /// Hand finished food to a waiter.
    ///
    /// The slot must be empty and `customer` must be the oldest of the
    /// waiter's orders still in the kitchen.
    pub fn set_ready(&mut self, waiter: WaiterId, customer: CustomerId) -> Result<(), SimError> {
        let station = self.station_mut(waiter)?;
        if let Some(waiting) = station.ready {
            return Err(SimError::ProtocolViolation(format!(
                "ready-slot of waiter {} already holds customer {}, cannot hand over customer {}",
                waiter, waiting, customer
            )));
        }
        match station.in_kitchen.peek() {
            Some(&next) if next == customer => {}
            Some(&next) => {
                return Err(SimError::ProtocolViolation(format!(
                    "food for customer {} overtook customer {} at waiter {}",
                    customer, next, waiter
                )))
            }
            None => {
                return Err(SimError::ProtocolViolation(format!(
                    "customer {} has no order in the kitchen for waiter {}",
                    customer, waiter
                )))
            }
        }
        station.in_kitchen.pop();
        station.ready = Some(customer);
        Ok(())
    }

    /// Whether food for `customer` may be handed to `waiter` right now
    pub fn slot_open_for(&self, waiter: WaiterId, customer: CustomerId) -> Result<bool, SimError> {
        let station = self.station(waiter)?;
        Ok(station.ready.is_none() && station.in_kitchen.peek() == Some(&customer))
    }

    /// Clear the ready-slot; this is the moment the order stops being open
    pub fn take_ready(&mut self, waiter: WaiterId) -> Result<Option<CustomerId>, SimError> {
        let station = self.station_mut(waiter)?;
        let Some(customer) = station.ready.take() else {
            return Ok(None);
        };
        station.open_orders = station.open_orders.checked_sub(1).ok_or_else(|| {
            SimError::ProtocolViolation(format!(
                "waiter {} served customer {} without an open order",
                waiter, customer
            ))
        })?;
        Ok(Some(customer))
    }

    pub fn ready_slot(&self, waiter: WaiterId) -> Option<CustomerId> {
        self.stations.get(&waiter).and_then(|station| station.ready)
    }

    // ---- closing ----

    /// Orders anywhere in the pipeline that have not been served yet
    pub fn open_orders(&self) -> usize {
        self.stations.values().map(|station| station.open_orders).sum()
    }

    /// A waiter may end the shift once nothing of theirs is left in the pipeline
    pub fn waiter_may_leave(&self, waiter: WaiterId) -> Result<bool, SimError> {
        let station = self.station(waiter)?;
        Ok(self.is_past_closing()
            && station.orders.is_empty()
            && station.ready.is_none()
            && station.open_orders == 0)
    }

    /// A cook may leave once no order can reach the kitchen any more
    pub fn cook_may_leave(&self) -> bool {
        self.is_past_closing() && self.cook_queue.is_empty() && self.open_orders() == 0
    }

    /// Mark that no further customers will arrive
    pub fn close_doors(&mut self) {
        self.doors_closed = true;
    }

    pub fn doors_closed(&self) -> bool {
        self.doors_closed
    }

    pub(crate) fn tear_down(&mut self) {
        self.torn_down = true;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // ---- event stream ----

    /// Append an event stamped with the current clock value
    pub fn record(&mut self, actor: Role, kind: EventKind) -> Event {
        let event = Event::new(self.clock.now(), actor, kind);
        log::debug!("{}", event);
        self.events.push(event);
        event
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub(crate) fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CookId;

    fn world() -> SharedWorld {
        SharedWorld::new(&SimulationConfig::default())
    }

    fn customer(id: u32) -> CustomerId {
        CustomerId(id)
    }

    #[test]
    fn test_initial_state() {
        let world = world();
        assert_eq!(world.now(), 0);
        assert_eq!(world.free_tables(), 10);
        assert_eq!(world.cook_queue_len(), 0);
        assert_eq!(world.open_orders(), 0);
        assert!(!world.is_past_closing());
    }

    #[test]
    fn test_advance_time_is_monotone() {
        let mut world = world();
        assert_eq!(world.advance_time(30), 30);
        assert_eq!(world.advance_time(10), 30);
        assert_eq!(world.now(), 30);
    }

    #[test]
    fn test_seating_and_release() {
        let mut world = world();
        for _ in 0..10 {
            assert!(world.try_seat());
        }
        assert!(!world.try_seat());
        assert_eq!(world.free_tables(), 0);
        assert_eq!(world.release_table().unwrap(), 1);
    }

    #[test]
    fn test_release_beyond_capacity_is_violation() {
        let mut world = world();
        let err = world.release_table().unwrap_err();
        assert!(matches!(err, SimError::ProtocolViolation(_)));
        assert_eq!(world.free_tables(), 10);
    }

    #[test]
    fn test_round_robin_wraps() {
        let mut world = world();
        let order: Vec<usize> = (0..7).map(|_| world.next_waiter().index()).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 0, 1]);
    }

    #[test]
    fn test_customer_queue_is_fifo_per_waiter() {
        let mut world = world();
        let u = WaiterId::new(0);
        let v = WaiterId::new(1);
        world.enqueue_customer_order(u, customer(1), 2).unwrap();
        world.enqueue_customer_order(v, customer(2), 3).unwrap();
        world.enqueue_customer_order(u, customer(3), 1).unwrap();

        assert_eq!(world.pending_customer_orders(u).unwrap(), 2);
        assert_eq!(world.dequeue_customer_order(u).unwrap().customer, customer(1));
        assert_eq!(world.dequeue_customer_order(u).unwrap().customer, customer(3));
        assert_eq!(world.dequeue_customer_order(v).unwrap().party_size, 3);
        assert!(world.dequeue_customer_order(u).is_err());
    }

    #[test]
    fn test_unknown_waiter_is_violation() {
        let mut world = world();
        let err = world.enqueue_customer_order(WaiterId::new(9), customer(1), 1).unwrap_err();
        assert!(matches!(err, SimError::ProtocolViolation(_)));
    }

    #[test]
    fn test_cook_queue_preserves_commit_order() {
        let mut world = world();
        world.enqueue_cook_order(WaiterId::new(2), customer(5), 4).unwrap();
        world.enqueue_cook_order(WaiterId::new(0), customer(6), 1).unwrap();
        let first = world.dequeue_cook_order().unwrap();
        assert_eq!(first, CookOrder { waiter: WaiterId::new(2), customer: customer(5), party_size: 4 });
        assert_eq!(world.dequeue_cook_order().unwrap().customer, customer(6));
        assert!(world.dequeue_cook_order().is_err());
    }

    /// Relay `id` through waiter `waiter`'s queue into the kitchen
    fn relay(world: &mut SharedWorld, waiter: WaiterId, id: u32, party_size: u32) {
        world.enqueue_customer_order(waiter, customer(id), party_size).unwrap();
        let order = world.dequeue_customer_order(waiter).unwrap();
        world.enqueue_cook_order(waiter, order.customer, order.party_size).unwrap();
        world.dequeue_cook_order().unwrap();
    }

    #[test]
    fn test_ready_slot_holds_one_customer() {
        let mut world = world();
        let u = WaiterId::new(0);
        relay(&mut world, u, 1, 2);
        relay(&mut world, u, 2, 1);
        world.set_ready(u, customer(1)).unwrap();
        let err = world.set_ready(u, customer(2)).unwrap_err();
        assert!(matches!(err, SimError::ProtocolViolation(_)));

        assert_eq!(world.take_ready(u).unwrap(), Some(customer(1)));
        assert_eq!(world.take_ready(u).unwrap(), None);
        assert!(world.set_ready(u, customer(2)).is_ok());
    }

    #[test]
    fn test_food_cannot_overtake_within_a_station() {
        let mut world = world();
        let u = WaiterId::new(0);
        let v = WaiterId::new(1);
        relay(&mut world, u, 1, 10);
        relay(&mut world, v, 2, 1);
        relay(&mut world, u, 6, 1);

        // Customer 6 finished first but customer 1 was relayed earlier.
        assert!(!world.slot_open_for(u, customer(6)).unwrap());
        assert!(world.slot_open_for(u, customer(1)).unwrap());
        let err = world.set_ready(u, customer(6)).unwrap_err();
        assert!(matches!(err, SimError::ProtocolViolation(_)));

        // Other waiters are not held up.
        assert!(world.slot_open_for(v, customer(2)).unwrap());
        world.set_ready(v, customer(2)).unwrap();

        world.set_ready(u, customer(1)).unwrap();
        assert!(!world.slot_open_for(u, customer(6)).unwrap());
        assert_eq!(world.take_ready(u).unwrap(), Some(customer(1)));
        assert!(world.slot_open_for(u, customer(6)).unwrap());
        world.set_ready(u, customer(6)).unwrap();
    }

    #[test]
    fn test_food_without_kitchen_order_is_violation() {
        let mut world = world();
        let u = WaiterId::new(0);
        let err = world.set_ready(u, customer(3)).unwrap_err();
        assert!(matches!(err, SimError::ProtocolViolation(_)));
        assert!(world.slot_open_for(WaiterId::new(9), customer(3)).is_err());
    }

    #[test]
    fn test_take_ready_surfaces_violations() {
        let mut world = world();
        assert!(matches!(
            world.take_ready(WaiterId::new(9)),
            Err(SimError::ProtocolViolation(_))
        ));

        // A cook order that never came through the waiter's queue has no open count.
        let u = WaiterId::new(0);
        world.enqueue_cook_order(u, customer(4), 1).unwrap();
        world.dequeue_cook_order().unwrap();
        world.set_ready(u, customer(4)).unwrap();
        assert!(matches!(world.take_ready(u), Err(SimError::ProtocolViolation(_))));
    }

    #[test]
    fn test_open_orders_follow_the_pipeline() {
        let mut world = world();
        let u = WaiterId::new(0);
        world.enqueue_customer_order(u, customer(1), 2).unwrap();
        assert_eq!(world.open_orders(), 1);

        let order = world.dequeue_customer_order(u).unwrap();
        world.enqueue_cook_order(u, order.customer, order.party_size).unwrap();
        assert_eq!(world.open_orders(), 1);

        world.dequeue_cook_order().unwrap();
        world.set_ready(u, order.customer).unwrap();
        assert_eq!(world.open_orders(), 1);

        world.take_ready(u).unwrap();
        assert_eq!(world.open_orders(), 0);
    }

    #[test]
    fn test_closing_conditions_wait_for_in_flight_orders() {
        let mut world = world();
        let u = WaiterId::new(0);
        let v = WaiterId::new(1);
        world.enqueue_customer_order(u, customer(1), 1).unwrap();
        let order = world.dequeue_customer_order(u).unwrap();
        world.enqueue_cook_order(u, order.customer, order.party_size).unwrap();
        world.dequeue_cook_order().unwrap();

        world.advance_time(241);
        assert!(world.is_past_closing());
        // Queue and slot are empty, but the order is still on the stove.
        assert!(!world.waiter_may_leave(u).unwrap());
        assert!(!world.cook_may_leave());
        assert!(world.waiter_may_leave(v).unwrap());

        world.set_ready(u, order.customer).unwrap();
        assert!(!world.waiter_may_leave(u).unwrap());
        world.take_ready(u).unwrap();
        assert!(world.waiter_may_leave(u).unwrap());
        assert!(world.cook_may_leave());
    }

    #[test]
    fn test_doors_closed_counts_as_past_closing() {
        let mut world = world();
        assert!(!world.cook_may_leave());
        world.close_doors();
        assert!(world.doors_closed());
        assert!(world.cook_may_leave());
        assert!(!world.is_late(world.now()));
    }

    #[test]
    fn test_records_are_stamped_with_clock() {
        let mut world = world();
        world.record(Role::Cook(CookId::new(0)), EventKind::Ready);
        world.advance_time(12);
        let event = world.record(Role::Cook(CookId::new(0)), EventKind::CookLeaving);
        assert_eq!(event.time, 12);
        assert_eq!(world.events().len(), 2);
        assert_eq!(world.events()[0].time, 0);
    }
}
