use crate::core::clock::Pacer;
use crate::core::errors::SimError;
use crate::core::events::Event;
use crate::core::execution::config::SimulationConfig;
use crate::core::signals::SignalBoard;
use crate::core::types::{CustomerId, Minutes, WaiterId};
use crate::core::world::SharedWorld;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Final state read back from the world after every actor has been joined
#[derive(Debug, Clone)]
pub struct ClosingState {
    pub final_time: Minutes,
    pub free_tables: usize,
    pub events: Vec<Event>,
}

/// Everything the actors share for the lifetime of one simulation run.
///
/// The runtime owns the `Restaurant` inside an `Arc` and every actor holds a
/// clone of that `Arc` until it terminates.
#[derive(Debug)]
pub struct Restaurant {
    world: Mutex<SharedWorld>,
    /// Notified whenever a waiter drains its ready-slot
    slot_freed: Condvar,
    signals: SignalBoard,
    config: SimulationConfig,
    pacer: Pacer,
}

impl Restaurant {
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            world: Mutex::new(SharedWorld::new(&config)),
            slot_freed: Condvar::new(),
            signals: SignalBoard::new(config.waiter_count, config.customer_capacity),
            pacer: Pacer::new(config.time_scale),
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn signals(&self) -> &SignalBoard {
        &self.signals
    }

    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    /// Enter the critical section.
    ///
    /// The guard releases the lock on every exit path, including early `?`
    /// returns and panics.
    pub fn lock(&self) -> Result<MutexGuard<'_, SharedWorld>, SimError> {
        let world = self.world.lock().map_err(|_| SimError::LockPoisoned)?;
        if world.is_torn_down() {
            return Err(SimError::TornDown("shared world".to_string()));
        }
        Ok(world)
    }

    /// Wake cooks blocked on a waiter's occupied ready-slot
    pub fn notify_slot_freed(&self) {
        self.slot_freed.notify_all();
    }

    /// Release the lock until `customer`'s food may go into `waiter`'s
    /// ready-slot, then reacquire it.
    ///
    /// The slot must be empty and every order the waiter relayed before this
    /// one must already have been handed over.
    pub fn wait_for_free_slot<'a>(
        &'a self,
        world: MutexGuard<'a, SharedWorld>,
        waiter: WaiterId,
        customer: CustomerId,
    ) -> Result<MutexGuard<'a, SharedWorld>, SimError> {
        let world = self
            .slot_freed
            .wait_while(world, |w| {
                !w.is_torn_down() && !w.slot_open_for(waiter, customer).unwrap_or(true)
            })
            .map_err(|_| SimError::LockPoisoned)?;
        if world.is_torn_down() {
            return Err(SimError::TornDown(format!("ready-slot of waiter {}", waiter)));
        }
        // Surface an unknown waiter instead of waiting on it forever.
        world.slot_open_for(waiter, customer)?;
        Ok(world)
    }

    /// No more customers will arrive: let the staff wind down
    pub fn close_doors(&self) -> Result<(), SimError> {
        self.lock()?.close_doors();
        for _ in 0..self.config.cook_count {
            self.signals.wake_cook()?;
        }
        Ok(())
    }

    /// Fail every actor still using the restaurant.
    ///
    /// Blocked waits on signals or on a ready-slot return `TornDown`, as does
    /// every later attempt to take the lock. Calling this more than once is
    /// harmless.
    pub fn shut_down(&self) {
        let mut world = self.world.lock().unwrap_or_else(PoisonError::into_inner);
        world.tear_down();
        drop(world);
        self.slot_freed.notify_all();
        self.signals.close();
    }

    pub fn is_shut_down(&self) -> bool {
        self.world
            .lock()
            .map(|world| world.is_torn_down())
            .unwrap_or(true)
    }

    /// Drain the event stream once the run is over
    pub(crate) fn closing_state(&self) -> ClosingState {
        let mut world = self.world.lock().unwrap_or_else(PoisonError::into_inner);
        ClosingState {
            final_time: world.now(),
            free_tables: world.free_tables(),
            events: world.take_events(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn restaurant() -> Arc<Restaurant> {
        Arc::new(Restaurant::new(SimulationConfig::default().with_time_scale(Duration::ZERO)).unwrap())
    }

    /// Take `ids` through `waiter`'s queue and hand them to the kitchen
    fn relay(restaurant: &Restaurant, waiter: WaiterId, ids: &[u32]) {
        let mut world = restaurant.lock().unwrap();
        for &id in ids {
            world.enqueue_customer_order(waiter, CustomerId(id), 1).unwrap();
            let order = world.dequeue_customer_order(waiter).unwrap();
            world.enqueue_cook_order(waiter, order.customer, order.party_size).unwrap();
            world.dequeue_cook_order().unwrap();
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = Restaurant::new(SimulationConfig::default().with_waiters(0)).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn test_lock_fails_after_shutdown() {
        let restaurant = restaurant();
        assert!(restaurant.lock().is_ok());
        restaurant.shut_down();
        restaurant.shut_down();
        assert!(restaurant.is_shut_down());
        assert!(matches!(restaurant.lock(), Err(SimError::TornDown(_))));
    }

    #[test]
    fn test_slot_wait_resumes_when_drained() {
        let restaurant = restaurant();
        let u = WaiterId::new(0);
        relay(&restaurant, u, &[1, 2]);
        restaurant.lock().unwrap().set_ready(u, CustomerId(1)).unwrap();

        let cook = {
            let restaurant = Arc::clone(&restaurant);
            thread::spawn(move || -> Result<(), SimError> {
                let world = restaurant.lock()?;
                let mut world = restaurant.wait_for_free_slot(world, u, CustomerId(2))?;
                world.set_ready(u, CustomerId(2))
            })
        };

        thread::sleep(Duration::from_millis(20));
        {
            let mut world = restaurant.lock().unwrap();
            assert_eq!(world.take_ready(u).unwrap(), Some(CustomerId(1)));
            restaurant.notify_slot_freed();
        }
        cook.join().unwrap().unwrap();
        assert_eq!(restaurant.lock().unwrap().ready_slot(u), Some(CustomerId(2)));
    }

    #[test]
    fn test_later_order_waits_for_older_one_in_kitchen() {
        let restaurant = restaurant();
        let u = WaiterId::new(0);
        relay(&restaurant, u, &[1, 6]);

        // The slot is empty but customer 1's longer order is still cooking.
        let fast_cook = {
            let restaurant = Arc::clone(&restaurant);
            thread::spawn(move || -> Result<(), SimError> {
                let world = restaurant.lock()?;
                let mut world = restaurant.wait_for_free_slot(world, u, CustomerId(6))?;
                world.set_ready(u, CustomerId(6))
            })
        };

        thread::sleep(Duration::from_millis(20));
        {
            let world = restaurant.lock().unwrap();
            assert_eq!(world.ready_slot(u), None);
            let mut world = restaurant.wait_for_free_slot(world, u, CustomerId(1)).unwrap();
            world.set_ready(u, CustomerId(1)).unwrap();
            restaurant.notify_slot_freed();
        }

        thread::sleep(Duration::from_millis(20));
        {
            let mut world = restaurant.lock().unwrap();
            assert_eq!(world.ready_slot(u), Some(CustomerId(1)));
            assert_eq!(world.take_ready(u).unwrap(), Some(CustomerId(1)));
            restaurant.notify_slot_freed();
        }
        fast_cook.join().unwrap().unwrap();
        assert_eq!(restaurant.lock().unwrap().ready_slot(u), Some(CustomerId(6)));
    }

    #[test]
    fn test_slot_wait_fails_on_shutdown() {
        let restaurant = restaurant();
        let u = WaiterId::new(0);
        relay(&restaurant, u, &[1]);
        restaurant.lock().unwrap().set_ready(u, CustomerId(1)).unwrap();

        let cook = {
            let restaurant = Arc::clone(&restaurant);
            thread::spawn(move || -> Result<(), SimError> {
                let world = restaurant.lock()?;
                let outcome = restaurant
                    .wait_for_free_slot(world, u, CustomerId(1))
                    .map(|_| ());
                outcome
            })
        };
        thread::sleep(Duration::from_millis(20));
        restaurant.shut_down();
        assert!(matches!(cook.join().unwrap(), Err(SimError::TornDown(_))));
    }

    #[test]
    fn test_close_doors_wakes_every_cook() {
        let restaurant = restaurant();
        restaurant.close_doors().unwrap();
        assert!(restaurant.lock().unwrap().doors_closed());
        restaurant.signals().wait_cook().unwrap();
        restaurant.signals().wait_cook().unwrap();
    }
}
