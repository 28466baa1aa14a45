use crate::core::actors::{
    fail, run_to_completion, Actor, CookActor, CookReport, CustomerActor, CustomerReport, WaiterActor,
    WaiterReport,
};
use crate::core::errors::SimError;
use crate::core::execution::config::SimulationConfig;
use crate::core::report::SimulationReport;
use crate::core::restaurant::Restaurant;
use crate::core::schedule::Schedule;
use crate::core::types::{CookId, Minutes, WaiterId};
use log::{debug, info};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use uuid::Uuid;

/// Handle of a spawned actor thread
struct ActorThread<T> {
    name: String,
    handle: JoinHandle<Result<T, SimError>>,
}

impl<T> ActorThread<T> {
    fn join(self) -> Result<T, SimError> {
        self.handle
            .join()
            .map_err(|_| SimError::ActorPanicked(self.name))?
    }
}

/// Shuts the restaurant down if the owning actor thread unwinds
struct ShutdownOnPanic(Arc<Restaurant>);

impl Drop for ShutdownOnPanic {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.shut_down();
        }
    }
}

/// Runs one schedule through the restaurant
///
/// The engine is the bootstrap around the actors: it allocates the shared
/// state, spawns the staff, paces customer arrivals against the time scale,
/// closes the doors once every customer is gone, and joins every actor.
pub struct SimulationEngine {
    config: SimulationConfig,
    schedule: Schedule,
    run_id: Uuid,
}

impl SimulationEngine {
    pub fn new(config: SimulationConfig, schedule: Schedule) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            config,
            schedule,
            run_id: Uuid::new_v4(),
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Run the simulation to completion.
    ///
    /// Every actor is joined before this returns, also on failure. If any
    /// actor failed, the root cause is returned rather than the teardown
    /// errors it caused in its peers.
    pub fn run(self) -> Result<SimulationReport, SimError> {
        let restaurant = Arc::new(Restaurant::new(self.config.clone())?);
        info!(
            "[run {}] opening: {} tables, {} waiters, {} cooks, {} scheduled customers",
            self.run_id,
            self.config.table_capacity,
            self.config.waiter_count,
            self.config.cook_count,
            self.schedule.len()
        );

        let mut errors = Vec::new();
        let (cooks, waiters) = self.open(&restaurant, &mut errors);

        let customers = if errors.is_empty() {
            self.seat_customers(&restaurant, &mut errors)
        } else {
            Vec::new()
        };

        let customers = collect(customers, &mut errors);
        if errors.is_empty() {
            debug!("[run {}] all customers gone, closing the doors", self.run_id);
            if let Err(err) = restaurant.close_doors() {
                errors.push(err);
                restaurant.shut_down();
            }
        }
        let cooks = collect(cooks, &mut errors);
        let waiters = collect(waiters, &mut errors);

        if let Some(err) = root_cause(errors) {
            return Err(err);
        }

        let closing = restaurant.closing_state();
        info!(
            "[run {}] closed at minute {} with {} free tables",
            self.run_id, closing.final_time, closing.free_tables
        );
        Ok(SimulationReport {
            run_id: self.run_id,
            config: self.config,
            events: closing.events,
            customers,
            waiters,
            cooks,
            final_time: closing.final_time,
            free_tables: closing.free_tables,
        })
    }

    /// Spawn cooks then waiters and wait until each has announced readiness
    fn open(
        &self,
        restaurant: &Arc<Restaurant>,
        errors: &mut Vec<SimError>,
    ) -> (Vec<ActorThread<CookReport>>, Vec<ActorThread<WaiterReport>>) {
        let (ready_tx, ready_rx) = mpsc::channel();
        let mut cooks = Vec::new();
        let mut waiters = Vec::new();

        for index in 0..self.config.cook_count {
            let id = CookId::new(index);
            let actor = CookActor::new(Arc::clone(restaurant), id);
            match spawn_actor(format!("cook-{}", id), restaurant, actor, Some(ready_tx.clone())) {
                Ok(thread) => cooks.push(thread),
                Err(err) => errors.push(err),
            }
        }
        for index in 0..self.config.waiter_count {
            let id = WaiterId::new(index);
            let actor = WaiterActor::new(Arc::clone(restaurant), id);
            match spawn_actor(format!("waiter-{}", id), restaurant, actor, Some(ready_tx.clone())) {
                Ok(thread) => waiters.push(thread),
                Err(err) => errors.push(err),
            }
        }
        drop(ready_tx);

        if errors.is_empty() {
            // recv fails once every sender is gone, so a dead actor cannot hang us.
            for _ in 0..(cooks.len() + waiters.len()) {
                if ready_rx.recv().is_err() {
                    break;
                }
            }
        } else {
            restaurant.shut_down();
        }
        (cooks, waiters)
    }

    /// Spawn one customer actor per schedule entry at its arrival time
    fn seat_customers(
        &self,
        restaurant: &Arc<Restaurant>,
        errors: &mut Vec<SimError>,
    ) -> Vec<ActorThread<CustomerReport>> {
        let mut customers = Vec::with_capacity(self.schedule.len());
        let mut previous: Minutes = 0;
        for entry in self.schedule.entries() {
            restaurant.pacer().pause(entry.arrival.saturating_sub(previous));
            previous = previous.max(entry.arrival);

            if restaurant.is_shut_down() {
                break;
            }
            let actor = CustomerActor::new(Arc::clone(restaurant), *entry);
            match spawn_actor(format!("customer-{}", entry.customer), restaurant, actor, None) {
                Ok(thread) => customers.push(thread),
                Err(err) => {
                    errors.push(err);
                    restaurant.shut_down();
                    break;
                }
            }
        }
        customers
    }
}

fn spawn_actor<A>(
    name: String,
    restaurant: &Arc<Restaurant>,
    mut actor: A,
    ready: Option<Sender<()>>,
) -> Result<ActorThread<A::Output>, SimError>
where
    A: Actor + 'static,
    A::Output: 'static,
{
    let guard = ShutdownOnPanic(Arc::clone(restaurant));
    let handle = thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            let _guard = guard;
            if let Some(ready) = ready {
                let announced = actor.announce_ready();
                // The runtime may already have stopped listening.
                let _ = ready.send(());
                announced.map_err(|err| fail(&actor, err))?;
            }
            run_to_completion(&mut actor)
        })
        .map_err(|err| SimError::Spawn(format!("{}: {}", name, err)))?;
    Ok(ActorThread { name, handle })
}

fn collect<T>(threads: Vec<ActorThread<T>>, errors: &mut Vec<SimError>) -> Vec<T> {
    threads
        .into_iter()
        .filter_map(|thread| match thread.join() {
            Ok(output) => Some(output),
            Err(err) => {
                errors.push(err);
                None
            }
        })
        .collect()
}

/// Prefer the error that started a shutdown over the teardown errors it caused
fn root_cause(errors: Vec<SimError>) -> Option<SimError> {
    let mut fallback = None;
    for err in errors {
        if matches!(err, SimError::TornDown(_)) {
            fallback.get_or_insert(err);
        } else {
            return Some(err);
        }
    }
    fallback
}
