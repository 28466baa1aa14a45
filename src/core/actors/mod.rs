pub mod cook;
pub mod customer;
pub mod waiter;

pub use cook::{CookActor, CookReport};
pub use customer::{CustomerActor, CustomerOutcome, CustomerReport};
pub use waiter::{WaiterActor, WaiterReport};

use crate::core::clock::format_wall_clock;
use crate::core::errors::SimError;
use crate::core::restaurant::Restaurant;
use crate::core::types::{Minutes, Role};

/// A concurrently running participant of the simulation.
///
/// Each actor runs its state machine on its own thread against the shared
/// [`Restaurant`]. Actors remember the last clock value they observed so a
/// fatal error can be reported with the actor's own notion of "now".
pub trait Actor: Send {
    /// Summary returned when the actor terminates normally
    type Output: Send;

    fn role(&self) -> Role;

    fn restaurant(&self) -> &Restaurant;

    /// Last clock value this actor read under the lock
    fn last_seen(&self) -> Minutes;

    /// Announce readiness before the first customer arrives
    fn announce_ready(&mut self) -> Result<(), SimError> {
        Ok(())
    }

    /// Run the state machine until the actor reaches a terminal state
    fn run(&mut self) -> Result<Self::Output, SimError>;
}

/// Log a fatal actor error and shut the restaurant down so peers blocked on
/// signals fail instead of waiting forever
pub fn fail<A: Actor + ?Sized>(actor: &A, err: SimError) -> SimError {
    log::error!(
        "{} {}: terminating: {}",
        format_wall_clock(actor.last_seen()),
        actor.role(),
        err
    );
    actor.restaurant().shut_down();
    err
}

/// Drive an actor to completion, shutting the restaurant down on failure
pub fn run_to_completion<A: Actor>(actor: &mut A) -> Result<A::Output, SimError> {
    match actor.run() {
        Ok(output) => Ok(output),
        Err(err) => Err(fail(actor, err)),
    }
}
