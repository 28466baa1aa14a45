//! Wake signals between actors.
//!
//! Every signal is a counting semaphore: a wake raised before the target is
//! waiting is remembered, and two wakes are consumed by two waits. A wake only
//! tells the target to reacquire the world lock and look again; no data
//! travels through a signal.
//!
//! Closing the board is the explicit shutdown path. Every blocked and every
//! later wait or wake fails with [`SignalError::Closed`].

use crate::core::types::{CustomerId, WaiterId};
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The board was closed while the caller still used it
    Closed,
    /// No room left for another customer signal
    Capacity(usize),
    /// No signal registered for this customer
    UnknownCustomer(CustomerId),
    /// A signal for this customer already exists
    DuplicateCustomer(CustomerId),
    /// No signal exists for this waiter
    UnknownWaiter(WaiterId),
}

impl std::fmt::Display for SignalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalError::Closed => write!(f, "signal board is closed"),
            SignalError::Capacity(capacity) => {
                write!(f, "signal board is full ({} customer signals)", capacity)
            }
            SignalError::UnknownCustomer(id) => write!(f, "no signal for customer {}", id),
            SignalError::DuplicateCustomer(id) => {
                write!(f, "signal for customer {} registered twice", id)
            }
            SignalError::UnknownWaiter(id) => write!(f, "no signal for waiter {}", id),
        }
    }
}

impl std::error::Error for SignalError {}

#[derive(Debug, Default)]
struct SemaphoreState {
    permits: usize,
    closed: bool,
}

/// Counting semaphore with an explicit closed state
#[derive(Debug, Default)]
pub struct Semaphore {
    state: Mutex<SemaphoreState>,
    available: Condvar,
}

impl Semaphore {
    pub fn new() -> Self {
        Self::default()
    }

    // The state is two plain fields updated without calling out, so a poisoned
    // guard still holds consistent data.
    fn state(&self) -> MutexGuard<'_, SemaphoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add one permit and wake one waiter
    pub fn post(&self) -> Result<(), SignalError> {
        let mut state = self.state();
        if state.closed {
            return Err(SignalError::Closed);
        }
        state.permits += 1;
        self.available.notify_one();
        Ok(())
    }

    /// Block until a permit is available, then consume it
    pub fn wait(&self) -> Result<(), SignalError> {
        let state = self.state();
        let mut state = self
            .available
            .wait_while(state, |s| s.permits == 0 && !s.closed)
            .unwrap_or_else(PoisonError::into_inner);
        if state.closed {
            return Err(SignalError::Closed);
        }
        state.permits -= 1;
        Ok(())
    }

    pub fn close(&self) {
        self.state().closed = true;
        self.available.notify_all();
    }
}

#[derive(Debug, Default)]
struct CustomerSignals {
    by_id: HashMap<CustomerId, Arc<Semaphore>>,
    closed: bool,
}

/// The set of wake signals shared by all actors
#[derive(Debug)]
pub struct SignalBoard {
    cook: Semaphore,
    waiters: Vec<Semaphore>,
    customers: Mutex<CustomerSignals>,
    customer_capacity: usize,
}

impl SignalBoard {
    pub fn new(waiter_count: usize, customer_capacity: usize) -> Self {
        Self {
            cook: Semaphore::new(),
            waiters: (0..waiter_count).map(|_| Semaphore::new()).collect(),
            customers: Mutex::new(CustomerSignals::default()),
            customer_capacity,
        }
    }

    fn customers(&self) -> MutexGuard<'_, CustomerSignals> {
        self.customers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn waiter(&self, waiter: WaiterId) -> Result<&Semaphore, SignalError> {
        self.waiters
            .get(waiter.index())
            .ok_or(SignalError::UnknownWaiter(waiter))
    }

    fn customer(&self, customer: CustomerId) -> Result<Arc<Semaphore>, SignalError> {
        let signals = self.customers();
        if signals.closed {
            return Err(SignalError::Closed);
        }
        signals
            .by_id
            .get(&customer)
            .cloned()
            .ok_or(SignalError::UnknownCustomer(customer))
    }

    // ---- cooks ----

    pub fn wake_cook(&self) -> Result<(), SignalError> {
        self.cook.post()
    }

    pub fn wait_cook(&self) -> Result<(), SignalError> {
        self.cook.wait()
    }

    // ---- waiters ----

    pub fn wake_waiter(&self, waiter: WaiterId) -> Result<(), SignalError> {
        self.waiter(waiter)?.post()
    }

    pub fn wait_waiter(&self, waiter: WaiterId) -> Result<(), SignalError> {
        self.waiter(waiter)?.wait()
    }

    // ---- customers ----

    /// Create the signal a customer blocks on during its two hand-offs
    pub fn register_customer(&self, customer: CustomerId) -> Result<(), SignalError> {
        let mut signals = self.customers();
        if signals.closed {
            return Err(SignalError::Closed);
        }
        if signals.by_id.contains_key(&customer) {
            return Err(SignalError::DuplicateCustomer(customer));
        }
        if signals.by_id.len() >= self.customer_capacity {
            return Err(SignalError::Capacity(self.customer_capacity));
        }
        signals.by_id.insert(customer, Arc::new(Semaphore::new()));
        Ok(())
    }

    pub fn unregister_customer(&self, customer: CustomerId) {
        self.customers().by_id.remove(&customer);
    }

    pub fn wake_customer(&self, customer: CustomerId) -> Result<(), SignalError> {
        self.customer(customer)?.post()
    }

    pub fn wait_customer(&self, customer: CustomerId) -> Result<(), SignalError> {
        // The map lock is released before blocking.
        let signal = self.customer(customer)?;
        signal.wait()
    }

    /// Fail every blocked and future wait or wake
    pub fn close(&self) {
        let mut signals = self.customers();
        signals.closed = true;
        for signal in signals.by_id.values() {
            signal.close();
        }
        drop(signals);
        self.cook.close();
        for waiter in &self.waiters {
            waiter.close();
        }
    }
}
