use crate::core::schedule::ScheduleError;
use crate::core::signals::SignalError;

/// Errors that can occur while running a simulation.
///
/// Capacity exhaustion (no free table, full signal board) is not an error:
/// the affected customer turns away. Everything here is fatal to the actor
/// that hits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A hand-off invariant was broken (occupied ready-slot, empty pop, ...)
    ProtocolViolation(String),
    /// The restaurant was shut down while an actor was still using it
    TornDown(String),
    /// A peer panicked while holding the world lock
    LockPoisoned,
    /// An actor thread panicked
    ActorPanicked(String),
    /// An actor thread could not be spawned
    Spawn(String),
    /// Configuration rejected by validation
    InvalidConfig(String),
    /// The batch thread pool could not be built
    ThreadPool(String),
    /// The arrival schedule could not be read
    Schedule(ScheduleError),
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::ProtocolViolation(msg) => write!(f, "Protocol violation: {}", msg),
            SimError::TornDown(msg) => write!(f, "Restaurant torn down during use: {}", msg),
            SimError::LockPoisoned => write!(f, "World lock poisoned by a panicked actor"),
            SimError::ActorPanicked(name) => write!(f, "Actor thread '{}' panicked", name),
            SimError::Spawn(msg) => write!(f, "Failed to spawn actor: {}", msg),
            SimError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            SimError::ThreadPool(msg) => write!(f, "Failed to build thread pool: {}", msg),
            SimError::Schedule(err) => write!(f, "Schedule error: {}", err),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Schedule(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ScheduleError> for SimError {
    fn from(err: ScheduleError) -> Self {
        SimError::Schedule(err)
    }
}

impl From<SignalError> for SimError {
    fn from(err: SignalError) -> Self {
        match err {
            SignalError::Closed => SimError::TornDown("signal board closed".to_string()),
            other => SimError::ProtocolViolation(other.to_string()),
        }
    }
}
