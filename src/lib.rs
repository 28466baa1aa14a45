pub mod core;

// Re-export commonly used types
pub use crate::core::errors::SimError;
pub use crate::core::events::{Event, EventKind, TurnAwayReason};
pub use crate::core::execution::{
    run_batch, BatchConfig, ConcurrencyMode, SimulationConfig, SimulationEngine,
};
pub use crate::core::report::SimulationReport;
pub use crate::core::schedule::{Schedule, ScheduleEntry, ScheduleError, ScheduleProfile};
pub use crate::core::types::{CookId, CustomerId, Minutes, Role, WaiterId};
