pub mod batch;
pub mod config;
pub mod simulation_engine;

// Re-export commonly used types
pub use batch::run_batch;
pub use config::{BatchConfig, ConcurrencyMode, SimulationConfig};
pub use simulation_engine::SimulationEngine;
