use crate::core::errors::SimError;
use crate::core::execution::config::{BatchConfig, ConcurrencyMode, SimulationConfig};
use crate::core::execution::simulation_engine::SimulationEngine;
use crate::core::report::SimulationReport;
use crate::core::schedule::Schedule;
use log::info;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

/// Run many independent simulations of the same restaurant.
///
/// Every schedule gets its own `Restaurant`; runs share nothing but the
/// configuration. Results come back in the order of `schedules`, and one
/// failed run does not stop the others.
pub fn run_batch(
    schedules: Vec<Schedule>,
    config: &SimulationConfig,
    batch: &BatchConfig,
) -> Result<Vec<Result<SimulationReport, SimError>>, SimError> {
    config.validate()?;
    let run_one = |schedule: Schedule| {
        SimulationEngine::new(config.clone(), schedule).and_then(SimulationEngine::run)
    };

    match batch.concurrency_mode {
        ConcurrencyMode::Sequential => {
            info!("running {} simulations sequentially", schedules.len());
            Ok(schedules.into_iter().map(run_one).collect())
        }
        ConcurrencyMode::Rayon => {
            let mut builder = ThreadPoolBuilder::new();
            if let Some(size) = batch.thread_pool_size {
                builder = builder.num_threads(size);
            }
            let pool = builder
                .build()
                .map_err(|err| SimError::ThreadPool(err.to_string()))?;
            info!(
                "running {} simulations on {} rayon threads",
                schedules.len(),
                pool.current_num_threads()
            );
            Ok(pool.install(|| schedules.into_par_iter().map(run_one).collect()))
        }
    }
}
