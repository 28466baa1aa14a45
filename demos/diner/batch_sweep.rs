use diner::{
    run_batch, BatchConfig, ConcurrencyMode, Schedule, ScheduleProfile, SimulationConfig,
    TurnAwayReason,
};
use std::time::{Duration, Instant};

/// Sweep arrival density over many seeds and compare table pressure
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let seeds_per_point = 16;
    let config = SimulationConfig::default().with_time_scale(Duration::ZERO);
    let batch = BatchConfig::new().with_concurrency(ConcurrencyMode::Rayon);

    println!("{:>10} {:>8} {:>10} {:>10} {:>12}", "mean gap", "runs", "served", "no table", "avg wait");
    for mean_gap in [1.0, 2.0, 4.0, 6.0, 10.0] {
        let profile = ScheduleProfile {
            mean_gap_minutes: mean_gap,
            ..ScheduleProfile::default()
        };
        let schedules: Vec<Schedule> = (0..seeds_per_point)
            .map(|seed| Schedule::generate(seed, &profile))
            .collect();

        let started = Instant::now();
        let reports = run_batch(schedules, &config, &batch)?
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        let runs = reports.len() as f64;
        let served: usize = reports.iter().map(|r| r.served()).sum();
        let no_table: usize = reports
            .iter()
            .map(|r| r.turned_away(TurnAwayReason::NoTable))
            .sum();
        let waits: Vec<f64> = reports.iter().filter_map(|r| r.average_waiting_time()).collect();
        let avg_wait = if waits.is_empty() {
            0.0
        } else {
            waits.iter().sum::<f64>() / waits.len() as f64
        };

        println!(
            "{:>10.1} {:>8} {:>10.1} {:>10.1} {:>12.1}",
            mean_gap,
            reports.len(),
            served as f64 / runs,
            no_table as f64 / runs,
            avg_wait
        );
        log::info!("mean gap {:.1}: {} runs in {:?}", mean_gap, reports.len(), started.elapsed());
    }
    Ok(())
}
