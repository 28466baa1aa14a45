use diner::{Schedule, ScheduleProfile, SimulationConfig, SimulationEngine, TurnAwayReason};
use std::time::Duration;

/// Command line options for a single restaurant run
#[derive(Debug, Clone)]
struct Options {
    schedule_path: Option<String>,
    seed: u64,
    time_scale_ms: u64,
    json: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            schedule_path: None,
            seed: 42,
            time_scale_ms: 100,
            json: false,
        }
    }
}

fn usage() -> String {
    "usage: diner [SCHEDULE_FILE] [--seed N] [--scale-ms N] [--json]".to_string()
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => options.json = true,
            "--seed" => {
                let value = args.next().ok_or_else(usage)?;
                options.seed = value.parse().map_err(|_| format!("bad seed '{}'", value))?;
            }
            "--scale-ms" => {
                let value = args.next().ok_or_else(usage)?;
                options.time_scale_ms = value
                    .parse()
                    .map_err(|_| format!("bad time scale '{}'", value))?;
            }
            "-h" | "--help" => return Err(usage()),
            path if options.schedule_path.is_none() && !path.starts_with("--") => {
                options.schedule_path = Some(path.to_string());
            }
            other => return Err(format!("unexpected argument '{}'\n{}", other, usage())),
        }
    }
    Ok(options)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .format_timestamp(None)
        .init();

    let options = parse_args()?;
    let schedule = match &options.schedule_path {
        Some(path) => Schedule::from_file(path)?,
        None => Schedule::generate(options.seed, &ScheduleProfile::default()),
    };
    let config = SimulationConfig::default()
        .with_time_scale(Duration::from_millis(options.time_scale_ms));

    let report = SimulationEngine::new(config, schedule)?.run()?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print!("{}", report.render());
    println!();
    println!("Served:            {}", report.served());
    println!("No table:          {}", report.turned_away(TurnAwayReason::NoTable));
    println!("Late arrivals:     {}", report.turned_away(TurnAwayReason::LateArrival));
    if let Some(average) = report.average_waiting_time() {
        println!("Average wait:      {:.1} minutes", average);
    }
    if let Some(longest) = report.longest_waiting_time() {
        println!("Longest wait:      {} minutes", longest);
    }
    Ok(())
}
