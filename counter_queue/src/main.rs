//! Command-line front end: run a scenario and print its indicators.
//!
//! Usage:
//!   cargo run --release -p counter_queue -- --config counter_queue/scenarios/default.toml
//!   cargo run --release -p counter_queue -- --servers 3 --replications 100 --json

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use counter_queue::{
    ConfigError, MeanStd, ReplicationReport, ScenarioConfig, Summary, run_replications,
    run_simulation,
};
use tracing::{Level, error, warn};

#[derive(Debug, Parser)]
#[command(name = "counter_queue", about = "Simulate customers queueing for service counters")]
struct Args {
    /// TOML scenario file; the flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of service counters
    #[arg(long)]
    servers: Option<usize>,

    /// Simulated minutes to run
    #[arg(long)]
    horizon: Option<f64>,

    /// Mean minutes between arrivals
    #[arg(long)]
    mean_interarrival: Option<f64>,

    /// Mean minutes of service
    #[arg(long)]
    mean_service: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,

    /// Minutes between queue samples
    #[arg(long)]
    sample_interval: Option<f64>,

    /// Independent runs with seeds seed, seed+1, ...
    #[arg(short, long, default_value_t = 1)]
    replications: usize,

    /// Worker threads for replications
    #[arg(long)]
    threads: Option<usize>,

    /// Print the indicators as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn scenario(&self) -> Result<ScenarioConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ScenarioConfig::load(path)?,
            None => ScenarioConfig::default(),
        };
        if let Some(servers) = self.servers {
            config.num_servers = servers;
        }
        if let Some(horizon) = self.horizon {
            config.horizon = horizon;
        }
        if let Some(mean) = self.mean_interarrival {
            config.mean_interarrival = mean;
        }
        if let Some(mean) = self.mean_service {
            config.mean_service = mean;
        }
        if let Some(seed) = self.seed {
            config.random_seed = seed;
        }
        if let Some(interval) = self.sample_interval {
            config.sample_interval = interval;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = args.scenario()?;

    if args.replications <= 1 {
        let summary = run_simulation(&config)?.summary();
        if args.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&config, &summary);
        }
        return Ok(());
    }

    let results = run_replications(&config, args.replications, args.threads)?;
    let mut summaries = Vec::with_capacity(results.len());
    for (replication, result) in results.iter().enumerate() {
        match result {
            Ok(result) => summaries.push(result.summary()),
            Err(e) => warn!("replication {} failed: {}", replication, e),
        }
    }

    let report = ReplicationReport::from_summaries(args.replications, &summaries);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&config, &report);
    }
    Ok(())
}

fn print_header(config: &ScenarioConfig) {
    println!("=== Counter Queue ===");
    println!(
        "{} counters, {} minutes, mean arrival gap {} min, mean service {} min, seed {}",
        config.num_servers,
        config.horizon,
        config.mean_interarrival,
        config.mean_service,
        config.random_seed
    );
    println!();
}

fn print_summary(config: &ScenarioConfig, summary: &Summary) {
    print_header(config);
    println!("Customers served:      {}", summary.completed_customers);
    println!("Average utilization:   {:.2} %", summary.avg_utilization);
    println!("Longest queue:         {} customers", summary.max_queue_length);
    println!("Average wait:          {:.2} min", summary.mean_wait);
    println!("Longest wait:          {:.2} min", summary.max_wait);
    println!("Average time in system {:.2} min", summary.mean_system_time);
}

fn print_report(config: &ScenarioConfig, report: &ReplicationReport) {
    print_header(config);
    println!(
        "Replications: {} ({} successful)",
        report.replications, report.successful
    );
    println!();
    println!("{:<24} {:>10} {:>10} {:>10} {:>10}", "indicator", "mean", "std", "min", "max");
    let rows: [(&str, &MeanStd); 6] = [
        ("customers served", &report.completed_customers),
        ("utilization %", &report.avg_utilization),
        ("longest queue", &report.max_queue_length),
        ("average wait", &report.mean_wait),
        ("longest wait", &report.max_wait),
        ("average time in system", &report.mean_system_time),
    ];
    for (name, stats) in rows {
        println!(
            "{:<24} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            name, stats.mean, stats.std, stats.min, stats.max
        );
    }
}
