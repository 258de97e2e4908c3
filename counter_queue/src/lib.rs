//! Multi-counter queueing simulation
//!
//! Customers arrive as a Poisson stream, queue FIFO for one of `num_servers`
//! identical counters, receive exponentially distributed service and leave.
//! A monitor samples the queue length and the number of busy counters at a
//! fixed period.
//!
//! Processes:
//! - [`Arrival`](arrival::Arrival): spawns customers at exponential gaps
//! - [`Customer`](customer::Customer): arrive, wait, get served, depart
//! - [`Monitor`](monitor::Monitor): periodic time-series samples
//!
//! All of them run on the [`des`] process scheduler and share one
//! [`QueueWorld`] holding the run's random source and statistics collector,
//! so a fixed seed reproduces a run exactly.
//!
//! ```
//! use counter_queue::{ScenarioConfig, run_simulation};
//!
//! let config = ScenarioConfig {
//!     num_servers: 3,
//!     horizon: 60.0,
//!     random_seed: 7,
//!     ..ScenarioConfig::default()
//! };
//! let result = run_simulation(&config).unwrap();
//! assert_eq!(result.sample_times.len(), 61);
//! assert_eq!(result, run_simulation(&config).unwrap());
//! ```

pub mod arrival;
pub mod collector;
pub mod config;
pub mod customer;
pub mod error;
pub mod model;
pub mod monitor;
pub mod summary;

pub use collector::{CustomerRecord, SimulationResult, StatisticsCollector};
pub use config::{Scenario, ScenarioConfig};
pub use error::{ConfigError, QueueError, QueueResult};
pub use model::{QueueWorld, build_simulation, run_scenario};
pub use summary::{MeanStd, ReplicationReport, Summary};

use des::parallel::{ParallelRunner, simple_progress_reporter};
use tracing::info;

/// Validate `config` and run it once.
pub fn run_simulation(config: &ScenarioConfig) -> QueueResult<SimulationResult> {
    let scenario = config.validate()?;
    info!(
        servers = config.num_servers,
        horizon = config.horizon,
        seed = config.random_seed,
        "running scenario"
    );
    Ok(run_scenario(&scenario)?)
}

/// Run `replications` independent copies of `config` in parallel.
///
/// Replication `i` uses seed `random_seed + i`. Results come back in
/// replication order; a failed replication is reported as `Err` without
/// affecting the others. `threads` limits the worker pool, `None` uses
/// rayon's default.
pub fn run_replications(
    config: &ScenarioConfig,
    replications: usize,
    threads: Option<usize>,
) -> QueueResult<Vec<Result<SimulationResult, String>>> {
    let scenario = config.validate()?;
    let base_seed = scenario.seed();
    info!(replications, base_seed, "running replications");

    let mut runner = ParallelRunner::new(replications, |replication| {
        build_simulation(&scenario.with_seed(base_seed.wrapping_add(replication as u64)))
    })
    .progress(simple_progress_reporter((replications / 10).max(1)));
    if let Some(n) = threads {
        runner = runner.num_threads(n);
    }

    Ok(runner
        .run(scenario.horizon())
        .into_iter()
        .map(|world| world.map(QueueWorld::finish))
        .collect())
}
