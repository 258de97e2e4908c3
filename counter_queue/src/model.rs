//! Shared state of a queueing run and the wiring of its processes.

use des::{SimResult, Simulation};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Exp};
use tracing::debug;

use crate::arrival::Arrival;
use crate::collector::{SimulationResult, StatisticsCollector};
use crate::config::Scenario;
use crate::monitor::Monitor;

/// World shared by every process of one run: the run's random source, the
/// time distributions and the statistics collector.
pub struct QueueWorld {
    rng: StdRng,
    interarrival: Exp<f64>,
    service: Exp<f64>,
    num_servers: usize,
    pub collector: StatisticsCollector,
}

impl QueueWorld {
    pub fn new(scenario: &Scenario) -> QueueWorld {
        QueueWorld {
            rng: StdRng::seed_from_u64(scenario.seed()),
            interarrival: scenario.interarrival(),
            service: scenario.service(),
            num_servers: scenario.servers().get(),
            collector: StatisticsCollector::new(),
        }
    }

    pub fn draw_interarrival(&mut self) -> f64 {
        self.interarrival.sample(&mut self.rng)
    }

    pub fn draw_service(&mut self) -> f64 {
        self.service.sample(&mut self.rng)
    }

    pub fn finish(self) -> SimulationResult {
        self.collector.finish(self.num_servers)
    }
}

/// Build a simulation with one pool of counters, the arrival stream and the
/// monitor, all starting at time zero.
pub fn build_simulation(scenario: &Scenario) -> Simulation<QueueWorld> {
    let mut sim = Simulation::new(QueueWorld::new(scenario));
    let counters = sim.add_resource(scenario.servers());
    sim.spawn(Arrival::new(counters));
    sim.spawn(Monitor::new(
        counters,
        scenario.sample_interval(),
        scenario.horizon(),
    ));
    sim
}

/// Run one scenario to its horizon.
pub fn run_scenario(scenario: &Scenario) -> SimResult<SimulationResult> {
    let mut sim = build_simulation(scenario);
    sim.run_until(scenario.horizon())?;

    let result = sim.into_world().finish();
    debug!(
        seed = scenario.seed(),
        completed = result.completed(),
        samples = result.sample_times.len(),
        "run finished"
    );
    Ok(result)
}
