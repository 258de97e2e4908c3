use des::{Context, Process, ResourceId, SimResult, Wait};
use tracing::debug;

use crate::collector::CustomerRecord;
use crate::model::QueueWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Arrived,
    Waiting,
    InService,
    Departed,
}

/// One customer's trip through the counters:
/// `Arrived -> Waiting -> InService -> Departed`.
///
/// Measurements are committed to the collector on departure only, so a
/// customer cut off by the horizon leaves no trace in the result.
pub struct Customer {
    id: usize,
    counters: ResourceId,
    stage: Stage,
    arrival_time: f64,
    service_start_time: f64,
}

impl Customer {
    pub fn new(id: usize, counters: ResourceId) -> Customer {
        Customer {
            id,
            counters,
            stage: Stage::Arrived,
            arrival_time: 0.0,
            service_start_time: 0.0,
        }
    }
}

impl Process<QueueWorld> for Customer {
    fn resume(&mut self, ctx: &mut Context<'_, QueueWorld>) -> SimResult<Wait> {
        match self.stage {
            Stage::Arrived => {
                self.arrival_time = ctx.now();
                self.stage = Stage::Waiting;
                Ok(Wait::Acquire(self.counters))
            }
            Stage::Waiting => {
                // resumed only once a counter has been granted
                self.service_start_time = ctx.now();
                self.stage = Stage::InService;
                let service = ctx.world_mut().draw_service();
                debug!(
                    t = self.service_start_time,
                    customer = self.id,
                    wait = self.service_start_time - self.arrival_time,
                    "service started"
                );
                Ok(Wait::Timeout(service))
            }
            Stage::InService => {
                ctx.release(self.counters)?;
                self.stage = Stage::Departed;
                let record = CustomerRecord {
                    id: self.id,
                    arrival_time: self.arrival_time,
                    service_start_time: self.service_start_time,
                    departure_time: ctx.now(),
                };
                debug!(
                    t = record.departure_time,
                    customer = self.id,
                    system_time = record.system_time(),
                    "departed"
                );
                ctx.world_mut().collector.record_departure(record);
                Ok(Wait::Exit)
            }
            Stage::Departed => Ok(Wait::Exit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScenarioConfig;
    use des::Simulation;

    fn world(seed: u64) -> QueueWorld {
        let scenario = ScenarioConfig {
            random_seed: seed,
            ..ScenarioConfig::default()
        }
        .validate()
        .unwrap();
        QueueWorld::new(&scenario)
    }

    #[test]
    fn simultaneous_customers_are_served_one_after_another() {
        let mut sim = Simulation::new(world(3));
        let counter = sim.add_resource(std::num::NonZeroUsize::new(1).unwrap());
        for id in 1..=3 {
            sim.spawn(Customer::new(id, counter));
        }

        sim.run_until(10_000.0).unwrap();

        let result = sim.into_world().finish();
        let ids: Vec<usize> = result.customers.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let customers = &result.customers;
        assert_eq!(customers[0].wait_time(), 0.0);
        assert_eq!(customers[1].service_start_time, customers[0].departure_time);
        assert_eq!(customers[2].service_start_time, customers[1].departure_time);
        for customer in customers {
            assert_eq!(customer.arrival_time, 0.0);
            assert!(customer.departure_time >= customer.service_start_time);
        }
    }

    #[test]
    fn customer_in_service_at_horizon_is_not_recorded() {
        let mut sim = Simulation::new(world(11));
        let counter = sim.add_resource(std::num::NonZeroUsize::new(1).unwrap());
        sim.spawn(Customer::new(1, counter));

        // service has started but cannot have finished
        sim.run_until(0.0).unwrap();

        assert_eq!(sim.resource(counter).unwrap().busy_count(), 1);
        assert_eq!(sim.live_processes(), 1);
        let result = sim.into_world().finish();
        assert!(result.wait_times.is_empty());
        assert!(result.system_times.is_empty());
    }
}
