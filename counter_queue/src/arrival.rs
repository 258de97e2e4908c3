use des::{Context, Process, ResourceId, SimResult, Wait};
use tracing::debug;

use crate::customer::Customer;
use crate::model::QueueWorld;

/// Poisson arrival stream: exponential gaps, one new customer per gap.
///
/// Customer ids are sequential and start at 1.
pub struct Arrival {
    counters: ResourceId,
    arrived: usize,
    started: bool,
}

impl Arrival {
    pub fn new(counters: ResourceId) -> Arrival {
        Arrival {
            counters,
            arrived: 0,
            started: false,
        }
    }
}

impl Process<QueueWorld> for Arrival {
    fn resume(&mut self, ctx: &mut Context<'_, QueueWorld>) -> SimResult<Wait> {
        if self.started {
            self.arrived += 1;
            debug!(t = ctx.now(), customer = self.arrived, "arrival");
            ctx.spawn(Customer::new(self.arrived, self.counters));
        }
        self.started = true;

        let gap = ctx.world_mut().draw_interarrival();
        Ok(Wait::Timeout(gap))
    }
}
