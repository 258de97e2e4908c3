use des::{Context, Process, ResourceId, SimError, SimResult, Wait};

use crate::model::QueueWorld;

/// Relative tolerance within which a tick is taken to fall on the horizon.
const HORIZON_SNAP: f64 = 1e-9;

/// Samples the counters' queue length and busy count every `interval`.
///
/// Tick `k` is due at `k * interval` from time zero, computed afresh each
/// time so rounding never accumulates. A tick within `HORIZON_SNAP` of the
/// horizon is moved onto it, so the horizon itself is always sampled when it
/// is a whole number of intervals.
pub struct Monitor {
    counters: ResourceId,
    interval: f64,
    horizon: f64,
    tick: u64,
}

impl Monitor {
    pub fn new(counters: ResourceId, interval: f64, horizon: f64) -> Monitor {
        Monitor {
            counters,
            interval,
            horizon,
            tick: 0,
        }
    }

    fn due(&self, tick: u64) -> f64 {
        let t = tick as f64 * self.interval;
        if (t - self.horizon).abs() <= HORIZON_SNAP * self.horizon.abs().max(1.0) {
            self.horizon
        } else {
            t
        }
    }
}

impl Process<QueueWorld> for Monitor {
    fn resume(&mut self, ctx: &mut Context<'_, QueueWorld>) -> SimResult<Wait> {
        let pool = ctx
            .resource(self.counters)
            .ok_or(SimError::UnknownResource(self.counters))?;
        let (queue_length, busy_count) = (pool.queue_length(), pool.busy_count());

        let now = ctx.now();
        ctx.world_mut()
            .collector
            .record_sample(now, queue_length, busy_count);

        self.tick += 1;
        Ok(Wait::Until(self.due(self.tick)))
    }
}
