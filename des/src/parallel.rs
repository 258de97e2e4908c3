//! Parallel execution of independent simulation replications
//!
//! Each replication builds its own [`Simulation`] inside a rayon worker, runs
//! it to the horizon and hands back its world. Nothing is shared between
//! replications, so processes and worlds never have to be `Sync`, and only
//! the finished world has to be `Send`.
//!
//! # Example: ten seeded replications
//!
//! ```rust
//! use des::parallel::{ParallelRunner, simple_progress_reporter};
//! use des::{Context, Process, SimResult, Simulation, Wait};
//!
//! struct Counter;
//!
//! impl Process<u32> for Counter {
//!     fn resume(&mut self, ctx: &mut Context<'_, u32>) -> SimResult<Wait> {
//!         *ctx.world_mut() += 1;
//!         Ok(Wait::Timeout(1.0))
//!     }
//! }
//!
//! let results = ParallelRunner::new(10, |_replication| {
//!     let mut sim = Simulation::new(0u32);
//!     sim.spawn(Counter);
//!     sim
//! })
//! .progress(simple_progress_reporter(5))
//! .num_threads(2)
//! .run(9.0);
//!
//! assert_eq!(results.len(), 10);
//! assert!(results.iter().all(|r| r == &Ok(10)));
//! ```
//!
//! A builder that seeds each world from the replication index, with processes
//! drawing only from that world's random source, makes every replication
//! reproducible. Output is indexed by replication whatever the thread count.
//!
//! A replication that panics, or whose run fails with a
//! [`SimError`](crate::SimError), comes back as `Err(String)`; the rest still
//! complete.

use crate::Simulation;
use rayon::prelude::*;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

/// Runs `num_replications` simulations built by `builder` on a rayon pool.
///
/// The builder maps a replication index to a fresh [`Simulation`]; each
/// worker calls it, so it must be `Send + Sync`.
pub struct ParallelRunner<W, F>
where
    F: Fn(usize) -> Simulation<W> + Send + Sync,
    W: Send,
{
    num_replications: usize,
    builder: F,
    num_threads: Option<usize>,
    on_progress: Option<Box<dyn Fn(usize, usize) + Send + Sync>>,
    world: PhantomData<fn() -> W>,
}

impl<W, F> ParallelRunner<W, F>
where
    F: Fn(usize) -> Simulation<W> + Send + Sync,
    W: Send,
{
    pub fn new(num_replications: usize, builder: F) -> Self {
        ParallelRunner {
            num_replications,
            builder,
            num_threads: None,
            on_progress: None,
            world: PhantomData,
        }
    }

    /// Dedicated pool of `n` workers instead of rayon's global one.
    pub fn num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    /// Called with `(completed, total)` each time a replication finishes.
    pub fn progress<P>(mut self, callback: P) -> Self
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Run every replication to `horizon`; element `i` is replication `i`'s
    /// final world, or why it did not get there.
    pub fn run(self, horizon: f64) -> Vec<Result<W, String>> {
        let finished = AtomicUsize::new(0);

        let pool = self.num_threads.and_then(|n| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| warn!("falling back to the global thread pool: {}", e))
                .ok()
        });

        let execute = || {
            (0..self.num_replications)
                .into_par_iter()
                .map(|replication| {
                    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                        let mut sim = (self.builder)(replication);
                        sim.run_until(horizon).map(|()| sim.into_world())
                    }));

                    let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(report) = &self.on_progress {
                        report(done, self.num_replications);
                    }

                    match result {
                        Ok(Ok(world)) => Ok(world),
                        Ok(Err(e)) => Err(e.to_string()),
                        Err(panic) => Err(panic_message(panic)),
                    }
                })
                .collect()
        };

        match pool {
            Some(pool) => pool.install(execute),
            None => execute(),
        }
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(message) => *message,
        Err(panic) => panic
            .downcast_ref::<&str>()
            .map_or_else(|| "replication panicked".to_string(), |s| s.to_string()),
    }
}

/// `ParallelRunner::new(n, builder).run(horizon)` on the global pool.
pub fn run_parallel<W, F>(num_replications: usize, builder: F, horizon: f64) -> Vec<Result<W, String>>
where
    F: Fn(usize) -> Simulation<W> + Send + Sync,
    W: Send,
{
    ParallelRunner::new(num_replications, builder).run(horizon)
}

/// Progress callback that logs every `interval` completed replications
pub fn simple_progress_reporter(interval: usize) -> impl Fn(usize, usize) + Send + Sync {
    let interval = interval.max(1);
    move |completed, total| {
        if completed % interval == 0 || completed == total {
            info!("completed {}/{} replications", completed, total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Context, Process, SimError, SimResult, Wait};

    struct Stamp {
        id: usize,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct StampWorld {
        id: usize,
        ticks: usize,
    }

    impl Process<StampWorld> for Stamp {
        fn resume(&mut self, ctx: &mut Context<'_, StampWorld>) -> SimResult<Wait> {
            let world = ctx.world_mut();
            world.id = self.id;
            world.ticks += 1;
            Ok(Wait::Timeout(1.0))
        }
    }

    fn stamp_sim(replication: usize) -> Simulation<StampWorld> {
        let mut sim = Simulation::new(StampWorld { id: 0, ticks: 0 });
        sim.spawn(Stamp { id: replication });
        sim
    }

    #[test]
    fn each_replication_gets_its_own_world() {
        let results = run_parallel(10, stamp_sim, 4.0);

        assert_eq!(results.len(), 10);
        for (i, result) in results.iter().enumerate() {
            let world = result.as_ref().unwrap();
            assert_eq!(world.id, i);
            assert_eq!(world.ticks, 5);
        }
    }

    #[test]
    fn repeated_runs_agree() {
        let run1 = run_parallel(20, stamp_sim, 10.0);
        let run2 = run_parallel(20, stamp_sim, 10.0);

        assert_eq!(run1, run2);
    }

    #[test]
    fn panicking_builder_only_fails_its_replication() {
        let results = run_parallel(
            10,
            |replication| {
                if replication == 5 {
                    panic!("builder blew up");
                }
                stamp_sim(replication)
            },
            1.0,
        );

        assert_eq!(results.len(), 10);
        assert_eq!(results[5], Err("builder blew up".to_string()));
        for (i, result) in results.iter().enumerate() {
            if i != 5 {
                assert!(result.is_ok());
            }
        }
    }

    struct Broken;

    impl Process<StampWorld> for Broken {
        fn resume(&mut self, _ctx: &mut Context<'_, StampWorld>) -> SimResult<Wait> {
            Ok(Wait::Timeout(-1.0))
        }
    }

    #[test]
    fn simulation_error_is_reported_as_message() {
        let results = run_parallel(
            3,
            |replication| {
                let mut sim = stamp_sim(replication);
                if replication == 1 {
                    sim.spawn(Broken);
                }
                sim
            },
            1.0,
        );

        assert!(results[0].is_ok());
        assert_eq!(results[1], Err(SimError::InvalidDelay(-1.0).to_string()));
        assert!(results[2].is_ok());
    }

    #[test]
    fn progress_reaches_total() {
        use std::sync::{Arc, Mutex};
        let completed = Arc::new(Mutex::new(0));
        let completed_clone = completed.clone();

        ParallelRunner::new(5, stamp_sim)
            .progress(move |count, _total| {
                let mut seen = completed_clone.lock().unwrap();
                *seen = (*seen).max(count);
            })
            .run(1.0);

        assert_eq!(*completed.lock().unwrap(), 5);
    }

    #[test]
    fn dedicated_pool_runs_everything() {
        let results = ParallelRunner::new(8, stamp_sim).num_threads(2).run(1.0);

        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn reporter_tolerates_any_interval() {
        let reporter = simple_progress_reporter(10);
        reporter(10, 100);
        reporter(100, 100);
        // zero interval must not divide by zero
        simple_progress_reporter(0)(1, 1);
    }

    #[test]
    fn no_replications_no_results() {
        let results = run_parallel(0, stamp_sim, 1.0);

        assert!(results.is_empty());
    }
}
