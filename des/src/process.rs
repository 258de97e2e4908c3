//! Cooperative processes driven by the event loop.
//!
//! A process is a state machine that the [`Simulation`] resumes whenever its
//! pending wait condition is satisfied. Each call to [`Process::resume`] runs
//! until the process hits its next suspension point, which it reports as a
//! [`Wait`]:
//!
//! - [`Wait::Timeout`] resumes the process after a simulated delay.
//! - [`Wait::Until`] resumes it at an absolute simulated time, for processes
//!   that keep their own schedule instead of summing delays.
//! - [`Wait::Acquire`] resumes it once a [`ResourcePool`] grants a unit. When
//!   a unit is free the grant is immediate and `resume` is called again within
//!   the same dispatch, at the same instant.
//! - [`Wait::Exit`] drops the process.
//!
//! Only one process runs at a time. Shared model state (statistics, random
//! source) lives in the world `W`, which every process reaches through its
//! [`Context`].

use std::fmt;
use std::num::NonZeroUsize;

use tracing::trace;

use crate::{EventLoop, ResourceId, ResourcePool, SimError, SimResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(pub usize);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Suspension point reported by a process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wait {
    Timeout(f64),
    Until(f64),
    Acquire(ResourceId),
    Exit,
}

pub trait Process<W> {
    fn resume(&mut self, ctx: &mut Context<'_, W>) -> SimResult<Wait>;
}

type Slot<W> = Option<Box<dyn Process<W>>>;

/// View of the simulation handed to the process being resumed.
pub struct Context<'a, W> {
    events: &'a mut EventLoop<ProcessId>,
    processes: &'a mut Vec<Slot<W>>,
    resources: &'a mut [ResourcePool],
    world: &'a mut W,
}

impl<W> Context<'_, W> {
    pub fn now(&self) -> f64 {
        self.events.now()
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut *self.world
    }

    pub fn resource(&self, id: ResourceId) -> Option<&ResourcePool> {
        self.resources.get(id.0)
    }

    /// Start a new process at the current instant.
    ///
    /// It first runs after everything already scheduled for this instant.
    pub fn spawn<P>(&mut self, process: P) -> ProcessId
    where
        P: Process<W> + 'static,
    {
        register(self.events, self.processes, Box::new(process))
    }

    /// Return a unit to `id`, waking the longest-waiting process if any.
    pub fn release(&mut self, id: ResourceId) -> SimResult<()> {
        let pool = self
            .resources
            .get_mut(id.0)
            .ok_or(SimError::UnknownResource(id))?;
        if pool.busy_count() == 0 {
            return Err(SimError::ReleaseIdle(id));
        }
        if let Some(next) = pool.release() {
            trace!(resource = %id, process = %next, "unit handed over");
            self.events.schedule_now(next);
        }
        Ok(())
    }
}

fn register<W>(
    events: &mut EventLoop<ProcessId>,
    processes: &mut Vec<Slot<W>>,
    process: Box<dyn Process<W>>,
) -> ProcessId {
    let pid = ProcessId(processes.len());
    events.schedule_now(pid);
    processes.push(Some(process));
    pid
}

/// Resume `process` until it suspends. Returns whether it is still alive.
fn drive<W>(
    process: &mut dyn Process<W>,
    pid: ProcessId,
    ctx: &mut Context<'_, W>,
) -> SimResult<bool> {
    loop {
        match process.resume(ctx)? {
            Wait::Timeout(delay) => {
                ctx.events.schedule(delay, pid)?;
                return Ok(true);
            }
            Wait::Until(t) => {
                ctx.events.schedule_at(t, pid)?;
                return Ok(true);
            }
            Wait::Acquire(id) => {
                let pool = ctx
                    .resources
                    .get_mut(id.0)
                    .ok_or(SimError::UnknownResource(id))?;
                if !pool.acquire(pid) {
                    return Ok(true);
                }
            }
            Wait::Exit => return Ok(false),
        }
    }
}

/// Process scheduler: owns the clock, the processes, the resource pools and
/// the shared world.
pub struct Simulation<W> {
    events: EventLoop<ProcessId>,
    processes: Vec<Slot<W>>,
    resources: Vec<ResourcePool>,
    world: W,
}

impl<W> Simulation<W> {
    pub fn new(world: W) -> Simulation<W> {
        Simulation {
            events: EventLoop::new(),
            processes: Vec::new(),
            resources: Vec::new(),
            world,
        }
    }

    pub fn add_resource(&mut self, capacity: NonZeroUsize) -> ResourceId {
        self.resources.push(ResourcePool::new(capacity));
        ResourceId(self.resources.len() - 1)
    }

    /// Register a process; it first runs at the current simulated time.
    pub fn spawn<P>(&mut self, process: P) -> ProcessId
    where
        P: Process<W> + 'static,
    {
        register(&mut self.events, &mut self.processes, Box::new(process))
    }

    pub fn now(&self) -> f64 {
        self.events.now()
    }

    pub fn resource(&self, id: ResourceId) -> Option<&ResourcePool> {
        self.resources.get(id.0)
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn into_world(self) -> W {
        self.world
    }

    /// Processes that have not exited yet, suspended ones included.
    pub fn live_processes(&self) -> usize {
        self.processes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Dispatch every event due up to and including `horizon`.
    ///
    /// Processes still suspended afterwards are left as they are.
    pub fn run_until(&mut self, horizon: f64) -> SimResult<()> {
        let Simulation {
            events,
            processes,
            resources,
            world,
        } = self;
        events.run_until(horizon, |events, pid| {
            let mut process = processes
                .get_mut(pid.0)
                .and_then(Option::take)
                .ok_or(SimError::UnknownProcess(pid))?;
            trace!(t = events.now(), process = %pid, "resume");

            let mut ctx = Context {
                events,
                processes: &mut *processes,
                resources: resources.as_mut_slice(),
                world: &mut *world,
            };
            if drive(process.as_mut(), pid, &mut ctx)? {
                processes[pid.0] = Some(process);
            }
            Ok(())
        })
    }
}
