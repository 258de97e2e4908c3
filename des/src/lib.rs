use std::cmp::Ordering;
use std::collections::BinaryHeap;

pub mod error;
pub mod parallel;
pub mod process;
pub mod resource;

pub use error::{SimError, SimResult};
pub use process::{Context, Process, ProcessId, Simulation, Wait};
pub use resource::{ResourceId, ResourcePool};

struct Event<T> {
    t: f64,
    seq: u64,
    data: T,
}

impl<T> PartialEq for Event<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Event<T> {}

impl<T> Ord for Event<T> {
    // BinaryHeap is a max-heap, so earlier times and then older sequence
    // numbers must compare greater.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .t
            .total_cmp(&self.t)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialOrd for Event<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Simulated clock plus the pending events ordered by `(due time, insertion)`.
pub struct EventLoop<T> {
    queue: BinaryHeap<Event<T>>,
    current_t: f64,
    next_seq: u64,
}

impl<T> Default for EventLoop<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventLoop<T> {
    pub fn new() -> EventLoop<T> {
        EventLoop {
            queue: BinaryHeap::new(),
            current_t: 0.0,
            next_seq: 0,
        }
    }

    /// Current simulated time.
    pub fn now(&self) -> f64 {
        self.current_t
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn push(&mut self, t: f64, data: T) {
        self.queue.push(Event {
            t,
            seq: self.next_seq,
            data,
        });
        self.next_seq += 1;
    }

    /// Schedule `data` to be dispatched `delay` time units from now.
    ///
    /// Events due at the same instant are dispatched in the order they were
    /// scheduled.
    pub fn schedule(&mut self, delay: f64, data: T) -> SimResult<()> {
        if !delay.is_finite() || delay < 0.0 {
            return Err(SimError::InvalidDelay(delay));
        }
        self.push(self.current_t + delay, data);
        Ok(())
    }

    /// Schedule `data` at absolute time `t`, which must not lie in the past.
    pub fn schedule_at(&mut self, t: f64, data: T) -> SimResult<()> {
        if !t.is_finite() || t < self.current_t {
            return Err(SimError::InvalidTime(t));
        }
        self.push(t, data);
        Ok(())
    }

    /// Schedule `data` at the current instant, behind anything already due now.
    pub fn schedule_now(&mut self, data: T) {
        self.push(self.current_t, data);
    }

    /// Pop the next event if it is due at or before `horizon`, advancing the
    /// clock to its due time.
    ///
    /// Returns `None` once nothing is left to dispatch before the horizon. The
    /// clock then rests at `horizon` and later events stay pending.
    pub fn pop_due(&mut self, horizon: f64) -> Option<T> {
        match self.queue.peek() {
            Some(event) if event.t <= horizon => {
                let event = self.queue.pop()?;
                self.current_t = event.t;
                Some(event.data)
            }
            _ => {
                if horizon.is_finite() && horizon > self.current_t {
                    self.current_t = horizon;
                }
                None
            }
        }
    }

    /// Dispatch every event due up to `horizon`, in order.
    ///
    /// `dispatch` may schedule further events through the loop it is handed;
    /// they are visible to the next pop.
    pub fn run_until<E, F>(&mut self, horizon: f64, mut dispatch: F) -> Result<(), E>
    where
        F: FnMut(&mut EventLoop<T>, T) -> Result<(), E>,
    {
        while let Some(data) = self.pop_due(horizon) {
            dispatch(self, data)?;
        }
        Ok(())
    }
}
