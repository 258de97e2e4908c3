use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroUsize;

use crate::ProcessId;

/// Handle to a [`ResourcePool`] registered with a
/// [`Simulation`](crate::Simulation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(pub usize);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bounded set of identical units with a FIFO wait queue.
///
/// Waiting processes are granted units strictly in request order: a request
/// is only granted immediately when a unit is free *and* nobody is queued.
#[derive(Debug, Clone)]
pub struct ResourcePool {
    capacity: NonZeroUsize,
    in_use: usize,
    wait_queue: VecDeque<ProcessId>,
}

impl ResourcePool {
    pub fn new(capacity: NonZeroUsize) -> ResourcePool {
        ResourcePool {
            capacity,
            in_use: 0,
            wait_queue: VecDeque::new(),
        }
    }

    /// Request one unit for `process`.
    ///
    /// Returns `true` when the unit is granted on the spot, otherwise the
    /// process joins the back of the wait queue and `false` is returned.
    pub fn acquire(&mut self, process: ProcessId) -> bool {
        if self.available() > 0 && self.wait_queue.is_empty() {
            self.in_use += 1;
            true
        } else {
            self.wait_queue.push_back(process);
            false
        }
    }

    /// Give back one unit.
    ///
    /// If anyone is waiting, the unit passes straight to the head of the
    /// queue and that process is returned so the caller can schedule its
    /// resumption. `None` means the unit went back to the pool, or that
    /// nothing was in use to begin with (see [`ResourcePool::busy_count`]).
    pub fn release(&mut self) -> Option<ProcessId> {
        if self.in_use == 0 {
            return None;
        }
        match self.wait_queue.pop_front() {
            Some(next) => Some(next),
            None => {
                self.in_use -= 1;
                None
            }
        }
    }

    /// Units currently held.
    pub fn busy_count(&self) -> usize {
        self.in_use
    }

    pub fn available(&self) -> usize {
        self.capacity.get() - self.in_use
    }

    /// Processes waiting for a unit.
    pub fn queue_length(&self) -> usize {
        self.wait_queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(capacity: usize) -> ResourcePool {
        ResourcePool::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn given_free_units_when_acquired_then_granted_immediately() {
        let mut counters = pool(2);

        assert!(counters.acquire(ProcessId(1)));
        assert!(counters.acquire(ProcessId(2)));

        assert_eq!(counters.busy_count(), 2);
        assert_eq!(counters.available(), 0);
        assert_eq!(counters.queue_length(), 0);
    }

    #[test]
    fn given_full_pool_when_acquired_then_queued() {
        let mut counters = pool(1);
        counters.acquire(ProcessId(1));

        assert!(!counters.acquire(ProcessId(2)));
        assert!(!counters.acquire(ProcessId(3)));

        assert_eq!(counters.busy_count(), 1);
        assert_eq!(counters.queue_length(), 2);
    }

    #[test]
    fn given_queue_when_released_then_head_receives_unit() {
        let mut counters = pool(1);
        counters.acquire(ProcessId(1));
        counters.acquire(ProcessId(2));
        counters.acquire(ProcessId(3));

        assert_eq!(counters.release(), Some(ProcessId(2)));
        // the unit changed hands, it did not return to the pool
        assert_eq!(counters.busy_count(), 1);
        assert_eq!(counters.queue_length(), 1);

        assert_eq!(counters.release(), Some(ProcessId(3)));
        assert_eq!(counters.release(), None);
        assert_eq!(counters.busy_count(), 0);
    }

    #[test]
    fn given_waiters_when_unit_frees_then_new_arrival_cannot_jump_the_queue() {
        let mut counters = pool(2);
        counters.acquire(ProcessId(1));
        counters.acquire(ProcessId(2));
        counters.acquire(ProcessId(3));

        // Process 3 takes over the freed unit; 4 must wait behind nobody but
        // still cannot be granted while the pool is full.
        assert_eq!(counters.release(), Some(ProcessId(3)));
        assert!(!counters.acquire(ProcessId(4)));
        assert_eq!(counters.queue_length(), 1);
    }

    #[test]
    fn given_idle_pool_when_released_then_nothing_changes() {
        let mut counters = pool(3);

        assert_eq!(counters.release(), None);
        assert_eq!(counters.busy_count(), 0);
        assert_eq!(counters.available(), 3);
    }
}
