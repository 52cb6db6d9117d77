//! Fixed-capacity ring buffer shared between producer threads and a
//! single blocking consumer.
//!
//! The queue owns its storage for its whole life: slots are allocated once in
//! [`BoundedQueue::new`] and addressed by index only. A single mutex guards
//! the ring and a condition variable waits on the same `count`, so a blocked
//! consumer can neither wake to an empty ring nor miss a push.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("queue capacity must be at least 1")]
    ZeroCapacity,
    #[error("queue is full")]
    Full,
    #[error("queue is empty")]
    Empty,
    #[error("queue is closed")]
    Closed,
}

/// Indices and occupancy of the ring, as seen under the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub count: usize,
    pub read_index: usize,
    pub write_index: usize,
}

struct Ring<T> {
    slots: Box<[Option<T>]>,
    count: usize,
    read_index: usize,
    write_index: usize,
    closed: bool,
}

impl<T: Copy> Ring<T> {
    fn take_front(&mut self) -> Result<T, QueueError> {
        if self.count == 0 {
            return Err(QueueError::Empty);
        }
        let value = self.slots[self.read_index]
            .take()
            .ok_or(QueueError::Empty)?;
        self.read_index = (self.read_index + 1) % self.slots.len();
        self.count -= 1;
        Ok(value)
    }
}

pub struct BoundedQueue<T> {
    ring: Mutex<Ring<T>>,
    available: Condvar,
    capacity: usize,
}

impl<T: Copy> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }
        let slots = vec![None; capacity].into_boxed_slice();
        Ok(Self {
            ring: Mutex::new(Ring {
                slots,
                count: 0,
                read_index: 0,
                write_index: 0,
                closed: false,
            }),
            available: Condvar::new(),
            capacity,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Ring<T>> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `value` without blocking. A full or closed queue is left untouched.
    pub fn push(&self, value: T) -> Result<(), QueueError> {
        let mut ring = self.lock();
        if ring.closed {
            return Err(QueueError::Closed);
        }
        if ring.count == self.capacity {
            return Err(QueueError::Full);
        }

        let at = ring.write_index;
        ring.slots[at] = Some(value);
        ring.write_index = (at + 1) % self.capacity;
        ring.count += 1;
        drop(ring);

        // one push, one waiter
        self.available.notify_one();
        Ok(())
    }

    /// Remove the oldest element, failing with [`QueueError::Empty`] instead of waiting.
    pub fn try_pop(&self) -> Result<T, QueueError> {
        self.lock().take_front()
    }

    /// Block until an element is available and remove it.
    ///
    /// Once the queue is closed the remaining elements are still handed out;
    /// after that every call returns [`QueueError::Closed`].
    pub fn pop_wait(&self) -> Result<T, QueueError> {
        let mut ring = self.lock();
        while ring.count == 0 {
            if ring.closed {
                return Err(QueueError::Closed);
            }
            ring = self
                .available
                .wait(ring)
                .unwrap_or_else(PoisonError::into_inner);
        }
        ring.take_front()
    }

    /// Like [`pop_wait`](Self::pop_wait) but gives up after `timeout` with
    /// [`QueueError::Empty`].
    pub fn pop_timeout(&self, timeout: Duration) -> Result<T, QueueError> {
        let deadline = Instant::now() + timeout;
        let mut ring = self.lock();
        while ring.count == 0 {
            if ring.closed {
                return Err(QueueError::Closed);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(QueueError::Empty);
            }
            let (guard, _) = self
                .available
                .wait_timeout(ring, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            ring = guard;
        }
        ring.take_front()
    }

    /// Refuse further pushes and wake every blocked consumer.
    pub fn close(&self) {
        self.lock().closed = true;
        self.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of queued elements. Advisory: may be stale as soon as it returns.
    pub fn len(&self) -> usize {
        self.lock().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        let ring = self.lock();
        QueueSnapshot {
            count: ring.count,
            read_index: ring.read_index,
            write_index: ring.write_index,
        }
    }
}
