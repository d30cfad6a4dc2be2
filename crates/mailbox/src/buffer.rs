//! Buffer disciplines: the value-holding state machines a [`crate::Mailbox`] wraps.
//!
//! Each discipline implements [`BufferOps`], a small trait in the same spirit as
//! the ring cell's `Storable` trait: a uniform `write`/`read` surface over
//! otherwise unrelated storage strategies. The mailbox itself never matches on a
//! buffer's concrete type; it only ever calls through the trait object.

use std::collections::VecDeque;

#[cfg(debug_assertions)]
use crate::invariants::{debug_assert_bounded_len, debug_assert_latest_nonempty};

/// Outcome of a single write attempt.
///
/// `Full` hands the value back so the caller can retry it once space frees up —
/// a write never silently drops what was handed to it (except the drop-oldest
/// disciplines, which make that trade explicit in their own `write` impl instead
/// of reporting `Full`).
pub(crate) enum WriteOutcome<T> {
    Accepted,
    Full(T),
}

/// The operations every buffer discipline must provide.
///
/// `can_write` is split out from `write` so that a multi-mailbox transaction
/// (`Output`'s monoid fan-out, `Input`'s alternative race) can check whether a
/// *whole group* of mailboxes would accept a value before committing to any of
/// them — see `crate::output::Output::send`.
pub(crate) trait BufferOps<T>: Send {
    fn can_write(&self) -> bool;
    fn write(&mut self, value: T) -> WriteOutcome<T>;
    fn read(&mut self) -> Option<T>;
    fn is_empty(&self) -> bool;
}

struct Unbounded<T>(VecDeque<T>);

impl<T: Send> BufferOps<T> for Unbounded<T> {
    fn can_write(&self) -> bool {
        true
    }

    fn write(&mut self, value: T) -> WriteOutcome<T> {
        self.0.push_back(value);
        WriteOutcome::Accepted
    }

    fn read(&mut self) -> Option<T> {
        self.0.pop_front()
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Backs both `Bounded(n)` and, at `n == 1`, the rendezvous `Single` discipline:
/// both accept a value only while `len < capacity`, so there is nothing to
/// distinguish at the storage layer (see `spec.md` §9 Open Question (b)).
struct BoundedQueue<T> {
    queue: VecDeque<T>,
    capacity: usize,
}

impl<T: Send> BufferOps<T> for BoundedQueue<T> {
    fn can_write(&self) -> bool {
        self.queue.len() < self.capacity
    }

    fn write(&mut self, value: T) -> WriteOutcome<T> {
        if self.queue.len() < self.capacity {
            self.queue.push_back(value);
            #[cfg(debug_assertions)]
            debug_assert_bounded_len(self.queue.len(), self.capacity);
            WriteOutcome::Accepted
        } else {
            WriteOutcome::Full(value)
        }
    }

    fn read(&mut self) -> Option<T> {
        self.queue.pop_front()
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// A never-empty, never-full single-value register. `read` peeks rather than
/// consumes, so a slow consumer keeps observing the last value written (or the
/// initial value) instead of starving on an empty queue.
struct LatestSlot<T>(T);

impl<T: Clone + Send> BufferOps<T> for LatestSlot<T> {
    fn can_write(&self) -> bool {
        true
    }

    fn write(&mut self, value: T) -> WriteOutcome<T> {
        self.0 = value;
        WriteOutcome::Accepted
    }

    fn read(&mut self) -> Option<T> {
        #[cfg(debug_assertions)]
        debug_assert_latest_nonempty();
        Some(self.0.clone())
    }

    fn is_empty(&self) -> bool {
        false
    }
}

/// Backs both `Newest(n)` and, at `n == 1`, `New`: on overflow the oldest queued
/// value is dropped to make room, so `write` never reports `Full` and a
/// producer never blocks or fails on this discipline.
struct NewestQueue<T> {
    queue: VecDeque<T>,
    capacity: usize,
}

impl<T: Send> BufferOps<T> for NewestQueue<T> {
    fn can_write(&self) -> bool {
        true
    }

    fn write(&mut self, value: T) -> WriteOutcome<T> {
        if self.queue.len() >= self.capacity {
            // Drop-oldest, atomic with the append: there is never a transient
            // state where the queue holds more than `capacity` values.
            self.queue.pop_front();
            tracing::trace!(capacity = self.capacity, "newest buffer dropped oldest value");
        }
        self.queue.push_back(value);
        #[cfg(debug_assertions)]
        debug_assert_bounded_len(self.queue.len(), self.capacity);
        WriteOutcome::Accepted
    }

    fn read(&mut self) -> Option<T> {
        self.queue.pop_front()
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// A configured but not-yet-installed buffer discipline, passed to
/// [`crate::spawn`]/[`crate::with_spawn`].
pub struct Buffer<T> {
    pub(crate) inner: Box<dyn BufferOps<T> + Send>,
}

impl<T: Send> Buffer<T> {
    pub(crate) fn can_write(&self) -> bool {
        self.inner.can_write()
    }

    pub(crate) fn write(&mut self, value: T) -> WriteOutcome<T> {
        self.inner.write(value)
    }

    pub(crate) fn read(&mut self) -> Option<T> {
        self.inner.read()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Send + 'static> Buffer<T> {
    /// Unbounded FIFO. `send` never blocks on this discipline.
    pub fn unbounded() -> Self {
        Buffer {
            inner: Box::new(Unbounded(VecDeque::new())),
        }
    }

    /// Bounded FIFO of capacity `n`. `send` blocks (applies back-pressure) once
    /// `n` values are queued.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0` — a zero-capacity buffer can never accept a value,
    /// which is not a useful discipline to construct.
    pub fn bounded(n: usize) -> Self {
        assert!(n >= 1, "bounded(n) requires n >= 1");
        Buffer {
            inner: Box::new(BoundedQueue {
                queue: VecDeque::with_capacity(n),
                capacity: n,
            }),
        }
    }

    /// Single-slot rendezvous: the second concurrent `send` blocks until a
    /// `recv` drains the first. Equivalent to `bounded(1)`.
    pub fn single() -> Self {
        Self::bounded(1)
    }

    /// Drop-oldest buffer holding at most `n` values; `send` never blocks.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn newest(n: usize) -> Self {
        assert!(n >= 1, "newest(n) requires n >= 1");
        Buffer {
            inner: Box::new(NewestQueue {
                queue: VecDeque::with_capacity(n),
                capacity: n,
            }),
        }
    }

    /// Drop-oldest buffer holding the single most recent value. Equivalent to
    /// `newest(1)`, except that `recv` consumes the value (unlike `latest`,
    /// which peeks).
    pub fn new_buffer() -> Self {
        Self::newest(1)
    }
}

impl<T: Clone + Send + 'static> Buffer<T> {
    /// A 1-slot register that always holds a value, starting from `init`.
    /// `recv` never consumes it, so every `recv` on an unsealed mailbox
    /// returns `Some`.
    pub fn latest(init: T) -> Self {
        Buffer {
            inner: Box::new(LatestSlot(init)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_never_full() {
        let mut b = Unbounded::<i32>(VecDeque::new());
        for i in 0..1000 {
            assert!(matches!(b.write(i), WriteOutcome::Accepted));
        }
        assert_eq!(b.read(), Some(0));
    }

    #[test]
    fn bounded_fills_then_full() {
        let mut b = BoundedQueue {
            queue: VecDeque::new(),
            capacity: 2,
        };
        assert!(matches!(b.write(1), WriteOutcome::Accepted));
        assert!(matches!(b.write(2), WriteOutcome::Accepted));
        assert!(matches!(b.write(3), WriteOutcome::Full(3)));
        assert_eq!(b.read(), Some(1));
        assert!(matches!(b.write(3), WriteOutcome::Accepted));
    }

    #[test]
    fn latest_never_empty_and_peeks() {
        let mut b = LatestSlot(0);
        assert!(!b.is_empty());
        assert_eq!(b.read(), Some(0));
        assert_eq!(b.read(), Some(0)); // peek, not consume
        b.write(5);
        assert_eq!(b.read(), Some(5));
        assert_eq!(b.read(), Some(5));
    }

    #[test]
    fn newest_drops_oldest() {
        let mut b = NewestQueue {
            queue: VecDeque::new(),
            capacity: 2,
        };
        for i in 1..=5 {
            assert!(matches!(b.write(i), WriteOutcome::Accepted));
        }
        // Last 2 values survive: 4, 5
        assert_eq!(b.read(), Some(4));
        assert_eq!(b.read(), Some(5));
        assert!(b.is_empty());
    }
}
