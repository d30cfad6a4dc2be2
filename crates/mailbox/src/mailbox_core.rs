//! The mailbox itself: a buffer plus a `sealed` flag and the two liveness
//! counters, guarded by a single mutex.
//!
//! This is the "transaction" substrate the rest of the crate builds on. There
//! is no native STM available in `std`, so each operation here is emulated
//! with a `Mutex` + `Condvar` pair per the approach `spec.md` §9 calls out
//! explicitly: lock in a consistent order for composite operations, evaluate
//! the whole precondition before committing any write, and retry via condvar
//! wait rather than polling.

use std::sync::{Condvar, Mutex};

use crossbeam_utils::CachePadded;

use crate::backoff::Backoff;
use crate::buffer::{Buffer, WriteOutcome};
#[cfg(debug_assertions)]
use crate::invariants::{debug_assert_refcount_nonzero, debug_assert_seal_monotonic};

#[cfg(feature = "async")]
use crate::waker::Wakers;

pub(crate) struct Inner<T> {
    pub(crate) buffer: Buffer<T>,
    pub(crate) sealed: bool,
    pub(crate) producer_refs: usize,
    pub(crate) consumer_refs: usize,
}

/// A shared broker between one or more producers and one or more consumers.
///
/// Never constructed directly by users of the crate — see [`crate::spawn`] and
/// [`crate::with_spawn`].
///
/// # Panics
///
/// Every operation here panics if the internal mutex is poisoned, i.e. some
/// other thread panicked while holding it. That's a programmer error in the
/// sense spec.md §7 describes ("internal invariant violations... may abort")
/// rather than a condition this crate tries to recover from — a poisoned
/// mailbox has no well-defined state to resume from.
pub struct Mailbox<T> {
    // Padded so that a `Vec<Arc<Mailbox<T>>>` of fan-out/fan-in targets
    // doesn't put two mailboxes' hot lock state on the same cache line.
    state: CachePadded<Mutex<Inner<T>>>,
    not_full: Condvar,
    not_empty: Condvar,
    #[cfg(feature = "async")]
    wakers: Wakers,
}

impl<T: Send + 'static> Mailbox<T> {
    pub(crate) fn new(buffer: Buffer<T>) -> Self {
        tracing::trace!("mailbox created");
        Mailbox {
            state: CachePadded::new(Mutex::new(Inner {
                buffer,
                sealed: false,
                producer_refs: 1,
                consumer_refs: 1,
            })),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            #[cfg(feature = "async")]
            wakers: Wakers::default(),
        }
    }

    /// Blocking, single-mailbox send. Used directly by `Output` when it has
    /// exactly one target; the multi-target fan-out in
    /// `crate::output::Output::send` reimplements the same check-then-commit
    /// shape across several mailboxes locked in a consistent order.
    pub(crate) fn send_blocking(&self, mut value: T) -> bool {
        let mut guard = self.state.lock().unwrap();
        let mut backoff = Backoff::new();
        loop {
            if guard.sealed {
                return false;
            }
            match guard.buffer.write(value) {
                WriteOutcome::Accepted => {
                    self.not_empty.notify_all();
                    #[cfg(feature = "async")]
                    self.wakers.wake_receiver();
                    return true;
                }
                WriteOutcome::Full(v) => {
                    value = v;
                    if backoff.is_completed() {
                        guard = self.not_full.wait(guard).unwrap();
                        backoff.reset();
                    } else {
                        drop(guard);
                        backoff.snooze();
                        guard = self.state.lock().unwrap();
                    }
                }
            }
        }
    }

    /// Blocking, single-mailbox receive.
    pub(crate) fn recv_blocking(&self) -> Option<T> {
        let mut guard = self.state.lock().unwrap();
        let mut backoff = Backoff::new();
        loop {
            if let Some(value) = guard.buffer.read() {
                self.not_full.notify_all();
                #[cfg(feature = "async")]
                self.wakers.wake_sender();
                return Some(value);
            }
            if guard.sealed {
                return None;
            }
            if backoff.is_completed() {
                guard = self.not_empty.wait(guard).unwrap();
                backoff.reset();
            } else {
                drop(guard);
                backoff.snooze();
                guard = self.state.lock().unwrap();
            }
        }
    }

    /// Non-blocking send attempt: used by the multi-mailbox transactions and
    /// by the `async` feature's poll-based adapters.
    pub(crate) fn try_send(&self, value: T) -> TrySendOutcome<T> {
        let mut guard = self.state.lock().unwrap();
        if guard.sealed {
            return TrySendOutcome::Sealed;
        }
        match guard.buffer.write(value) {
            WriteOutcome::Accepted => {
                self.not_empty.notify_all();
                #[cfg(feature = "async")]
                self.wakers.wake_receiver();
                TrySendOutcome::Sent
            }
            WriteOutcome::Full(v) => TrySendOutcome::Full(v),
        }
    }

    /// Non-blocking receive attempt.
    pub(crate) fn try_recv(&self) -> TryRecvOutcome<T> {
        let mut guard = self.state.lock().unwrap();
        if let Some(value) = guard.buffer.read() {
            self.not_full.notify_all();
            #[cfg(feature = "async")]
            self.wakers.wake_sender();
            return TryRecvOutcome::Received(value);
        }
        if guard.sealed {
            TryRecvOutcome::Sealed
        } else {
            TryRecvOutcome::Empty
        }
    }

    /// Sets `sealed`. Idempotent.
    pub(crate) fn seal(&self) {
        let mut guard = self.state.lock().unwrap();
        let was_sealed = guard.sealed;
        guard.sealed = true;
        #[cfg(debug_assertions)]
        debug_assert_seal_monotonic(was_sealed, guard.sealed);
        drop(guard);
        if !was_sealed {
            tracing::debug!("mailbox sealed");
        }
        self.not_full.notify_all();
        self.not_empty.notify_all();
        #[cfg(feature = "async")]
        {
            self.wakers.wake_sender();
            self.wakers.wake_receiver();
        }
    }

    pub(crate) fn is_sealed(&self) -> bool {
        self.state.lock().unwrap().sealed
    }

    pub(crate) fn acquire_producer(&self) {
        let mut guard = self.state.lock().unwrap();
        guard.producer_refs += 1;
    }

    pub(crate) fn acquire_consumer(&self) {
        let mut guard = self.state.lock().unwrap();
        guard.consumer_refs += 1;
    }

    /// Drops a producer handle; seals the mailbox once the last one is gone.
    pub(crate) fn release_producer(&self) {
        let mut guard = self.state.lock().unwrap();
        #[cfg(debug_assertions)]
        debug_assert_refcount_nonzero("producer", guard.producer_refs);
        guard.producer_refs -= 1;
        let should_seal = guard.producer_refs == 0;
        drop(guard);
        if should_seal {
            tracing::debug!("last producer dropped");
            self.seal();
        }
    }

    /// Drops a consumer handle; seals the mailbox once the last one is gone.
    pub(crate) fn release_consumer(&self) {
        let mut guard = self.state.lock().unwrap();
        #[cfg(debug_assertions)]
        debug_assert_refcount_nonzero("consumer", guard.consumer_refs);
        guard.consumer_refs -= 1;
        let should_seal = guard.consumer_refs == 0;
        drop(guard);
        if should_seal {
            tracing::debug!("last consumer dropped");
            self.seal();
        }
    }

    #[cfg(feature = "async")]
    pub(crate) fn wakers(&self) -> &Wakers {
        &self.wakers
    }

    pub(crate) fn lock(&self) -> std::sync::MutexGuard<'_, Inner<T>> {
        self.state.lock().unwrap()
    }

    pub(crate) fn notify_not_full(&self) {
        self.not_full.notify_all();
    }

    pub(crate) fn notify_not_empty(&self) {
        self.not_empty.notify_all();
    }

    /// Waits for this mailbox's buffer to stop being full, or to be sealed.
    /// Used by `Output::send`'s multi-target transaction after it releases
    /// every lock it was holding.
    pub(crate) fn wait_for_not_full(&self) {
        let guard = self.state.lock().unwrap();
        let _guard = self
            .not_full
            .wait_timeout_while(guard, std::time::Duration::from_millis(5), |inner| {
                !inner.sealed && !inner.buffer.can_write()
            })
            .unwrap();
    }

    /// Waits for this mailbox's buffer to have a value, or to be sealed. Used
    /// by `Input::recv`'s multi-source transaction.
    pub(crate) fn wait_for_not_empty(&self) {
        let guard = self.state.lock().unwrap();
        let _guard = self
            .not_empty
            .wait_timeout_while(guard, std::time::Duration::from_millis(5), |inner| {
                inner.buffer.is_empty() && !inner.sealed
            })
            .unwrap();
    }
}

pub(crate) enum TrySendOutcome<T> {
    Sent,
    Full(T),
    Sealed,
}

pub(crate) enum TryRecvOutcome<T> {
    Received(T),
    Empty,
    Sealed,
}
