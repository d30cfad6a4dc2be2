//! Send-side handle and its monoid composition.

use std::sync::Arc;

use crate::mailbox_core::{Mailbox, TrySendOutcome};

/// A send handle referencing one or more mailboxes.
///
/// `Output` forms a monoid under [`std::ops::Add`]: [`Output::default`] is the
/// identity (an always-`false` sink), and `o1 + o2` is a handle whose `send`
/// writes into every target mailbox as a single transaction, returning `true`
/// if at least one accepted the value.
///
/// `send`/`try_send` never require `T: Clone` for a single-target handle (the
/// common case, e.g. straight off of [`crate::spawn`]) — the value is moved
/// into its one mailbox directly. `Clone` is only needed once a handle
/// actually fans out to more than one target, since the same value then has
/// to reach every one of them; that bound lives on [`std::ops::Add`], the
/// only way to produce a multi-target `Output`.
pub struct Output<T> {
    targets: Vec<Arc<Mailbox<T>>>,
    // Only ever `Some` on a handle with more than one target (set by `Add`,
    // which requires `T: Clone` to build one in the first place). Storing the
    // already-monomorphized `T::clone` as a plain function pointer lets the
    // fan-out path use it without putting a `T: Clone` bound on `Output<T>`
    // itself, or on `send`/`try_send`'s signatures.
    clone_fn: Option<fn(&T) -> T>,
}

impl<T: Send + 'static> Output<T> {
    pub(crate) fn new(mailbox: Arc<Mailbox<T>>) -> Self {
        Output {
            targets: vec![mailbox],
            clone_fn: None,
        }
    }

    /// Returns `false` if every target mailbox is sealed. Blocks if any live
    /// (non-sealed) target's buffer is full; once every live target can
    /// accept the value, writes to all of them in one transaction.
    ///
    /// A single-target handle moves `value` directly into its mailbox. A
    /// multi-target handle locks every target in a consistent address order
    /// (so that two `Output`s sharing targets can never deadlock against each
    /// other) and clones `value` once per live target.
    pub fn send(&self, value: T) -> bool {
        match self.targets.as_slice() {
            [] => false,
            [only] => only.send_blocking(value),
            _ => self.send_fan_out(value),
        }
    }

    fn send_fan_out(&self, value: T) -> bool {
        let clone_fn = self
            .clone_fn
            .expect("multi-target Output always carries a clone_fn");

        let mut ordered: Vec<&Arc<Mailbox<T>>> = self.targets.iter().collect();
        ordered.sort_by_key(|m| Arc::as_ptr(m) as usize);

        loop {
            let mut guards: Vec<_> = ordered.iter().map(|m| m.lock()).collect();

            let mut blocked_on: Option<usize> = None;
            let mut any_live = false;
            for (i, guard) in guards.iter().enumerate() {
                if guard.sealed {
                    continue;
                }
                any_live = true;
                if !guard.buffer.can_write() {
                    blocked_on = Some(i);
                    break;
                }
            }

            if let Some(i) = blocked_on {
                let blocking = ordered[i];
                drop(guards);
                blocking.wait_for_not_full();
                continue;
            }

            if !any_live {
                return false;
            }

            for guard in guards.iter_mut() {
                if !guard.sealed {
                    let _ = guard.buffer.write(clone_fn(&value));
                }
            }
            drop(guards);
            for target in &ordered {
                target.notify_not_empty();
            }
            #[cfg(feature = "async")]
            for target in &ordered {
                target.wakers().wake_receiver();
            }
            return true;
        }
    }

    /// Non-blocking send: writes to every live target that currently has
    /// room, skips (without blocking) any that don't. Returns `true` if at
    /// least one target accepted the value. This is the primitive the
    /// `async` feature's `Sink::poll_ready`/`poll_flush` build on.
    pub fn try_send(&self, value: T) -> bool {
        match self.targets.as_slice() {
            [] => false,
            [only] => matches!(only.try_send(value), TrySendOutcome::Sent),
            _ => {
                let clone_fn = self
                    .clone_fn
                    .expect("multi-target Output always carries a clone_fn");
                let mut accepted = false;
                for target in &self.targets {
                    match target.try_send(clone_fn(&value)) {
                        TrySendOutcome::Sent => accepted = true,
                        TrySendOutcome::Full(_) | TrySendOutcome::Sealed => {}
                    }
                }
                accepted
            }
        }
    }
}

/// Outcome of [`Output::poll_send`]. A plain `std::task::Poll<bool>` can't
/// carry the value back on the pending arm (`Poll::Pending` has no payload),
/// and `poll_send` needs to hand it back so a caller like
/// `mailbox_stream::OutputSink` can hold onto it for the next poll rather
/// than losing it — `Output::send`/`try_send`'s fan-out path can re-clone a
/// dropped value, but a single-target `Output` carrying a non-`Clone` `T`
/// cannot.
#[cfg(feature = "async")]
pub enum SendPoll<T> {
    Ready(bool),
    Pending(T),
}

#[cfg(feature = "async")]
impl<T: Send + 'static> Output<T> {
    /// Non-blocking, waker-registering counterpart to [`Output::send`] for an
    /// executor that can't park an OS thread.
    ///
    /// Same check-then-commit shape: if every live target currently has
    /// room, the whole transaction commits and this returns
    /// `SendPoll::Ready(true)` (or `Ready(false)` if every target is sealed).
    /// Otherwise nothing is written, a waker is registered on every live
    /// target, and `value` comes back via `SendPoll::Pending` for the caller
    /// to retry later.
    pub fn poll_send(&self, cx: &mut std::task::Context<'_>, value: T) -> SendPoll<T> {
        match self.targets.as_slice() {
            [] => SendPoll::Ready(false),
            [only] => {
                only.wakers().register_sender(cx.waker());
                let mut guard = only.lock();
                if guard.sealed {
                    return SendPoll::Ready(false);
                }
                if !guard.buffer.can_write() {
                    drop(guard);
                    return SendPoll::Pending(value);
                }
                let _ = guard.buffer.write(value);
                drop(guard);
                only.notify_not_empty();
                only.wakers().wake_receiver();
                SendPoll::Ready(true)
            }
            _ => self.poll_send_fan_out(cx, value),
        }
    }

    fn poll_send_fan_out(&self, cx: &mut std::task::Context<'_>, value: T) -> SendPoll<T> {
        let clone_fn = self
            .clone_fn
            .expect("multi-target Output always carries a clone_fn");

        let mut ordered: Vec<&Arc<Mailbox<T>>> = self.targets.iter().collect();
        ordered.sort_by_key(|m| Arc::as_ptr(m) as usize);

        // Register before checking: see Input::poll_recv for why order matters.
        for target in &ordered {
            target.wakers().register_sender(cx.waker());
        }

        let mut guards: Vec<_> = ordered.iter().map(|m| m.lock()).collect();

        let mut blocked = false;
        let mut any_live = false;
        for guard in &guards {
            if guard.sealed {
                continue;
            }
            any_live = true;
            if !guard.buffer.can_write() {
                blocked = true;
                break;
            }
        }

        if blocked {
            drop(guards);
            return SendPoll::Pending(value);
        }

        if !any_live {
            return SendPoll::Ready(false);
        }

        for guard in guards.iter_mut() {
            if !guard.sealed {
                let _ = guard.buffer.write(clone_fn(&value));
            }
        }
        drop(guards);
        for target in &ordered {
            target.notify_not_empty();
            target.wakers().wake_receiver();
        }
        SendPoll::Ready(true)
    }
}

impl<T: Send + 'static> Default for Output<T> {
    fn default() -> Self {
        Output {
            targets: Vec::new(),
            clone_fn: None,
        }
    }
}

impl<T: Send + 'static> Clone for Output<T> {
    fn clone(&self) -> Self {
        for target in &self.targets {
            target.acquire_producer();
        }
        Output {
            targets: self.targets.clone(),
            clone_fn: self.clone_fn,
        }
    }
}

impl<T: Send + Clone + 'static> std::ops::Add for Output<T> {
    type Output = Output<T>;

    /// Monoid `mappend`: merges both sides' targets without creating any new
    /// handle (both operands are consumed by value, so no refcount change).
    ///
    /// Bounded on `T: Clone` because the result may have more than one
    /// target, and a multi-target `send`/`try_send` needs to hand each target
    /// its own copy of the value.
    fn add(mut self, mut other: Output<T>) -> Output<T> {
        self.targets.append(&mut other.targets);
        self.clone_fn = Some(<T as Clone>::clone);
        self
    }
}

impl<T: Send + 'static> Drop for Output<T> {
    fn drop(&mut self) {
        for target in &self.targets {
            target.release_producer();
        }
    }
}
