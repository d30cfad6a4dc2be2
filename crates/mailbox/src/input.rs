//! Receive-side handle, its alternative composition, and the functor/monad
//! combinators layered on top of it.

use std::sync::Arc;

use crate::mailbox_core::Mailbox;

/// A receive handle referencing one or more mailboxes.
///
/// `Input` forms an Alternative under [`std::ops::BitOr`]: [`Input::default`]
/// is the identity (always yields `None`), and `x | y` atomically races both
/// sides, committing to whichever has a value first; if neither does, it
/// returns `None` only once every source is sealed and empty.
pub struct Input<T> {
    sources: Vec<Arc<Mailbox<T>>>,
}

impl<T: Send + 'static> Input<T> {
    pub(crate) fn new(mailbox: Arc<Mailbox<T>>) -> Self {
        Input {
            sources: vec![mailbox],
        }
    }

    /// Returns `Some` as soon as any source has a value. Returns `None` once
    /// every source is both sealed and empty. Blocks otherwise.
    ///
    /// Sources are tried left to right on each pass; ties (multiple sources
    /// ready at once) resolve to the first in that order. Mailboxes are
    /// locked one at a time — unlike `Output::send`, a `recv` only ever
    /// commits a single read, so there is no multi-lock ordering hazard here.
    pub fn recv(&self) -> Option<T> {
        if self.sources.is_empty() {
            return None;
        }

        loop {
            let mut all_sealed_and_empty = true;
            let mut blocking_candidate: Option<&Arc<Mailbox<T>>> = None;

            for source in &self.sources {
                let mut guard = source.lock();
                if let Some(value) = guard.buffer.read() {
                    drop(guard);
                    source.notify_not_full();
                    #[cfg(feature = "async")]
                    source.wakers().wake_sender();
                    return Some(value);
                }
                if !guard.sealed {
                    all_sealed_and_empty = false;
                    if blocking_candidate.is_none() {
                        blocking_candidate = Some(source);
                    }
                }
                drop(guard);
            }

            if all_sealed_and_empty {
                return None;
            }

            if let Some(source) = blocking_candidate {
                source.wait_for_not_empty();
            }
        }
    }

    /// Non-blocking receive: returns `Some` if any source currently has a
    /// value, `None` if none do right now (whether or not any are sealed).
    /// The `async` feature's `Stream::poll_next` builds on this.
    pub fn try_recv(&self) -> Option<T> {
        for source in &self.sources {
            let mut guard = source.lock();
            if let Some(value) = guard.buffer.read() {
                drop(guard);
                source.notify_not_full();
                #[cfg(feature = "async")]
                source.wakers().wake_sender();
                return Some(value);
            }
        }
        None
    }

    /// `true` once every source is sealed and empty, i.e. `recv` would
    /// return `None` without blocking.
    pub fn is_exhausted(&self) -> bool {
        self.sources
            .iter()
            .all(|s| {
                let guard = s.lock();
                guard.sealed && guard.buffer.is_empty()
            })
    }
}

#[cfg(feature = "async")]
impl<T: Send + 'static> Input<T> {
    /// Non-blocking, waker-registering counterpart to [`Input::recv`].
    ///
    /// Returns `Poll::Ready(Some(_))` as soon as any source has a value,
    /// `Poll::Ready(None)` once every source is sealed and empty, and
    /// otherwise registers a waker on every live source and returns
    /// `Poll::Pending`.
    pub fn poll_recv(&self, cx: &mut std::task::Context<'_>) -> std::task::Poll<Option<T>> {
        use std::task::Poll;

        if self.sources.is_empty() {
            return Poll::Ready(None);
        }

        // Register before checking: otherwise a value that arrives between
        // our check and the registration would wake a waker nobody stored
        // yet, and we'd never be polled again.
        for source in &self.sources {
            source.wakers().register_receiver(cx.waker());
        }

        let mut all_sealed_and_empty = true;
        for source in &self.sources {
            let mut guard = source.lock();
            if let Some(value) = guard.buffer.read() {
                drop(guard);
                source.notify_not_full();
                source.wakers().wake_sender();
                return Poll::Ready(Some(value));
            }
            if !guard.sealed {
                all_sealed_and_empty = false;
            }
            drop(guard);
        }

        if all_sealed_and_empty {
            return Poll::Ready(None);
        }

        Poll::Pending
    }
}

impl<T: Send + 'static> Default for Input<T> {
    fn default() -> Self {
        Input { sources: Vec::new() }
    }
}

impl<T: Send + 'static> Clone for Input<T> {
    fn clone(&self) -> Self {
        for source in &self.sources {
            source.acquire_consumer();
        }
        Input {
            sources: self.sources.clone(),
        }
    }
}

impl<T: Send + 'static> std::ops::BitOr for Input<T> {
    type Output = Input<T>;

    /// Alternative's `<|>`: merges both sides' sources without creating any
    /// new handle (both operands are consumed by value).
    fn bitor(mut self, mut other: Input<T>) -> Input<T> {
        self.sources.append(&mut other.sources);
        self
    }
}

impl<T: Send + 'static> Drop for Input<T> {
    fn drop(&mut self) {
        for source in &self.sources {
            source.release_consumer();
        }
    }
}

/// A single-shot receive operation: implemented by [`Input`] directly, and by
/// the `map`/`and_then` adapters below. Exists so `fmap`/monadic bind can wrap
/// an `Input` (or another wrapped receiver) without needing access to its
/// internal mailbox locks — only `Input`'s own `<|>` needs that.
pub trait Recv<T> {
    fn recv(&self) -> Option<T>;
}

impl<T: Send + 'static> Recv<T> for Input<T> {
    fn recv(&self) -> Option<T> {
        Input::recv(self)
    }
}

/// `fmap`: post-processes the value inside the receive, purely.
pub struct Mapped<R, F> {
    inner: R,
    f: F,
}

impl<T, U, R, F> Recv<U> for Mapped<R, F>
where
    R: Recv<T>,
    F: Fn(T) -> U,
{
    fn recv(&self) -> Option<U> {
        self.inner.recv().map(&self.f)
    }
}

/// Monadic bind: a `None` from the first receive short-circuits the whole
/// chain to `None` without attempting the second.
pub struct AndThen<R, F> {
    inner: R,
    f: F,
}

impl<T, U, R, R2, F> Recv<U> for AndThen<R, F>
where
    R: Recv<T>,
    R2: Recv<U>,
    F: Fn(T) -> R2,
{
    fn recv(&self) -> Option<U> {
        self.inner.recv().and_then(|a| (self.f)(a).recv())
    }
}

/// Extension methods providing `fmap`/monadic-bind syntax over any [`Recv`].
pub trait RecvExt<T>: Recv<T> + Sized {
    fn map<U, F: Fn(T) -> U>(self, f: F) -> Mapped<Self, F> {
        Mapped { inner: self, f }
    }

    fn and_then<U, R2: Recv<U>, F: Fn(T) -> R2>(self, f: F) -> AndThen<Self, F> {
        AndThen { inner: self, f }
    }
}

impl<T, R: Recv<T>> RecvExt<T> for R {}
