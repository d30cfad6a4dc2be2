//! Constructors that tie a [`Buffer`] to a freshly allocated mailbox and hand
//! back its `Output`/`Input` endpoints.

use std::sync::Arc;

use crate::buffer::Buffer;
use crate::input::Input;
use crate::mailbox_core::Mailbox;
use crate::output::Output;

/// A handle that seals the underlying mailbox independent of any
/// `Output`/`Input` handle's own liveness-driven sealing. Returned by
/// [`spawn`] alongside the endpoints so a caller can force an early seal
/// (e.g. on a shutdown signal) without having to drop every outstanding
/// handle first.
#[derive(Clone)]
pub struct Seal<T> {
    mailbox: Arc<Mailbox<T>>,
}

impl<T: Send + 'static> Seal<T> {
    /// Seals the mailbox. Idempotent; safe to call even if every `Output`/
    /// `Input` handle has already been dropped (which would have sealed it
    /// already).
    pub fn seal(&self) {
        self.mailbox.seal();
    }

    pub fn is_sealed(&self) -> bool {
        self.mailbox.is_sealed()
    }
}

/// Allocates a mailbox around `buffer` and returns its endpoints plus a
/// [`Seal`] handle for explicit early sealing.
///
/// The mailbox is sealed automatically once every `Output` clone and every
/// `Input` clone derived from the returned endpoints has been dropped — there
/// is no separate "close" call required for the common case.
pub fn spawn<T: Send + 'static>(buffer: Buffer<T>) -> (Output<T>, Input<T>, Seal<T>) {
    let mailbox = Arc::new(Mailbox::new(buffer));
    let output = Output::new(mailbox.clone());
    let input = Input::new(mailbox.clone());
    let seal = Seal { mailbox };
    (output, input, seal)
}

/// Runs `body` with a freshly spawned mailbox's endpoints, then seals the
/// mailbox before returning — including when `body` panics, via a
/// drop-based guard, so a caller can't forget to close the channel on an
/// early-return or unwind path.
pub fn with_spawn<T, R>(buffer: Buffer<T>, body: impl FnOnce(Output<T>, Input<T>) -> R) -> R
where
    T: Send + 'static,
{
    let mailbox = Arc::new(Mailbox::new(buffer));
    struct SealOnDrop<T: Send + 'static>(Arc<Mailbox<T>>);
    impl<T: Send + 'static> Drop for SealOnDrop<T> {
        fn drop(&mut self) {
            self.0.seal();
        }
    }
    let _guard = SealOnDrop(mailbox.clone());

    let output = Output::new(mailbox.clone());
    let input = Input::new(mailbox);
    body(output, input)
}
