//! Waker bookkeeping for the `async` feature.
//!
//! A mailbox has at most one registered sender waker and one registered
//! receiver waker at a time — enough for the `futures::Stream`/`Sink`
//! adapters in the companion pipeline crate, which poll from a single task
//! each. Broadcasting to many concurrent async waiters on the same side isn't
//! supported; that's consistent with `Output`/`Input`'s blocking paths, which
//! wake every waiter via `Condvar::notify_all` but still only guarantee one of
//! them actually makes progress on the next poll.

use futures_util::task::AtomicWaker;

#[derive(Default)]
pub(crate) struct Wakers {
    sender: AtomicWaker,
    receiver: AtomicWaker,
}

impl Wakers {
    pub(crate) fn register_sender(&self, waker: &std::task::Waker) {
        self.sender.register(waker);
    }

    pub(crate) fn register_receiver(&self, waker: &std::task::Waker) {
        self.receiver.register(waker);
    }

    pub(crate) fn wake_sender(&self) {
        self.sender.wake();
    }

    pub(crate) fn wake_receiver(&self) {
        self.receiver.wake();
    }
}
