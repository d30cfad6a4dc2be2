//! A concurrent mailbox primitive for wiring producers and consumers together
//! without either side needing to know how many of the other there are.
//!
//! A mailbox is created with [`spawn`] (or the scoped [`with_spawn`]), which
//! hands back an [`Output`] (send) handle, an [`Input`] (receive) handle, and
//! a [`Seal`] handle for closing it explicitly. Both endpoints are cheap to
//! clone and freely `Send`; the mailbox seals itself automatically once every
//! outstanding clone of both kinds has been dropped, so a consumer draining an
//! `Input` eventually observes `recv() == None` rather than blocking forever.
//!
//! The behavior a mailbox exhibits under contention — does `send` block, does
//! it drop the oldest value, does `recv` ever observe the same value twice —
//! is determined entirely by the [`Buffer`] discipline chosen at construction
//! time: [`Buffer::unbounded`], [`Buffer::bounded`], [`Buffer::single`],
//! [`Buffer::latest`], [`Buffer::newest`], or [`Buffer::new_buffer`].
//!
//! [`Output`] and [`Input`] compose: `Output` is a monoid under `+` (fan-out
//! broadcast to every target), and `Input` is an Alternative under `|`
//! (fan-in, racing every source). [`input::Recv`] and its `map`/`and_then`
//! combinators let a receiver be transformed without exposing its mailbox
//! locks.

mod backoff;
mod buffer;
mod input;
mod invariants;
mod mailbox_core;
mod output;
mod spawn;

#[cfg(feature = "async")]
mod waker;

pub use buffer::Buffer;
pub use input::{AndThen, Input, Mapped, Recv, RecvExt};
pub use output::Output;
#[cfg(feature = "async")]
pub use output::SendPoll;
pub use spawn::{spawn, with_spawn, Seal};
