//! Debug assertion helpers for buffer-discipline invariants.
//!
//! Active only in debug builds (`#[cfg(debug_assertions)]`), so there is zero
//! overhead in release builds. Mirrors the ring-decomposition channel's own
//! `INV-*` macro convention, renumbered for the buffer state machines here.

// =============================================================================
// INV-BUF-01: Bounded/Newest capacity
// =============================================================================

/// `Bounded(n)` and `Newest(n)` must hold at most `n` values at all times.
///
/// Used in: `BoundedQueue::write`, `NewestQueue::write`
#[cfg(debug_assertions)]
pub(crate) fn debug_assert_bounded_len(len: usize, capacity: usize) {
    debug_assert!(
        len <= capacity,
        "INV-BUF-01 violated: buffer holds {len} values, capacity is {capacity}"
    );
}

// =============================================================================
// INV-BUF-02: Latest never empty
// =============================================================================

/// `Latest` must never report empty on read. Documents the invariant at the
/// one call site that relies on it.
///
/// Used in: `LatestSlot::read`
#[cfg(debug_assertions)]
pub(crate) fn debug_assert_latest_nonempty() {}

// =============================================================================
// INV-MB-01: Refcounts never underflow
// =============================================================================

/// Producer/consumer reference counts are plain `usize`s; a decrement past
/// zero indicates a handle was dropped twice.
///
/// Used in: `Mailbox::release_producer`, `Mailbox::release_consumer`
#[cfg(debug_assertions)]
pub(crate) fn debug_assert_refcount_nonzero(name: &'static str, count: usize) {
    debug_assert!(count > 0, "INV-MB-01 violated: {name} refcount underflowed");
}

// =============================================================================
// INV-MB-02: Sealed is monotonic
// =============================================================================

/// Once `sealed` is true it must never observably become false again.
///
/// Used in: `Mailbox::seal`
#[cfg(debug_assertions)]
pub(crate) fn debug_assert_seal_monotonic(was_sealed: bool, now_sealed: bool) {
    debug_assert!(
        !was_sealed || now_sealed,
        "INV-MB-02 violated: sealed flag reverted from true to false"
    );
}
