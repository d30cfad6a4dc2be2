//! Consumer-closure adapter over an [`Output`].

use mailbox_rs::Output;

/// A `FnMut(T) -> bool` wrapper around an [`Output`]: feeding it a value
/// calls `Output::send` once and reports whether the caller should keep
/// going (`false` means every target is sealed, so further calls would be
/// wasted work).
pub struct ToOutput<T> {
    output: Output<T>,
}

/// Wraps `output` as a consumer: `consumer.feed(value)` sends `value` and
/// returns `true` while at least one target is still live.
pub fn to_output<T: Send + 'static>(output: Output<T>) -> ToOutput<T> {
    ToOutput { output }
}

impl<T: Send + 'static> ToOutput<T> {
    /// Sends one value. Returns `false` once every target mailbox is sealed.
    pub fn feed(&mut self, value: T) -> bool {
        self.output.send(value)
    }

    /// Feeds every item from `iter` until one is rejected or `iter` is
    /// exhausted. Returns the number of items actually sent.
    pub fn feed_all<I>(&mut self, iter: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let mut sent = 0;
        for value in iter {
            if !self.feed(value) {
                break;
            }
            sent += 1;
        }
        sent
    }
}
