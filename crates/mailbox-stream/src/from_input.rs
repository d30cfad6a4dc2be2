//! `Iterator` adapter over an [`Input`].

use mailbox_rs::Input;

/// Turns an [`Input`] into a plain `Iterator`, so a mailbox can be driven
/// with `for`, `.collect()`, or any other iterator combinator.
///
/// `next()` calls `Input::recv` once per item and yields `None` forever after
/// the first `None` it observes — the mailbox itself decides when that is
/// (sealed and drained), this adapter just forwards it.
pub struct FromInput<T> {
    input: Input<T>,
}

/// Wraps `input` as an `Iterator<Item = T>`.
pub fn from_input<T: Send + 'static>(input: Input<T>) -> FromInput<T> {
    FromInput { input }
}

impl<T: Send + 'static> Iterator for FromInput<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.input.recv()
    }
}
