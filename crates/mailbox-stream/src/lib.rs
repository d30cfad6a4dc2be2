//! Pipeline adapters over [`mailbox_rs`]'s `Input`/`Output` handles: a plain
//! `Iterator` wrapper for receiving, a consumer-closure wrapper for sending,
//! and — behind the `async` feature — `futures::Stream`/`Sink` counterparts
//! of both, so the same mailbox can be driven from a thread or an async task
//! without the caller needing to know which.
//!
//! ```
//! use mailbox_rs::{spawn, Buffer};
//! use mailbox_stream::{from_input, to_output};
//!
//! let (output, input, _seal) = spawn(Buffer::unbounded());
//! let mut sink = to_output(output);
//! sink.feed(1);
//! sink.feed(2);
//! drop(sink);
//!
//! let received: Vec<i32> = from_input(input).collect();
//! assert_eq!(received, vec![1, 2]);
//! ```

mod from_input;
mod to_output;

#[cfg(feature = "async")]
mod stream;

pub use from_input::{from_input, FromInput};
pub use to_output::{to_output, ToOutput};

#[cfg(feature = "async")]
pub use stream::{input_stream, output_sink, InputStream, OutputSink};
