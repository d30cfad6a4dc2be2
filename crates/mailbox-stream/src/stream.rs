//! `futures::Stream`/`Sink` wrappers over [`Input`]/[`Output`], available
//! under the `async` feature so a caller on an executor never parks an OS
//! thread waiting on a mailbox.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use futures_sink::Sink;
use mailbox_rs::{Input, Output, SendPoll};
use pin_project_lite::pin_project;

pin_project! {
    /// A [`Stream`] over an [`Input`]'s values. Ends once the mailbox is
    /// sealed and drained, same as [`crate::from_input::FromInput`].
    pub struct InputStream<T> {
        input: Input<T>,
    }
}

/// Wraps `input` as a `Stream<Item = T>`.
pub fn input_stream<T: Send + 'static>(input: Input<T>) -> InputStream<T> {
    InputStream { input }
}

impl<T: Send + 'static> Stream for InputStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.project().input.poll_recv(cx)
    }
}

pin_project! {
    /// A [`Sink`] over an [`Output`]'s targets. A held item sits in a single
    /// slot between `start_send` and the `poll_ready`/`poll_flush` that
    /// drives it out, matching the usual bounded-buffer `Sink` contract.
    pub struct OutputSink<T> {
        output: Output<T>,
        slot: Option<T>,
    }
}

/// Wraps `output` as a `Sink<T>`. The sink's error type is `()`: the only
/// failure mode is every target having sealed, which is reported as a
/// `poll_ready`/`poll_flush` result of `Ok(())` with the item silently
/// dropped — consistent with `Output::send` reporting loss as `false`
/// rather than as an error.
pub fn output_sink<T: Send + 'static>(output: Output<T>) -> OutputSink<T> {
    OutputSink { output, slot: None }
}

impl<T: Send + 'static> Sink<T> for OutputSink<T> {
    type Error = ();

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), ()>> {
        let mut this = self.project();
        loop {
            match this.slot.take() {
                None => return Poll::Ready(Ok(())),
                Some(item) => match this.output.poll_send(cx, item) {
                    SendPoll::Ready(_) => continue,
                    SendPoll::Pending(item) => {
                        *this.slot = Some(item);
                        return Poll::Pending;
                    }
                },
            }
        }
    }

    fn start_send(self: Pin<&mut Self>, item: T) -> Result<(), ()> {
        let this = self.project();
        debug_assert!(this.slot.is_none(), "start_send called without a prior poll_ready");
        *this.slot = Some(item);
        Ok(())
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), ()>> {
        let mut this = self.project();
        match this.slot.take() {
            None => Poll::Ready(Ok(())),
            Some(item) => match this.output.poll_send(cx, item) {
                SendPoll::Ready(_) => Poll::Ready(Ok(())),
                SendPoll::Pending(item) => {
                    *this.slot = Some(item);
                    Poll::Pending
                }
            },
        }
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), ()>> {
        self.poll_flush(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use mailbox_rs::{spawn, Buffer};

    #[tokio::test]
    async fn stream_yields_values_then_ends() {
        let (output, input, _seal) = spawn(Buffer::unbounded());
        output.send(1);
        output.send(2);
        drop(output);

        let mut stream = input_stream(input);
        assert_eq!(stream.next().await, Some(1));
        assert_eq!(stream.next().await, Some(2));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn sink_feeds_values_through() {
        let (output, input, _seal) = spawn(Buffer::unbounded());
        let mut sink = output_sink(output);
        sink.send(1).await.unwrap();
        sink.send(2).await.unwrap();
        drop(sink);

        assert_eq!(input.recv(), Some(1));
        assert_eq!(input.recv(), Some(2));
        assert_eq!(input.recv(), None);
    }

    #[tokio::test]
    async fn sink_backpressure_blocks_until_drained() {
        let (output, input, _seal) = spawn(Buffer::bounded(1));
        let mut sink = output_sink(output);
        sink.send(1).await.unwrap();

        let send_two = tokio::spawn(async move {
            sink.send(2).await.unwrap();
            sink
        });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!send_two.is_finished());

        assert_eq!(input.recv(), Some(1));
        let _sink = send_two.await.unwrap();
        assert_eq!(input.recv(), Some(2));
    }
}
