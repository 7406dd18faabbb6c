//! Cancellable futures
//!
//! Wraps a host future (a timer, in practice) so an interrupt can end it
//! early. The interrupt side holds the sender in the editor state.

use super::{IoError, IoResult};
use futures::FutureExt;
use futures::channel::oneshot;
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

pin_project! {
    /// Resolves with the inner output, or with the error sent on `cancel`
    /// if that arrives first.
    pub struct Cancellable<F> {
        #[pin]
        inner: F,
        cancel: oneshot::Receiver<IoError>,
    }
}

impl<F> Cancellable<F> {
    pub fn new(inner: F, cancel: oneshot::Receiver<IoError>) -> Self {
        Self { inner, cancel }
    }
}

impl<F: Future> Future for Cancellable<F> {
    type Output = IoResult<F::Output>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        // A dropped sender just means nobody can cancel any more
        if let Poll::Ready(Ok(err)) = this.cancel.poll_unpin(cx) {
            return Poll::Ready(Err(err));
        }

        this.inner.poll(cx).map(Ok)
    }
}
