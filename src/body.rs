//! Test bodies and their single-shot completion handle
//!
//! A body is called once per iteration with a fresh [`Done`]. It finishes
//! the iteration by consuming that handle, either inside the call or later
//! from a timer or spawned task. Consuming `self` is what makes completion
//! single-shot.

use crate::error::{BodyError, BoxError};
use std::future::Future;
use tokio::sync::oneshot;

/// Outcome of one invocation of a test body
pub type BodyResult = std::result::Result<(), BodyError>;

/// Completion handle handed to a test body for one invocation
#[derive(Debug)]
#[must_use = "a test body must complete its Done handle"]
pub struct Done {
    tx: oneshot::Sender<BodyResult>,
}

/// Receiving side of a [`Done`], held by the runner
#[derive(Debug)]
pub(crate) struct Completion {
    rx: oneshot::Receiver<BodyResult>,
}

impl Done {
    pub(crate) fn channel() -> (Done, Completion) {
        let (tx, rx) = oneshot::channel();
        (Done { tx }, Completion { rx })
    }

    /// Signal that the invocation finished successfully
    pub fn complete(self) {
        self.finish(Ok(()));
    }

    /// Signal that the invocation failed; this aborts the whole run
    pub fn fail(self, err: impl Into<BoxError>) {
        self.finish(Err(BodyError::failed(err)));
    }

    /// Signal completion with an explicit outcome
    pub fn finish(self, result: BodyResult) {
        // The receiver only disappears once the runner has given up on this
        // invocation, so there is nobody left to tell.
        let _ = self.tx.send(result);
    }
}

impl Completion {
    /// Outcome if the body already completed during its call
    pub(crate) fn try_take(&mut self) -> Option<BodyResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(BodyError::Abandoned)),
        }
    }

    /// Wait for a body that completes after its call returned
    pub(crate) async fn wait(self) -> BodyResult {
        self.rx.await.unwrap_or(Err(BodyError::Abandoned))
    }
}

/// A unit of work benchmarked by the harness
pub trait TestBody {
    /// Start one invocation; `done` must eventually be completed
    fn call(&mut self, done: Done);
}

impl<F> TestBody for F
where
    F: FnMut(Done),
{
    fn call(&mut self, done: Done) {
        self(done)
    }
}

/// Adapter running a future-returning closure as a [`TestBody`]
///
/// Each invocation spawns the future on the current tokio runtime and
/// completes the handle with its output.
pub struct AsyncBody<F> {
    factory: F,
}

impl<F> AsyncBody<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }
}

impl<F, Fut, E> TestBody for AsyncBody<F>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<(), E>> + Send + 'static,
    E: Into<BoxError> + 'static,
{
    fn call(&mut self, done: Done) {
        let fut = (self.factory)();
        tokio::spawn(async move {
            match fut.await {
                Ok(()) => done.complete(),
                Err(e) => done.fail(e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synchronous_completion_is_visible_immediately() {
        let (done, mut completion) = Done::channel();
        done.complete();
        assert!(matches!(completion.try_take(), Some(Ok(()))));
    }

    #[test]
    fn test_pending_completion() {
        let (_done, mut completion) = Done::channel();
        assert!(completion.try_take().is_none());
    }

    #[test]
    fn test_dropped_handle_is_abandoned() {
        let (done, mut completion) = Done::channel();
        drop(done);
        assert!(matches!(completion.try_take(), Some(Err(BodyError::Abandoned))));
    }

    #[test]
    fn test_fail_carries_message() {
        let (done, mut completion) = Done::channel();
        done.fail("disk on fire");
        match completion.try_take() {
            Some(Err(BodyError::Failed(e))) => assert_eq!(e.to_string(), "disk on fire"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_async_body_completes_later() {
        let mut body = AsyncBody::new(|| async {
            tokio::task::yield_now().await;
            Ok::<(), std::io::Error>(())
        });
        let (done, mut completion) = Done::channel();
        body.call(done);
        assert!(completion.try_take().is_none());
        assert!(completion.wait().await.is_ok());
    }

    #[tokio::test]
    async fn test_async_body_error() {
        let mut body = AsyncBody::new(|| async {
            Err::<(), _>(std::io::Error::new(std::io::ErrorKind::Other, "nope"))
        });
        let (done, completion) = Done::channel();
        body.call(done);
        assert!(matches!(completion.wait().await, Err(BodyError::Failed(_))));
    }
}
