//! Timed loop runner
//!
//! Calls one test body over and over until the time budget is spent and
//! reports how many invocations completed. The loop is iterative on both the
//! direct and the bouncing path, so stack depth never depends on the
//! iteration count.

use crate::body::{BodyResult, Done, TestBody};
use crate::config::SuiteConfig;
use crate::error::BodyError;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// Drives a single test body for a fixed time budget
#[derive(Debug, Clone, Copy)]
pub struct TimedLoop {
    duration: Duration,
    bounce_every: Option<u64>,
}

impl TimedLoop {
    /// Loop without ever yielding to the scheduler
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            bounce_every: None,
        }
    }

    /// Yield to the scheduler after every `every` completed invocations.
    /// An interval of zero disables yielding.
    pub fn with_bounce(mut self, every: u64) -> Self {
        self.bounce_every = (every > 0).then_some(every);
        self
    }

    pub fn from_config(config: &SuiteConfig) -> Self {
        let runner = Self::new(config.duration());
        if config.bounce {
            runner.with_bounce(config.bounce_every)
        } else {
            runner
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Run `body` until the budget is exceeded and return the number of
    /// completed invocations. The invocation that crosses the budget is not
    /// counted.
    pub async fn run(&self, body: &mut dyn TestBody) -> Result<u64, BodyError> {
        let mut count: u64 = 0;
        let start = Instant::now();

        loop {
            invoke(body).await?;

            if start.elapsed() > self.duration {
                trace!(count, "time budget exhausted");
                return Ok(count);
            }

            count += 1;
            if let Some(every) = self.bounce_every {
                if count % every == 0 {
                    tokio::task::yield_now().await;
                }
            }
        }
    }
}

/// Perform one invocation and wait for its completion signal. Bodies that
/// complete during the call are observed without an await point.
async fn invoke(body: &mut dyn TestBody) -> BodyResult {
    let (done, mut completion) = Done::channel();

    panic::catch_unwind(AssertUnwindSafe(|| body.call(done))).map_err(BodyError::from_panic)?;

    match completion.try_take() {
        Some(result) => result,
        None => completion.wait().await,
    }
}
