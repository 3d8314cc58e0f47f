//! Ordered multi-step writes with per-step compensation.
//!
//! # Design
//! - Steps share a mutable context so later steps can use ids created earlier.
//! - On the first failure, completed steps are compensated in reverse order.
//! - Compensation failures are collected, never raised over the original error.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::errors::ApiError;

/// One step of a [`Saga`].
#[async_trait(?Send)]
pub trait SagaStep<C> {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Perform the step.
    async fn run(&self, ctx: &mut C) -> Result<(), ApiError>;

    /// Undo the step after a later step failed. Defaults to a no-op.
    async fn compensate(&self, _ctx: &mut C) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Failure of a saga step, with the outcome of its rollback.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("step '{step}' failed: {source}")]
pub struct SagaError {
    /// Step that failed.
    pub step: &'static str,
    /// Error raised by the step.
    pub source: ApiError,
    /// Steps whose compensation also failed.
    pub compensation_failures: Vec<(&'static str, ApiError)>,
}

impl SagaError {
    /// Whether every completed step was rolled back.
    #[must_use]
    pub fn fully_compensated(&self) -> bool {
        self.compensation_failures.is_empty()
    }
}

/// Ordered list of steps.
pub struct Saga<C> {
    name: &'static str,
    steps: Vec<Box<dyn SagaStep<C>>>,
}

impl<C> Saga<C> {
    /// Empty saga.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
        }
    }

    /// Append a step.
    #[must_use]
    pub fn step(mut self, step: impl SagaStep<C> + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the saga has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order, compensating on the first failure.
    ///
    /// # Errors
    ///
    /// Returns [`SagaError`] naming the failed step.
    pub async fn execute(&self, ctx: &mut C) -> Result<(), SagaError> {
        for (index, step) in self.steps.iter().enumerate() {
            if let Err(source) = step.run(ctx).await {
                warn!(saga = self.name, step = step.name(), error = %source, "saga step failed");
                let mut compensation_failures = Vec::new();
                for done in self.steps[..index].iter().rev() {
                    if let Err(err) = done.compensate(ctx).await {
                        warn!(saga = self.name, step = done.name(), error = %err, "compensation failed");
                        compensation_failures.push((done.name(), err));
                    }
                }
                return Err(SagaError {
                    step: step.name(),
                    source,
                    compensation_failures,
                });
            }
        }
        info!(saga = self.name, steps = self.steps.len(), "saga completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::RequestError;

    #[derive(Default)]
    struct Log {
        events: Vec<String>,
    }

    struct Recorded {
        name: &'static str,
        fail_run: bool,
        fail_compensate: bool,
    }

    impl Recorded {
        const fn ok(name: &'static str) -> Self {
            Self {
                name,
                fail_run: false,
                fail_compensate: false,
            }
        }
    }

    fn boom() -> ApiError {
        ApiError::from(RequestError::Network("boom".into()))
    }

    #[async_trait(?Send)]
    impl SagaStep<Log> for Recorded {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn run(&self, ctx: &mut Log) -> Result<(), ApiError> {
            ctx.events.push(format!("run:{}", self.name));
            if self.fail_run { Err(boom()) } else { Ok(()) }
        }

        async fn compensate(&self, ctx: &mut Log) -> Result<(), ApiError> {
            ctx.events.push(format!("undo:{}", self.name));
            if self.fail_compensate { Err(boom()) } else { Ok(()) }
        }
    }

    #[tokio::test]
    async fn all_steps_run_in_order() {
        let saga = Saga::new("test").step(Recorded::ok("a")).step(Recorded::ok("b"));
        let mut log = Log::default();
        saga.execute(&mut log).await.expect("ok");
        assert_eq!(log.events, vec!["run:a", "run:b"]);
        assert_eq!(saga.len(), 2);
    }

    #[tokio::test]
    async fn failure_compensates_completed_steps_in_reverse() {
        let saga = Saga::new("test")
            .step(Recorded::ok("create"))
            .step(Recorded::ok("upload"))
            .step(Recorded {
                name: "attach",
                fail_run: true,
                fail_compensate: false,
            })
            .step(Recorded::ok("never"));
        let mut log = Log::default();
        let err = saga.execute(&mut log).await.expect_err("fails");
        assert_eq!(err.step, "attach");
        assert!(err.fully_compensated());
        assert_eq!(
            log.events,
            vec!["run:create", "run:upload", "run:attach", "undo:upload", "undo:create"]
        );
    }

    #[tokio::test]
    async fn compensation_failures_are_collected() {
        let saga = Saga::new("test")
            .step(Recorded {
                name: "create",
                fail_run: false,
                fail_compensate: true,
            })
            .step(Recorded {
                name: "upload",
                fail_run: true,
                fail_compensate: false,
            });
        let mut log = Log::default();
        let err = saga.execute(&mut log).await.expect_err("fails");
        assert_eq!(err.step, "upload");
        assert_eq!(err.compensation_failures.len(), 1);
        assert_eq!(err.compensation_failures[0].0, "create");
        assert_eq!(err.to_string(), "step 'upload' failed: Network or server error");
    }
}
