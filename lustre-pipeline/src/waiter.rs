//! Fixed-interval readiness polling.
//!
//! A monitored resource starts in a single designated in-progress status and
//! must eventually land on a single designated ready status; any other observed
//! value is treated as a terminal provisioning failure and surfaced immediately.
//! There is no iteration cap and no timeout, which suits an interactively
//! supervised run: a stuck wait is aborted by interrupting the process.

use crate::aws::AwsResult;
use crate::error::{PipelineError, PipelineResult};
use async_trait::async_trait;
use log::info;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);

/// A status probe for one external resource.
///
/// Errors from the probe itself (throttling, network, missing resource)
/// propagate out of the wait unchanged.
#[async_trait]
pub trait StatusSource {
    async fn current_status(&mut self) -> AwsResult<String>;
}

/// Polls a [`StatusSource`] until it reports the ready status.
pub struct ReadinessWaiter {
    resource: String,
    in_progress: String,
    ready: String,
    poll_interval: Duration,
}

impl ReadinessWaiter {
    pub fn new(
        resource: impl Into<String>,
        in_progress: impl Into<String>,
        ready: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            resource: resource.into(),
            in_progress: in_progress.into(),
            ready: ready.into(),
            poll_interval,
        }
    }

    /// Block until the source reports the ready status.
    ///
    /// Each iteration has exactly three possible outcomes: the in-progress
    /// status sleeps and repeats, the ready status returns, and anything else
    /// fails with [`PipelineError::ProvisioningFailure`] carrying the observed
    /// status. Fail-fast by policy: no retries, no backoff.
    pub async fn wait_until_ready<S: StatusSource + Send>(
        &self,
        source: &mut S,
    ) -> PipelineResult<()> {
        loop {
            let status = source.current_status().await?;
            if status == self.ready {
                info!("{} is {}", self.resource, status);
                return Ok(());
            }
            if status != self.in_progress {
                return Err(PipelineError::ProvisioningFailure {
                    resource: self.resource.clone(),
                    status,
                });
            }
            info!(
                "{} is {}, checking again in {}s",
                self.resource,
                status,
                self.poll_interval.as_secs()
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::AwsError;
    use std::collections::VecDeque;

    struct ScriptedSource {
        statuses: VecDeque<AwsResult<String>>,
        polls: usize,
    }

    impl ScriptedSource {
        fn new(statuses: Vec<AwsResult<String>>) -> Self {
            Self {
                statuses: statuses.into(),
                polls: 0,
            }
        }

        fn from_values(values: &[&str]) -> Self {
            Self::new(values.iter().map(|v| Ok((*v).to_string())).collect())
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn current_status(&mut self) -> AwsResult<String> {
            self.polls += 1;
            self.statuses
                .pop_front()
                .unwrap_or_else(|| Err(AwsError::FsxError("script exhausted".to_string())))
        }
    }

    fn waiter() -> ReadinessWaiter {
        ReadinessWaiter::new("association", "CREATING", "AVAILABLE", Duration::ZERO)
    }

    #[tokio::test]
    async fn test_returns_after_in_progress_then_ready() {
        let mut source = ScriptedSource::from_values(&["CREATING", "CREATING", "AVAILABLE"]);
        waiter()
            .wait_until_ready(&mut source)
            .await
            .expect("should become ready");
        assert_eq!(source.polls, 3);
    }

    #[tokio::test]
    async fn test_immediately_ready_polls_once() {
        let mut source = ScriptedSource::from_values(&["AVAILABLE"]);
        waiter()
            .wait_until_ready(&mut source)
            .await
            .expect("should become ready");
        assert_eq!(source.polls, 1);
    }

    #[tokio::test]
    async fn test_unexpected_status_fails_at_first_occurrence() {
        let mut source = ScriptedSource::from_values(&["CREATING", "FAILED", "AVAILABLE"]);
        let err = waiter()
            .wait_until_ready(&mut source)
            .await
            .expect_err("should fail on FAILED");
        match err {
            PipelineError::ProvisioningFailure { status, .. } => assert_eq!(status, "FAILED"),
            other => panic!("unexpected error: {other}"),
        }
        // No further polls after the terminal status.
        assert_eq!(source.polls, 2);
    }

    #[tokio::test]
    async fn test_exact_poll_count_for_in_progress_prefixes() {
        for n in [0usize, 1, 5] {
            let mut values = vec!["CREATING"; n];
            values.push("AVAILABLE");
            let mut source = ScriptedSource::from_values(&values);
            waiter()
                .wait_until_ready(&mut source)
                .await
                .expect("should become ready");
            assert_eq!(source.polls, n + 1);
        }
    }

    #[tokio::test]
    async fn test_probe_error_propagates_unchanged() {
        let mut source = ScriptedSource::new(vec![Err(AwsError::FsxError(
            "no association found".to_string(),
        ))]);
        let err = waiter()
            .wait_until_ready(&mut source)
            .await
            .expect_err("probe error should propagate");
        assert!(matches!(err, PipelineError::Aws(AwsError::FsxError(_))));
        assert_eq!(source.polls, 1);
    }

    #[tokio::test]
    async fn test_never_ready_sequence_keeps_polling() {
        // Bounded stand-in for the unbounded wait: the script stays in-progress
        // for many polls and only then reports ready.
        let mut values = vec!["CREATING"; 50];
        values.push("AVAILABLE");
        let mut source = ScriptedSource::from_values(&values);
        waiter()
            .wait_until_ready(&mut source)
            .await
            .expect("should eventually become ready");
        assert_eq!(source.polls, 51);
    }
}
