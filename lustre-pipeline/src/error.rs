//! Crate-level error taxonomy.
//!
//! The only domain-owned failure is `ProvisioningFailure`, raised by the
//! readiness waiter when a monitored resource lands on an unexpected terminal
//! status. Everything the AWS SDK raises propagates through `Aws` untranslated
//! beyond a contextual message, and aborts the run.

use crate::aws::AwsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{resource} reached unexpected status '{status}' while waiting for readiness")]
    ProvisioningFailure { resource: String, status: String },
    #[error(transparent)]
    Aws(#[from] AwsError),
    #[error("failed to package source directory: {0}")]
    Bundle(#[from] std::io::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
