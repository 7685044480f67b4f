//! AWS SDK integration: CloudFormation, FSx, SageMaker, and S3 client wrappers.

pub mod cloudformation;
pub mod fsx;
pub mod s3;
pub mod sagemaker;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("AWS configuration error: {0}")]
    ConfigError(String),
    #[error("CloudFormation error: {0}")]
    CloudFormationError(String),
    #[error("FSx error: {0}")]
    FsxError(String),
    #[error("SageMaker error: {0}")]
    SageMakerError(String),
    #[error("S3 error: {0}")]
    S3Error(String),
}

pub type AwsResult<T> = Result<T, AwsError>;
