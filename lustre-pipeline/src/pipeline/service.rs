//! Lustre Pipeline Service Layer
//!
//! This module provides the main service interface that encapsulates the
//! pipeline's business logic. The service holds the AWS clients and provides
//! the high-level operations (provision, train, teardown) the CLI drives.

use crate::aws::cloudformation::CfnStackClient;
use crate::aws::fsx::FsxClient;
use crate::aws::s3::S3Client;
use crate::aws::sagemaker::SageMakerClient;
use crate::config::PipelineConfig;
use crate::error::PipelineResult;

/// Main service struct that holds AWS clients and the pipeline configuration
pub struct LustrePipelineService {
    pub(crate) cfn: CfnStackClient,
    pub(crate) fsx: FsxClient,
    pub(crate) sagemaker: SageMakerClient,
    pub(crate) s3: S3Client,
    pub(crate) config: PipelineConfig,
}

impl LustrePipelineService {
    /// Create a new service instance with AWS clients.
    ///
    /// Credentials come from the standard provider chain; the region is taken
    /// from the configuration when set there, so that the only ambient input
    /// left is the credential material itself.
    pub async fn new(config: PipelineConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = config.region.clone() {
            loader = loader.region(aws_config::Region::new(region));
        }
        let shared = loader.load().await;

        Self {
            cfn: CfnStackClient::new(aws_sdk_cloudformation::Client::new(&shared)),
            fsx: FsxClient::new(aws_sdk_fsx::Client::new(&shared)),
            sagemaker: SageMakerClient::new(aws_sdk_sagemaker::Client::new(&shared)),
            s3: S3Client::new(aws_sdk_s3::Client::new(&shared)),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// One-shot association status lookup for interactive inspection.
    pub async fn association_status(&self, file_system_id: &str) -> PipelineResult<String> {
        Ok(self.fsx.association_status(file_system_id).await?)
    }

    // provision() method implementation is in provision.rs
    // train() method implementation is in train.rs
    // teardown() method implementation is in teardown.rs
}
