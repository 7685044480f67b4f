//! Explicit pipeline configuration.
//!
//! Every external call is driven by this struct rather than by ambient
//! environment variables; the CLI layer is the only place that consults the
//! environment (via clap `env` fallbacks), which keeps the dependency on it
//! auditable. Credentials still come from the SDK's default provider chain.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::waiter::DEFAULT_POLL_INTERVAL;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Region override; `None` defers to the SDK provider chain.
    pub region: Option<String>,
    /// Availability zone the subnet and filesystem are placed in.
    pub availability_zone: String,
    /// Name of the CloudFormation stack owning the VPC and the filesystem.
    pub stack_name: String,
    /// Opaque CloudFormation template body.
    pub template_body: String,
    /// Bucket backing the data repository association.
    pub s3_bucket: String,
    /// Key prefix under the bucket for training data and artifacts.
    pub s3_prefix: String,
    /// In-filesystem path the association exports, e.g. `/fsx`.
    pub file_system_path: String,
    /// Training entry-point script, relative to the source directory.
    pub entry_point: String,
    /// Local directory packaged and uploaded for script mode.
    pub source_dir: std::path::PathBuf,
    /// Container image the training job runs in.
    pub training_image: String,
    /// Execution role assumed by the training job.
    pub role_arn: String,
    pub instance_type: String,
    pub instance_count: i32,
    pub volume_size_gb: i32,
    /// Free-form options handed to the entry point.
    pub hyperparameters: BTreeMap<String, String>,
    /// Maximum automatic retries for the training job.
    pub max_retry_attempts: i32,
    pub max_runtime_secs: i32,
    pub job_name_prefix: String,
    pub poll_interval: Duration,
}

impl PipelineConfig {
    /// `s3://bucket/prefix` location the filesystem mirrors.
    pub fn data_repository_path(&self) -> String {
        format!("s3://{}/{}", self.s3_bucket, self.s3_prefix.trim_matches('/'))
    }

    /// S3 destination for a pipeline artifact under the shared prefix.
    pub fn artifact_uri(&self, suffix: &str) -> String {
        format!("{}/{}", self.data_repository_path(), suffix.trim_start_matches('/'))
    }

    pub fn poll_interval_or_default(interval_secs: Option<u64>) -> Duration {
        interval_secs.map_or(DEFAULT_POLL_INTERVAL, Duration::from_secs)
    }
}
