//! Training sequence: source packaging, upload, job submission, completion
//! wait.

use crate::aws::sagemaker::TrainingJobStatusSource;
use crate::bundle::bundle_source_dir;
use crate::error::PipelineResult;
use crate::types::{ProvisionResult, TrainingOutcome};
use crate::waiter::ReadinessWaiter;
use log::info;

const TRAINING_JOB_COMPLETED: &str = "Completed";

impl super::service::LustrePipelineService {
    /// Package the entry point, submit the training job against the Lustre
    /// mount, and block until the job completes on its own infrastructure.
    pub async fn train(&self, provision: &ProvisionResult) -> PipelineResult<TrainingOutcome> {
        let config = &self.config;

        let archive = bundle_source_dir(&config.source_dir)?;
        let source_key = format!(
            "{}/source/sourcedir.tar.gz",
            config.s3_prefix.trim_matches('/')
        );
        let source_archive_uri = self
            .s3
            .upload_source_archive(archive, &config.s3_bucket, &source_key)
            .await?;
        info!("uploaded source archive to {source_archive_uri}");

        let job_name = training_job_name(&config.job_name_prefix);
        info!("submitting training job '{job_name}'");
        self.sagemaker
            .submit_training_job(config, provision, &source_archive_uri, &job_name)
            .await?;

        let job_waiter = ReadinessWaiter::new(
            format!("training job '{job_name}'"),
            "InProgress",
            TRAINING_JOB_COMPLETED,
            config.poll_interval,
        );
        let mut job_status = TrainingJobStatusSource::new(&self.sagemaker, job_name.clone());
        job_waiter.wait_until_ready(&mut job_status).await?;

        Ok(TrainingOutcome {
            job_name,
            status: TRAINING_JOB_COMPLETED.to_string(),
        })
    }
}

/// Training job names must be unique per account; suffix with a UTC timestamp.
fn training_job_name(prefix: &str) -> String {
    format!(
        "{}-{}",
        prefix,
        chrono::Utc::now().format("%Y-%m-%d-%H-%M-%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_job_name_keeps_prefix() {
        let name = training_job_name("fsx-lustre-train");
        assert!(name.starts_with("fsx-lustre-train-"), "name was: {name}");
    }

    #[test]
    fn test_training_job_name_uses_valid_characters() {
        // SageMaker accepts [A-Za-z0-9-] up to 63 characters.
        let name = training_job_name("demo");
        assert!(name.len() <= 63);
        assert!(name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }
}
