//! SageMaker wrapper: training job submission against the Lustre mount and
//! the completion probe consumed by the waiter.

use std::collections::BTreeMap;

use crate::aws::{AwsError, AwsResult};
use crate::config::PipelineConfig;
use crate::types::ProvisionResult;
use crate::waiter::StatusSource;
use async_trait::async_trait;
use aws_sdk_sagemaker::types::{
    AlgorithmSpecification, Channel, CheckpointConfig, DataSource, FileSystemAccessMode,
    FileSystemDataSource, FileSystemType, OutputDataConfig, ResourceConfig, RetryStrategy,
    StoppingCondition, TrainingInputMode, TrainingInstanceType, VpcConfig,
};
use aws_sdk_sagemaker::Client;

const TRAIN_CHANNEL_NAME: &str = "train";
const CONTAINER_CHECKPOINT_PATH: &str = "/opt/ml/checkpoints";

// Script-mode keys the SageMaker training toolkit reads from the
// hyperparameter map. Values are JSON-encoded strings.
const HP_PROGRAM: &str = "sagemaker_program";
const HP_SUBMIT_DIRECTORY: &str = "sagemaker_submit_directory";

pub struct SageMakerClient {
    client: Client,
}

impl SageMakerClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Submit one training job reading and writing through the Lustre mount.
    ///
    /// The `train` channel is bound to the filesystem rather than an S3 path;
    /// artifacts written under the mount reach S3 through the association's
    /// auto-export policy. Returns once the job is accepted; completion is
    /// observed separately through [`TrainingJobStatusSource`].
    pub async fn submit_training_job(
        &self,
        config: &PipelineConfig,
        provision: &ProvisionResult,
        source_archive_uri: &str,
        job_name: &str,
    ) -> AwsResult<()> {
        let algorithm = AlgorithmSpecification::builder()
            .training_image(&config.training_image)
            .training_input_mode(TrainingInputMode::File)
            .build();

        let lustre_source = FileSystemDataSource::builder()
            .file_system_id(&provision.stack_outputs.file_system_id)
            .file_system_type(FileSystemType::Fsxlustre)
            .file_system_access_mode(FileSystemAccessMode::Rw)
            .directory_path(lustre_directory_path(
                &provision.mount_name,
                &config.file_system_path,
            ))
            .build();
        let train_channel = Channel::builder()
            .channel_name(TRAIN_CHANNEL_NAME)
            .data_source(
                DataSource::builder()
                    .file_system_data_source(lustre_source)
                    .build(),
            )
            .build();

        let resources = ResourceConfig::builder()
            .instance_type(TrainingInstanceType::from(config.instance_type.as_str()))
            .instance_count(config.instance_count)
            .volume_size_in_gb(config.volume_size_gb)
            .build();

        let vpc = VpcConfig::builder()
            .security_group_ids(&provision.stack_outputs.security_group_id)
            .subnets(&provision.stack_outputs.private_subnet_id)
            .build();

        let output = OutputDataConfig::builder()
            .s3_output_path(config.artifact_uri("output"))
            .build();

        let checkpoints = CheckpointConfig::builder()
            .s3_uri(config.artifact_uri("checkpoints"))
            .local_path(CONTAINER_CHECKPOINT_PATH)
            .build();

        let retry = RetryStrategy::builder()
            .maximum_retry_attempts(config.max_retry_attempts)
            .build();

        let stopping = StoppingCondition::builder()
            .max_runtime_in_seconds(config.max_runtime_secs)
            .build();

        let hyperparameters = script_mode_hyperparameters(
            &config.entry_point,
            source_archive_uri,
            &config.hyperparameters,
        );

        let mut request = self
            .client
            .create_training_job()
            .training_job_name(job_name)
            .role_arn(&config.role_arn)
            .algorithm_specification(algorithm)
            .input_data_config(train_channel)
            .output_data_config(output)
            .checkpoint_config(checkpoints)
            .resource_config(resources)
            .vpc_config(vpc)
            .stopping_condition(stopping)
            .retry_strategy(retry);
        for (key, value) in hyperparameters {
            request = request.hyper_parameters(key, value);
        }

        request.send().await.map_err(|e| {
            AwsError::SageMakerError(format!("Failed to submit training job '{job_name}': {e}"))
        })?;
        Ok(())
    }

    /// Current status of the training job, e.g. `InProgress`.
    pub async fn training_job_status(&self, job_name: &str) -> AwsResult<String> {
        let response = self
            .client
            .describe_training_job()
            .training_job_name(job_name)
            .send()
            .await
            .map_err(|e| {
                AwsError::SageMakerError(format!(
                    "Failed to describe training job '{job_name}': {e}"
                ))
            })?;

        response
            .training_job_status()
            .map(|status| status.as_str().to_string())
            .ok_or_else(|| {
                AwsError::SageMakerError(format!("Training job '{job_name}' reported no status"))
            })
    }
}

/// SageMaker addresses Lustre channels as `/<mount-name>/<path>`.
fn lustre_directory_path(mount_name: &str, file_system_path: &str) -> String {
    let mount = mount_name.trim_matches('/');
    let path = file_system_path.trim_matches('/');
    if path.is_empty() {
        format!("/{mount}")
    } else {
        format!("/{mount}/{path}")
    }
}

/// Merge the script-mode keys with the user's free-form options. The training
/// toolkit expects its own values JSON-encoded; user options pass through
/// verbatim.
fn script_mode_hyperparameters(
    entry_point: &str,
    source_archive_uri: &str,
    user: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut hyperparameters = user.clone();
    hyperparameters.insert(
        HP_PROGRAM.to_string(),
        serde_json::Value::String(entry_point.to_string()).to_string(),
    );
    hyperparameters.insert(
        HP_SUBMIT_DIRECTORY.to_string(),
        serde_json::Value::String(source_archive_uri.to_string()).to_string(),
    );
    hyperparameters
}

/// Status probe for the submitted training job.
pub struct TrainingJobStatusSource<'a> {
    client: &'a SageMakerClient,
    job_name: String,
}

impl<'a> TrainingJobStatusSource<'a> {
    pub fn new(client: &'a SageMakerClient, job_name: impl Into<String>) -> Self {
        Self {
            client,
            job_name: job_name.into(),
        }
    }
}

#[async_trait]
impl StatusSource for TrainingJobStatusSource<'_> {
    async fn current_status(&mut self) -> AwsResult<String> {
        self.client.training_job_status(&self.job_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lustre_directory_path_joins_mount_and_path() {
        assert_eq!(lustre_directory_path("abcdef", "/fsx"), "/abcdef/fsx");
        assert_eq!(lustre_directory_path("/abcdef/", "fsx/"), "/abcdef/fsx");
    }

    #[test]
    fn test_lustre_directory_path_root_export() {
        assert_eq!(lustre_directory_path("abcdef", "/"), "/abcdef");
        assert_eq!(lustre_directory_path("abcdef", ""), "/abcdef");
    }

    #[test]
    fn test_script_mode_hyperparameters_are_json_encoded() {
        let user = BTreeMap::new();
        let hyperparameters =
            script_mode_hyperparameters("train.py", "s3://bucket/source/sourcedir.tar.gz", &user);
        assert_eq!(
            hyperparameters.get("sagemaker_program").map(String::as_str),
            Some("\"train.py\"")
        );
        assert_eq!(
            hyperparameters
                .get("sagemaker_submit_directory")
                .map(String::as_str),
            Some("\"s3://bucket/source/sourcedir.tar.gz\"")
        );
    }

    #[test]
    fn test_user_hyperparameters_pass_through_verbatim() {
        let mut user = BTreeMap::new();
        user.insert("epochs".to_string(), "5".to_string());
        let hyperparameters = script_mode_hyperparameters("train.py", "s3://b/k", &user);
        assert_eq!(hyperparameters.get("epochs").map(String::as_str), Some("5"));
        assert_eq!(hyperparameters.len(), 3);
    }
}
