//! Provisioning sequence: stack creation, output extraction, data repository
//! association, readiness wait.

use crate::aws::cloudformation::StackStatusSource;
use crate::aws::fsx::AssociationStatusSource;
use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::types::ProvisionResult;
use crate::waiter::ReadinessWaiter;
use log::info;

const PARAM_AVAILABILITY_ZONE: &str = "AvailabilityZone";

impl super::service::LustrePipelineService {
    /// Bring up the networking stack and the filesystem, then link the
    /// filesystem to the S3 data repository and wait for the association to
    /// become available.
    ///
    /// Strictly sequential with no cleanup on failure: a failed run leaves
    /// whatever was created behind for the operator to inspect and tear down.
    pub async fn provision(&self) -> PipelineResult<ProvisionResult> {
        let config = &self.config;

        info!("creating stack '{}'", config.stack_name);
        self.cfn
            .create_stack(
                &config.stack_name,
                &config.template_body,
                &stack_parameters(config),
            )
            .await?;

        let stack_waiter = ReadinessWaiter::new(
            format!("stack '{}'", config.stack_name),
            "CREATE_IN_PROGRESS",
            "CREATE_COMPLETE",
            config.poll_interval,
        );
        let mut stack_status = StackStatusSource::new(&self.cfn, config.stack_name.clone());
        stack_waiter.wait_until_ready(&mut stack_status).await?;

        let stack_outputs = self.cfn.stack_outputs(&config.stack_name).await?;
        info!(
            "stack ready: filesystem {}, subnet {}, security group {}",
            stack_outputs.file_system_id,
            stack_outputs.private_subnet_id,
            stack_outputs.security_group_id
        );

        let mount_name = self.fsx.mount_name(&stack_outputs.file_system_id).await?;

        let association_id = self
            .fsx
            .create_association(
                &stack_outputs.file_system_id,
                &config.file_system_path,
                &config.data_repository_path(),
            )
            .await?;
        info!(
            "linking '{}' on {} to {}",
            config.file_system_path,
            stack_outputs.file_system_id,
            config.data_repository_path()
        );

        let association_waiter = ReadinessWaiter::new(
            format!("data repository association '{association_id}'"),
            "CREATING",
            "AVAILABLE",
            config.poll_interval,
        );
        let mut association_status =
            AssociationStatusSource::new(&self.fsx, stack_outputs.file_system_id.clone());
        association_waiter
            .wait_until_ready(&mut association_status)
            .await?;

        Ok(ProvisionResult {
            stack_outputs,
            mount_name,
            association_id,
        })
    }
}

fn stack_parameters(config: &PipelineConfig) -> Vec<(String, String)> {
    vec![(
        PARAM_AVAILABILITY_ZONE.to_string(),
        config.availability_zone.clone(),
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::Duration;

    #[test]
    fn test_stack_parameters_carry_availability_zone() {
        let config = PipelineConfig {
            region: None,
            availability_zone: "eu-west-1a".to_string(),
            stack_name: "demo".to_string(),
            template_body: String::new(),
            s3_bucket: "bucket".to_string(),
            s3_prefix: "prefix".to_string(),
            file_system_path: "/fsx".to_string(),
            entry_point: "train.py".to_string(),
            source_dir: "src".into(),
            training_image: String::new(),
            role_arn: String::new(),
            instance_type: "ml.m5.xlarge".to_string(),
            instance_count: 1,
            volume_size_gb: 50,
            hyperparameters: BTreeMap::new(),
            max_retry_attempts: 1,
            max_runtime_secs: 3600,
            job_name_prefix: "demo".to_string(),
            poll_interval: Duration::ZERO,
        };
        let parameters = stack_parameters(&config);
        assert_eq!(
            parameters,
            vec![("AvailabilityZone".to_string(), "eu-west-1a".to_string())]
        );
    }
}
