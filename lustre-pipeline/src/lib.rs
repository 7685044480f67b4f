//! This crate provides the core logic for the FSx-for-Lustre training pipeline:
//! - CloudFormation stack lifecycle (networking + filesystem)
//! - S3 data repository association and readiness polling
//! - SageMaker training job submission against the Lustre mount
//!

mod aws;
mod bundle;
mod config;
mod error;
pub mod pipeline;
mod types;
pub mod waiter;

// Re-exports for a small, focused public API
pub use aws::cloudformation::CfnStackClient;
pub use aws::fsx::FsxClient;
pub use aws::sagemaker::SageMakerClient;
pub use aws::{AwsError, AwsResult};
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::LustrePipelineService;
pub use types::{ProvisionResult, StackOutputs, TrainingOutcome};
pub use waiter::{ReadinessWaiter, StatusSource};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provision_result_round_trips_through_json() {
        let result = ProvisionResult {
            stack_outputs: StackOutputs {
                security_group_id: "sg-0123456789abcdef0".to_string(),
                private_subnet_id: "subnet-0123456789abcdef0".to_string(),
                file_system_id: "fs-0123456789abcdef0".to_string(),
            },
            mount_name: "fsx".to_string(),
            association_id: "dra-0123456789abcdef0".to_string(),
        };
        let json = serde_json::to_string(&result).expect("should serialize");
        let parsed: ProvisionResult = serde_json::from_str(&json).expect("should parse");
        assert_eq!(parsed.mount_name, "fsx");
        assert_eq!(parsed.stack_outputs.file_system_id, "fs-0123456789abcdef0");
    }
}
