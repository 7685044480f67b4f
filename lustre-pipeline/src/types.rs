//! Typed results passed between pipeline stages and serialized for the CLI.

use serde::{Deserialize, Serialize};

/// Named outputs of the networking/filesystem stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackOutputs {
    pub security_group_id: String,
    pub private_subnet_id: String,
    pub file_system_id: String,
}

/// Everything the training stage needs from a completed provision run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionResult {
    pub stack_outputs: StackOutputs,
    pub mount_name: String,
    pub association_id: String,
}

/// Terminal state of a submitted training job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingOutcome {
    pub job_name: String,
    pub status: String,
}
