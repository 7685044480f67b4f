//! Teardown sequence.

use crate::error::PipelineResult;
use log::info;

impl super::service::LustrePipelineService {
    /// Delete the stack and everything it owns, including the filesystem and
    /// its association. One-shot by design: the auto-export policy is expected
    /// to have propagated any artifacts to S3 before this is called, and the
    /// deletion itself is left to run to completion unobserved.
    pub async fn teardown(&self) -> PipelineResult<()> {
        info!("deleting stack '{}'", self.config.stack_name);
        self.cfn.delete_stack(&self.config.stack_name).await?;
        Ok(())
    }
}
