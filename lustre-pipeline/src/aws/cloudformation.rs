//! CloudFormation stack wrapper: creation, named-output parsing, status
//! probing for the readiness waiter, deletion.

use crate::aws::{AwsError, AwsResult};
use crate::types::StackOutputs;
use crate::waiter::StatusSource;
use async_trait::async_trait;
use aws_sdk_cloudformation::types::{Output, Parameter, Stack};
use aws_sdk_cloudformation::Client;

const OUTPUT_SECURITY_GROUP_ID: &str = "SecurityGroupId";
const OUTPUT_PRIVATE_SUBNET_ID: &str = "PrivateSubnetId";
const OUTPUT_FILE_SYSTEM_ID: &str = "FileSystemId";

pub struct CfnStackClient {
    client: Client,
}

impl CfnStackClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Request stack creation. Returns once the request is accepted; readiness
    /// is observed separately through [`StackStatusSource`].
    pub async fn create_stack(
        &self,
        stack_name: &str,
        template_body: &str,
        parameters: &[(String, String)],
    ) -> AwsResult<()> {
        let parameters: Vec<Parameter> = parameters
            .iter()
            .map(|(key, value)| {
                Parameter::builder()
                    .parameter_key(key)
                    .parameter_value(value)
                    .build()
            })
            .collect();

        self.client
            .create_stack()
            .stack_name(stack_name)
            .template_body(template_body)
            .set_parameters(Some(parameters))
            .send()
            .await
            .map_err(|e| {
                AwsError::CloudFormationError(format!(
                    "Failed to create stack '{stack_name}': {e}"
                ))
            })?;
        Ok(())
    }

    /// Current status of the stack, e.g. `CREATE_IN_PROGRESS`.
    pub async fn stack_status(&self, stack_name: &str) -> AwsResult<String> {
        let stack = self.describe_stack(stack_name).await?;
        let status = stack.stack_status().ok_or_else(|| {
            AwsError::CloudFormationError(format!("Stack '{stack_name}' reported no status"))
        })?;
        Ok(status.as_str().to_string())
    }

    /// Fetch the stack's named outputs and parse the identifiers the pipeline
    /// needs out of them.
    pub async fn stack_outputs(&self, stack_name: &str) -> AwsResult<StackOutputs> {
        let stack = self.describe_stack(stack_name).await?;
        parse_stack_outputs(stack_name, stack.outputs())
    }

    /// One-shot teardown. Resources created inside the stack, including the
    /// filesystem and its association, go down with it.
    pub async fn delete_stack(&self, stack_name: &str) -> AwsResult<()> {
        self.client
            .delete_stack()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|e| {
                AwsError::CloudFormationError(format!(
                    "Failed to delete stack '{stack_name}': {e}"
                ))
            })?;
        Ok(())
    }

    async fn describe_stack(&self, stack_name: &str) -> AwsResult<Stack> {
        let response = self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|e| {
                AwsError::CloudFormationError(format!(
                    "Failed to describe stack '{stack_name}': {e}"
                ))
            })?;

        response
            .stacks()
            .first()
            .cloned()
            .ok_or_else(|| AwsError::CloudFormationError(format!("Stack '{stack_name}' not found")))
    }
}

/// Extract the pipeline identifiers from the stack's output list by key name.
fn parse_stack_outputs(stack_name: &str, outputs: &[Output]) -> AwsResult<StackOutputs> {
    let lookup = |key: &str| -> AwsResult<String> {
        outputs
            .iter()
            .find(|output| output.output_key() == Some(key))
            .and_then(|output| output.output_value())
            .map(ToString::to_string)
            .ok_or_else(|| {
                AwsError::CloudFormationError(format!(
                    "Stack '{stack_name}' has no output named '{key}'"
                ))
            })
    };

    Ok(StackOutputs {
        security_group_id: lookup(OUTPUT_SECURITY_GROUP_ID)?,
        private_subnet_id: lookup(OUTPUT_PRIVATE_SUBNET_ID)?,
        file_system_id: lookup(OUTPUT_FILE_SYSTEM_ID)?,
    })
}

/// Status probe for stack creation.
pub struct StackStatusSource<'a> {
    client: &'a CfnStackClient,
    stack_name: String,
}

impl<'a> StackStatusSource<'a> {
    pub fn new(client: &'a CfnStackClient, stack_name: impl Into<String>) -> Self {
        Self {
            client,
            stack_name: stack_name.into(),
        }
    }
}

#[async_trait]
impl StatusSource for StackStatusSource<'_> {
    async fn current_status(&mut self) -> AwsResult<String> {
        self.client.stack_status(&self.stack_name).await
    }
}
