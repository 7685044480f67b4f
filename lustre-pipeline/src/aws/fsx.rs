//! FSx wrapper: Lustre mount-name lookup, S3 data repository association
//! creation, and the association lifecycle probe consumed by the waiter.

use crate::aws::{AwsError, AwsResult};
use crate::waiter::StatusSource;
use async_trait::async_trait;
use aws_sdk_fsx::types::{
    AutoExportPolicy, EventType, Filter, FilterName, S3DataRepositoryConfiguration,
};
use aws_sdk_fsx::Client;

pub struct FsxClient {
    client: Client,
}

impl FsxClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The internal mount name SageMaker needs to address the Lustre
    /// filesystem, e.g. the `abcdef` in `/abcdef/fsx`.
    pub async fn mount_name(&self, file_system_id: &str) -> AwsResult<String> {
        let response = self
            .client
            .describe_file_systems()
            .file_system_ids(file_system_id)
            .send()
            .await
            .map_err(|e| {
                AwsError::FsxError(format!(
                    "Failed to describe filesystem '{file_system_id}': {e}"
                ))
            })?;

        response
            .file_systems()
            .first()
            .and_then(|fs| fs.lustre_configuration())
            .and_then(|lustre| lustre.mount_name())
            .map(ToString::to_string)
            .ok_or_else(|| {
                AwsError::FsxError(format!(
                    "Filesystem '{file_system_id}' reported no Lustre mount name"
                ))
            })
    }

    /// Link the filesystem path to the S3 data repository. Changed files are
    /// exported back to S3 on creation, modification, and deletion, and the
    /// existing S3 objects are imported as metadata up front.
    pub async fn create_association(
        &self,
        file_system_id: &str,
        file_system_path: &str,
        data_repository_path: &str,
    ) -> AwsResult<String> {
        let auto_export = AutoExportPolicy::builder()
            .events(EventType::New)
            .events(EventType::Changed)
            .events(EventType::Deleted)
            .build();
        let s3_config = S3DataRepositoryConfiguration::builder()
            .auto_export_policy(auto_export)
            .build();

        let response = self
            .client
            .create_data_repository_association()
            .file_system_id(file_system_id)
            .file_system_path(file_system_path)
            .data_repository_path(data_repository_path)
            .batch_import_meta_data_on_create(true)
            .s3(s3_config)
            .send()
            .await
            .map_err(|e| {
                AwsError::FsxError(format!(
                    "Failed to create data repository association on '{file_system_id}': {e}"
                ))
            })?;

        response
            .association()
            .and_then(|association| association.association_id())
            .map(ToString::to_string)
            .ok_or_else(|| {
                AwsError::FsxError(format!(
                    "Association on '{file_system_id}' was created without an id"
                ))
            })
    }

    /// Lifecycle status of the filesystem's association, e.g. `CREATING`.
    pub async fn association_status(&self, file_system_id: &str) -> AwsResult<String> {
        let filter = Filter::builder()
            .name(FilterName::FileSystemId)
            .values(file_system_id)
            .build();

        let response = self
            .client
            .describe_data_repository_associations()
            .filters(filter)
            .send()
            .await
            .map_err(|e| {
                AwsError::FsxError(format!(
                    "Failed to describe associations for '{file_system_id}': {e}"
                ))
            })?;

        response
            .associations()
            .first()
            .and_then(|association| association.lifecycle())
            .map(|lifecycle| lifecycle.as_str().to_string())
            .ok_or_else(|| {
                AwsError::FsxError(format!(
                    "Filesystem '{file_system_id}' has no data repository association"
                ))
            })
    }
}

/// Status probe for the data repository association.
pub struct AssociationStatusSource<'a> {
    client: &'a FsxClient,
    file_system_id: String,
}

impl<'a> AssociationStatusSource<'a> {
    pub fn new(client: &'a FsxClient, file_system_id: impl Into<String>) -> Self {
        Self {
            client,
            file_system_id: file_system_id.into(),
        }
    }
}

#[async_trait]
impl StatusSource for AssociationStatusSource<'_> {
    async fn current_status(&mut self) -> AwsResult<String> {
        self.client.association_status(&self.file_system_id).await
    }
}
