use async_trait::async_trait;
use reqwest::Client;

use super::forms_client::send_json;
use crate::core::forms::{FormsError, Permission, PermissionList, PermissionsApi};

const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Drive v3 permissions client. A form is a Drive file with the same id.
#[derive(Clone)]
pub struct GoogleDriveClient {
    client: Client,
    base_url: String,
}

impl GoogleDriveClient {
    pub fn new() -> Result<Self, FormsError> {
        Self::with_base_url(DRIVE_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, FormsError> {
        let client = Client::builder()
            .user_agent(concat!("forms-quiz-builder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FormsError::RemoteCall(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn permissions_url(&self, file_id: &str) -> String {
        format!("{}/files/{}/permissions", self.base_url, file_id)
    }
}

#[async_trait]
impl PermissionsApi for GoogleDriveClient {
    async fn list_permissions(
        &self,
        token: &str,
        file_id: &str,
    ) -> Result<Vec<Permission>, FormsError> {
        let url = self.permissions_url(file_id);
        tracing::debug!("GET {}", url);
        let list: PermissionList = send_json(
            self.client
                .get(&url)
                .query(&[("fields", "permissions(id,role,type,emailAddress)")]),
            token,
            "drive.permissions.list",
        )
        .await?;
        Ok(list.permissions)
    }

    async fn create_permission(
        &self,
        token: &str,
        file_id: &str,
        permission: &Permission,
    ) -> Result<Permission, FormsError> {
        let url = self.permissions_url(file_id);
        tracing::debug!(
            role = %permission.role,
            kind = %permission.permission_type,
            "POST {}",
            url
        );
        send_json(
            self.client.post(&url).json(permission),
            token,
            "drive.permissions.create",
        )
        .await
    }
}
