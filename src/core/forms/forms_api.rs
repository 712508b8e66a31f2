use super::forms_models::{
    BatchUpdateFormRequest, BatchUpdateFormResponse, Form, FormResponse, Permission,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised anywhere in the quiz workflow.
#[derive(Debug, Error)]
pub enum FormsError {
    /// Credential loading, token exchange, or a 401/403 from a Google API.
    #[error("Authentication failed: {0}")]
    Auth(String),
    /// Transport failures, non-success statuses and malformed replies.
    #[error("Remote call failed: {0}")]
    RemoteCall(String),
    /// Rejected locally before anything was sent.
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),
}

/// Source of OAuth2 bearer tokens.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, FormsError>;
}

/// The subset of the Google Forms API the workflow needs.
#[async_trait]
pub trait FormsApi: Send + Sync {
    async fn create_form(&self, token: &str, form: &Form) -> Result<Form, FormsError>;
    async fn get_form(&self, token: &str, form_id: &str) -> Result<Form, FormsError>;
    async fn batch_update(
        &self,
        token: &str,
        form_id: &str,
        batch: &BatchUpdateFormRequest,
    ) -> Result<BatchUpdateFormResponse, FormsError>;
    /// First page only.
    async fn list_responses(
        &self,
        token: &str,
        form_id: &str,
    ) -> Result<Vec<FormResponse>, FormsError>;
}

/// Drive permission calls on the file that backs a form.
#[async_trait]
pub trait PermissionsApi: Send + Sync {
    async fn list_permissions(
        &self,
        token: &str,
        file_id: &str,
    ) -> Result<Vec<Permission>, FormsError>;
    async fn create_permission(
        &self,
        token: &str,
        file_id: &str,
        permission: &Permission,
    ) -> Result<Permission, FormsError>;
}

// Shared handles: the builder and the reader can hold the same client.

#[async_trait]
impl<T: FormsApi + ?Sized> FormsApi for Arc<T> {
    async fn create_form(&self, token: &str, form: &Form) -> Result<Form, FormsError> {
        (**self).create_form(token, form).await
    }

    async fn get_form(&self, token: &str, form_id: &str) -> Result<Form, FormsError> {
        (**self).get_form(token, form_id).await
    }

    async fn batch_update(
        &self,
        token: &str,
        form_id: &str,
        batch: &BatchUpdateFormRequest,
    ) -> Result<BatchUpdateFormResponse, FormsError> {
        (**self).batch_update(token, form_id, batch).await
    }

    async fn list_responses(
        &self,
        token: &str,
        form_id: &str,
    ) -> Result<Vec<FormResponse>, FormsError> {
        (**self).list_responses(token, form_id).await
    }
}

#[async_trait]
impl<T: PermissionsApi + ?Sized> PermissionsApi for Arc<T> {
    async fn list_permissions(
        &self,
        token: &str,
        file_id: &str,
    ) -> Result<Vec<Permission>, FormsError> {
        (**self).list_permissions(token, file_id).await
    }

    async fn create_permission(
        &self,
        token: &str,
        file_id: &str,
        permission: &Permission,
    ) -> Result<Permission, FormsError> {
        (**self).create_permission(token, file_id, permission).await
    }
}

#[async_trait]
impl<T: TokenProvider + ?Sized> TokenProvider for Arc<T> {
    async fn access_token(&self) -> Result<String, FormsError> {
        (**self).access_token().await
    }
}
