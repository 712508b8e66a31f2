use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::core::forms::{
    BatchUpdateFormRequest, BatchUpdateFormResponse, Form, FormResponse, FormsApi, FormsError,
    ListFormResponsesResponse,
};

const FORMS_BASE_URL: &str = "https://forms.googleapis.com/v1";

/// Minimal Google Forms REST client. Only the calls the workflow needs.
#[derive(Clone)]
pub struct GoogleFormsClient {
    client: Client,
    base_url: String,
}

impl GoogleFormsClient {
    pub fn new() -> Result<Self, FormsError> {
        Self::with_base_url(FORMS_BASE_URL)
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

    fn form_url(&self, form_id: &str) -> String {
        format!("{}/forms/{}", self.base_url, form_id)
    }
}

/// Sends an authorized request and decodes the JSON reply.
///
/// 401/403 map to `Auth`; everything else that goes wrong is a `RemoteCall`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    token: &str,
    what: &str,
) -> Result<T, FormsError> {
    let response = request
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| FormsError::RemoteCall(format!("{}: {}", what, e)))?;

    let response = ensure_success(response, what).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| FormsError::RemoteCall(format!("{}: malformed reply: {}", what, e)))
}

async fn ensure_success(response: Response, what: &str) -> Result<Response, FormsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(classify_status(status, what, &text))
}

fn classify_status(status: StatusCode, what: &str, body: &str) -> FormsError {
    let message = format!("{} returned {}: {}", what, status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FormsError::Auth(message),
        _ => FormsError::RemoteCall(message),
    }
}

#[async_trait]
impl FormsApi for GoogleFormsClient {
    async fn create_form(&self, token: &str, form: &Form) -> Result<Form, FormsError> {
        let url = format!("{}/forms", self.base_url);
        tracing::debug!(title = %form.info.title, "POST {}", url);
        send_json(self.client.post(&url).json(form), token, "forms.create").await
    }

    async fn get_form(&self, token: &str, form_id: &str) -> Result<Form, FormsError> {
        let url = self.form_url(form_id);
        tracing::debug!("GET {}", url);
        send_json(self.client.get(&url), token, "forms.get").await
    }

    async fn batch_update(
        &self,
        token: &str,
        form_id: &str,
        batch: &BatchUpdateFormRequest,
    ) -> Result<BatchUpdateFormResponse, FormsError> {
        let url = format!("{}:batchUpdate", self.form_url(form_id));
        tracing::debug!(requests = batch.requests.len(), "POST {}", url);
        send_json(self.client.post(&url).json(batch), token, "forms.batchUpdate").await
    }

    async fn list_responses(
        &self,
        token: &str,
        form_id: &str,
    ) -> Result<Vec<FormResponse>, FormsError> {
        let url = format!("{}/responses", self.form_url(form_id));
        tracing::debug!("GET {}", url);
        let page: ListFormResponsesResponse =
            send_json(self.client.get(&url), token, "forms.responses.list").await?;

        if page.next_page_token.is_some() {
            tracing::warn!(form_id, "More responses available; only the first page was read");
        }
        Ok(page.responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_urls() {
        let client = GoogleFormsClient::with_base_url("https://forms.example.com/v1/").unwrap();
        assert_eq!(
            client.form_url("abc"),
            "https://forms.example.com/v1/forms/abc"
        );
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "forms.get", ""),
            FormsError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "forms.get", ""),
            FormsError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "forms.get", ""),
            FormsError::RemoteCall(_)
        ));
    }

    #[test]
    fn test_empty_response_page_parses() {
        let page: ListFormResponsesResponse = serde_json::from_str("{}").unwrap();
        assert!(page.responses.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
