use super::forms_api::{FormsApi, FormsError};
use super::forms_models::FormResponse;

pub struct ResponseReader<F: FormsApi> {
    forms: F,
}

impl<F: FormsApi> ResponseReader<F> {
    pub fn new(forms: F) -> Self {
        Self { forms }
    }

    /// First page of submitted responses for `form_id`.
    pub async fn list_responses(
        &self,
        token: &str,
        form_id: &str,
    ) -> Result<Vec<FormResponse>, FormsError> {
        let responses = self.forms.list_responses(token, form_id).await?;
        tracing::info!(form_id, count = responses.len(), "Fetched responses");
        Ok(responses)
    }
}

/// Human-readable dump of a response list (pretty JSON, like the API returns it).
pub fn render_responses(form_id: &str, responses: &[FormResponse]) -> String {
    if responses.is_empty() {
        return format!("No responses yet for form {}", form_id);
    }

    let body = serde_json::to_string_pretty(&serde_json::json!({ "responses": responses }))
        .unwrap_or_else(|e| format!("<unprintable responses: {}>", e));
    format!("{} response(s) for form {}:\n{}", responses.len(), form_id, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::forms::InMemoryForms;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_list_responses_reads_submissions() {
        let backend = InMemoryForms::new("t");
        let form = backend
            .create_form("t", &crate::core::forms::Form::with_title("X"))
            .await
            .unwrap();
        backend.submit_response(
            &form.form_id,
            FormResponse {
                response_id: "r1".to_string(),
                respondent_email: Some("a@example.com".to_string()),
                total_score: Some(2.0),
                ..Default::default()
            },
        );

        let reader = ResponseReader::new(backend);
        let responses = reader.list_responses("t", &form.form_id).await.unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].response_id, "r1");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_responses("f1", &[]), "No responses yet for form f1");
    }

    #[test]
    fn test_render_includes_response_fields() {
        let response = FormResponse {
            response_id: "r1".to_string(),
            create_time: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            total_score: Some(2.0),
            ..Default::default()
        };

        let out = render_responses("f1", &[response]);
        assert!(out.starts_with("1 response(s) for form f1:"));
        assert!(out.contains("\"responseId\": \"r1\""));
        assert!(out.contains("\"createTime\": \"2024-01-02T03:04:05Z\""));
        assert!(out.contains("\"totalScore\": 2.0"));
    }
}
