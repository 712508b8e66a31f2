use super::forms_api::{FormsApi, FormsError, PermissionsApi, TokenProvider};
use super::forms_models::FormResponse;
use super::quiz_builder::{BuiltQuiz, QuizBuilder, QuizQuestion};
use super::response_reader::ResponseReader;

/// What one run of the scenario produced.
#[derive(Debug, Clone)]
pub struct WorkflowReport {
    pub quiz: BuiltQuiz,
    /// The form the responses were read from. Always `quiz.form_id`.
    pub responses_form_id: String,
    pub responses: Vec<FormResponse>,
}

/// Token → build quiz → read its responses.
pub struct QuizWorkflow<F: FormsApi, P: PermissionsApi, R: FormsApi> {
    builder: QuizBuilder<F, P>,
    reader: ResponseReader<R>,
}

impl<F: FormsApi, P: PermissionsApi, R: FormsApi> QuizWorkflow<F, P, R> {
    pub fn new(builder: QuizBuilder<F, P>, reader: ResponseReader<R>) -> Self {
        Self { builder, reader }
    }

    pub async fn run<T: TokenProvider>(
        &self,
        tokens: &T,
        title: &str,
        question: &QuizQuestion,
    ) -> Result<WorkflowReport, FormsError> {
        let token = tokens.access_token().await?;

        let quiz = self.builder.build(&token, title, question).await?;
        let responses = self.reader.list_responses(&token, &quiz.form_id).await?;

        Ok(WorkflowReport {
            responses_form_id: quiz.form_id.clone(),
            quiz,
            responses,
        })
    }
}
