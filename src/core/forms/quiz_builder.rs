use super::forms_api::{FormsApi, FormsError, PermissionsApi};
use super::forms_models::{
    BatchUpdateFormRequest, BatchUpdateFormResponse, ChoiceOption, ChoiceQuestion, ChoiceType,
    CorrectAnswer, CorrectAnswers, CreateItemRequest, Feedback, Form, FormSettings, Grading, Item,
    Location, Permission, Question, QuestionItem, QuizSettings, Request, UpdateSettingsRequest,
    ROLE_READER, TYPE_ANYONE,
};
use std::collections::HashSet;

/// Points awarded for a correct answer.
pub const POINT_VALUE: u32 = 2;
pub const FEEDBACK_RIGHT: &str = "Yeah!";
pub const FEEDBACK_WRONG: &str = "Wrong Answer";

/// Field path that scopes the quiz conversion to the single flag it changes.
pub const QUIZ_UPDATE_MASK: &str = "quizSettings.isQuiz";

/// A graded multiple-choice question, as the caller describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl QuizQuestion {
    pub fn new(text: &str, options: &[&str], correct_answer: &str) -> Self {
        Self {
            text: text.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: correct_answer.to_string(),
        }
    }

    /// Checks what the Forms API would otherwise reject (or silently accept).
    pub fn validate(&self) -> Result<(), FormsError> {
        if self.text.trim().is_empty() {
            return Err(FormsError::InvalidQuestion(
                "question text is empty".to_string(),
            ));
        }
        if self.options.is_empty() {
            return Err(FormsError::InvalidQuestion(format!(
                "'{}' has no options",
                self.text
            )));
        }

        let mut seen = HashSet::new();
        for option in &self.options {
            if !seen.insert(option.as_str()) {
                return Err(FormsError::InvalidQuestion(format!(
                    "duplicate option '{}'",
                    option
                )));
            }
        }

        if !seen.contains(self.correct_answer.as_str()) {
            return Err(FormsError::InvalidQuestion(format!(
                "correct answer '{}' is not one of the options",
                self.correct_answer
            )));
        }

        Ok(())
    }

    /// Builds the required RADIO item with its grading block.
    pub fn to_item(&self) -> Item {
        let grading = Grading {
            point_value: POINT_VALUE,
            correct_answers: CorrectAnswers {
                answers: vec![CorrectAnswer {
                    value: self.correct_answer.clone(),
                }],
            },
            when_right: Some(Feedback {
                text: FEEDBACK_RIGHT.to_string(),
            }),
            when_wrong: Some(Feedback {
                text: FEEDBACK_WRONG.to_string(),
            }),
        };

        Item {
            item_id: None,
            title: self.text.clone(),
            question_item: Some(QuestionItem {
                question: Question {
                    question_id: None,
                    required: true,
                    choice_question: Some(ChoiceQuestion {
                        choice_type: ChoiceType::Radio,
                        options: self
                            .options
                            .iter()
                            .map(|value| ChoiceOption {
                                value: value.clone(),
                            })
                            .collect(),
                    }),
                    grading: Some(grading),
                },
            }),
        }
    }
}

/// Summary of a finished build, read back from the service.
#[derive(Debug, Clone)]
pub struct BuiltQuiz {
    pub form_id: String,
    /// False when the form was already public.
    pub newly_published: bool,
    pub is_quiz: bool,
    pub item_count: usize,
    pub responder_uri: Option<String>,
}

/// Runs create → publish → convert-to-quiz → add-question against injected clients.
pub struct QuizBuilder<F: FormsApi, P: PermissionsApi> {
    forms: F,
    permissions: P,
}

impl<F: FormsApi, P: PermissionsApi> QuizBuilder<F, P> {
    pub fn new(forms: F, permissions: P) -> Self {
        Self { forms, permissions }
    }

    /// Creates an empty form and returns its server-assigned id.
    pub async fn create_form(&self, token: &str, title: &str) -> Result<String, FormsError> {
        let form = self.forms.create_form(token, &Form::with_title(title)).await?;
        if form.form_id.is_empty() {
            return Err(FormsError::RemoteCall(
                "forms.create returned an empty formId".to_string(),
            ));
        }

        tracing::info!(form_id = %form.form_id, title, "Form created");
        Ok(form.form_id)
    }

    pub async fn get_form(&self, token: &str, form_id: &str) -> Result<Form, FormsError> {
        self.forms.get_form(token, form_id).await
    }

    /// Grants "anyone/reader" unless it already exists.
    ///
    /// Returns `true` when a permission was created, `false` when the form was
    /// already public.
    pub async fn publish(&self, token: &str, form_id: &str) -> Result<bool, FormsError> {
        let existing = self.permissions.list_permissions(token, form_id).await?;
        if existing.iter().any(Permission::is_public_reader) {
            tracing::warn!(form_id, "Form is already public, skipping publish");
            return Ok(false);
        }

        self.permissions
            .create_permission(token, form_id, &Permission::new(ROLE_READER, TYPE_ANYONE))
            .await?;
        tracing::info!(form_id, "Form published");
        Ok(true)
    }

    /// Sets `quizSettings.isQuiz`, masked so no other setting is touched.
    pub async fn convert_to_quiz(
        &self,
        token: &str,
        form_id: &str,
    ) -> Result<BatchUpdateFormResponse, FormsError> {
        let request = Request::UpdateSettings(UpdateSettingsRequest {
            settings: FormSettings {
                quiz_settings: Some(QuizSettings {
                    is_quiz: Some(true),
                }),
                email_collection_type: None,
            },
            update_mask: QUIZ_UPDATE_MASK.to_string(),
        });

        let reply = self
            .forms
            .batch_update(token, form_id, &BatchUpdateFormRequest::single(request))
            .await?;
        tracing::info!(form_id, "Form converted to quiz");
        Ok(reply)
    }

    /// Prepends a graded question (insertion index 0).
    pub async fn add_item(
        &self,
        token: &str,
        form_id: &str,
        question: &QuizQuestion,
    ) -> Result<BatchUpdateFormResponse, FormsError> {
        question.validate()?;

        let request = Request::CreateItem(CreateItemRequest {
            item: question.to_item(),
            location: Location { index: 0 },
        });

        let reply = self
            .forms
            .batch_update(token, form_id, &BatchUpdateFormRequest::single(request))
            .await?;

        let item_id = reply
            .replies
            .first()
            .and_then(|r| r.create_item.as_ref())
            .map(|c| c.item_id.as_str())
            .unwrap_or("?");
        tracing::info!(form_id, item_id, "Question added: {}", question.text);
        Ok(reply)
    }

    /// The whole scenario. Any failing step aborts the rest.
    pub async fn build(
        &self,
        token: &str,
        title: &str,
        question: &QuizQuestion,
    ) -> Result<BuiltQuiz, FormsError> {
        // Fail before creating anything remote
        question.validate()?;

        let form_id = self.create_form(token, title).await?;
        let newly_published = self.publish(token, &form_id).await?;
        self.convert_to_quiz(token, &form_id).await?;
        self.add_item(token, &form_id, question).await?;

        let form = self.get_form(token, &form_id).await?;
        tracing::debug!(
            form_id = %form_id,
            items = form.items.len(),
            is_quiz = form.is_quiz(),
            "Read back built form"
        );

        Ok(BuiltQuiz {
            form_id,
            newly_published,
            is_quiz: form.is_quiz(),
            item_count: form.items.len(),
            responder_uri: form.responder_uri,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::forms::InMemoryForms;
    use std::sync::Arc;

    const TOKEN: &str = "test-token";

    fn builder() -> (Arc<InMemoryForms>, QuizBuilder<Arc<InMemoryForms>, Arc<InMemoryForms>>) {
        let backend = Arc::new(InMemoryForms::new(TOKEN));
        let builder = QuizBuilder::new(Arc::clone(&backend), Arc::clone(&backend));
        (backend, builder)
    }

    #[tokio::test]
    async fn test_create_form_returns_id() {
        let (_, builder) = builder();

        let form_id = builder.create_form(TOKEN, "X").await.unwrap();
        assert!(!form_id.is_empty());

        let form = builder.get_form(TOKEN, &form_id).await.unwrap();
        assert_eq!(form.info.title, "X");
        assert!(form.items.is_empty());
        assert!(!form.is_quiz());
    }

    #[tokio::test]
    async fn test_publish_is_idempotent() {
        let (backend, builder) = builder();
        let form_id = builder.create_form(TOKEN, "X").await.unwrap();

        assert!(builder.publish(TOKEN, &form_id).await.unwrap());
        assert!(!builder.publish(TOKEN, &form_id).await.unwrap());

        let public: Vec<_> = backend
            .list_permissions(TOKEN, &form_id)
            .await
            .unwrap()
            .into_iter()
            .filter(Permission::is_public_reader)
            .collect();
        assert_eq!(public.len(), 1);
    }

    #[tokio::test]
    async fn test_publish_ignores_non_public_reader() {
        let (backend, builder) = builder();
        let form_id = builder.create_form(TOKEN, "X").await.unwrap();

        let mut shared = Permission::new("reader", "user");
        shared.email_address = Some("someone@example.com".to_string());
        backend
            .create_permission(TOKEN, &form_id, &shared)
            .await
            .unwrap();

        assert!(builder.publish(TOKEN, &form_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_convert_to_quiz_sets_flag() {
        let (_, builder) = builder();
        let form_id = builder.create_form(TOKEN, "X").await.unwrap();

        builder.convert_to_quiz(TOKEN, &form_id).await.unwrap();

        let form = builder.get_form(TOKEN, &form_id).await.unwrap();
        assert!(form.is_quiz());
    }

    #[tokio::test]
    async fn test_convert_to_quiz_keeps_email_collection_setting() {
        let (backend, builder) = builder();
        let form_id = builder.create_form(TOKEN, "X").await.unwrap();

        let seed = Request::UpdateSettings(UpdateSettingsRequest {
            settings: FormSettings {
                quiz_settings: None,
                email_collection_type: Some("VERIFIED".to_string()),
            },
            update_mask: "emailCollectionType".to_string(),
        });
        backend
            .batch_update(TOKEN, &form_id, &BatchUpdateFormRequest::single(seed))
            .await
            .unwrap();

        builder.convert_to_quiz(TOKEN, &form_id).await.unwrap();

        let form = builder.get_form(TOKEN, &form_id).await.unwrap();
        assert!(form.is_quiz());
        assert_eq!(
            form.settings.unwrap().email_collection_type.as_deref(),
            Some("VERIFIED")
        );
    }

    #[tokio::test]
    async fn test_add_item_to_empty_form() {
        let (_, builder) = builder();
        let form_id = builder.create_form(TOKEN, "X").await.unwrap();

        let question = QuizQuestion::new("Q?", &["A", "B"], "A");
        builder.add_item(TOKEN, &form_id, &question).await.unwrap();

        let form = builder.get_form(TOKEN, &form_id).await.unwrap();
        assert_eq!(form.items.len(), 1);
        assert_eq!(form.items[0].title, "Q?");

        let q = form.items[0].question().unwrap();
        assert!(q.required);
        assert_eq!(
            q.choice_question.as_ref().unwrap().option_values(),
            vec!["A", "B"]
        );

        let grading = q.grading.as_ref().unwrap();
        assert_eq!(grading.point_value, 2);
        assert_eq!(grading.correct_answers.answers.len(), 1);
        assert_eq!(grading.correct_answers.answers[0].value, "A");
        assert_eq!(grading.when_right.as_ref().unwrap().text, "Yeah!");
        assert_eq!(grading.when_wrong.as_ref().unwrap().text, "Wrong Answer");
    }

    #[tokio::test]
    async fn test_add_item_prepends() {
        let (_, builder) = builder();
        let form_id = builder.create_form(TOKEN, "X").await.unwrap();

        let first = QuizQuestion::new("First?", &["A", "B"], "A");
        let second = QuizQuestion::new("Second?", &["C", "D"], "D");
        builder.add_item(TOKEN, &form_id, &first).await.unwrap();
        builder.add_item(TOKEN, &form_id, &second).await.unwrap();

        let form = builder.get_form(TOKEN, &form_id).await.unwrap();
        let titles: Vec<_> = form.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Second?", "First?"]);
    }

    #[tokio::test]
    async fn test_add_item_rejects_invalid_question_locally() {
        let (_, builder) = builder();
        let form_id = builder.create_form(TOKEN, "X").await.unwrap();

        let question = QuizQuestion::new("Q?", &["A", "B"], "C");
        let err = builder.add_item(TOKEN, &form_id, &question).await;
        assert!(matches!(err, Err(FormsError::InvalidQuestion(_))));

        let form = builder.get_form(TOKEN, &form_id).await.unwrap();
        assert!(form.items.is_empty());
    }

    #[tokio::test]
    async fn test_build_runs_full_scenario() {
        let (_, builder) = builder();
        let question = QuizQuestion::new("Q?", &["A", "B"], "A");

        let built = builder.build(TOKEN, "X", &question).await.unwrap();

        assert!(!built.form_id.is_empty());
        assert!(built.newly_published);
        assert!(built.is_quiz);
        assert_eq!(built.item_count, 1);
        assert!(built.responder_uri.is_some());

        // Second publish on the same form is a no-op
        assert!(!builder.publish(TOKEN, &built.form_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_build_with_bad_token_fails_with_auth_error() {
        let (_, builder) = builder();
        let question = QuizQuestion::new("Q?", &["A", "B"], "A");

        let err = builder.build("wrong", "X", &question).await;
        assert!(matches!(err, Err(FormsError::Auth(_))));
    }

    #[test]
    fn test_validate() {
        assert!(QuizQuestion::new("Q?", &["A", "B"], "B").validate().is_ok());
        assert!(QuizQuestion::new("Q?", &[], "A").validate().is_err());
        assert!(QuizQuestion::new("Q?", &["A", "A"], "A").validate().is_err());
        assert!(QuizQuestion::new("  ", &["A"], "A").validate().is_err());
    }
}
