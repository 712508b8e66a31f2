// Data model for the Google Forms and Drive resources we touch.
//
// Field names follow the REST wire format (camelCase), so the same structs are
// used by the HTTP clients in `infra/google` and by the in-memory backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// FORMS
// =============================================================================

/// A Google Form as returned by `forms.get` / `forms.create`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub form_id: String,
    #[serde(default)]
    pub info: Info,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<FormSettings>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responder_uri: Option<String>,
}

impl Form {
    /// Body for `forms.create`: the service only accepts a title at creation time.
    pub fn with_title(title: &str) -> Self {
        Self {
            info: Info {
                title: title.to_string(),
                document_title: None,
                description: None,
            },
            ..Default::default()
        }
    }

    pub fn is_quiz(&self) -> bool {
        self.settings
            .as_ref()
            .and_then(|s| s.quiz_settings.as_ref())
            .and_then(|q| q.is_quiz)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_settings: Option<QuizSettings>,
    /// Sibling of `quizSettings`; only touched when the update mask names it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_collection_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_quiz: Option<bool>,
}

// =============================================================================
// ITEMS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_item: Option<QuestionItem>,
}

impl Item {
    #[allow(dead_code)]
    pub fn question(&self) -> Option<&Question> {
        self.question_item.as_ref().map(|q| &q.question)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionItem {
    pub question: Question,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_question: Option<ChoiceQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grading: Option<Grading>,
}

/// How the options of a choice question are presented.
///
/// Only `Radio` is ever sent; the other variants let `forms.get` decode
/// forms that already hold checkbox or drop-down questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChoiceType {
    #[default]
    Radio,
    Checkbox,
    DropDown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceQuestion {
    #[serde(rename = "type")]
    pub choice_type: ChoiceType,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
}

impl ChoiceQuestion {
    #[allow(dead_code)]
    pub fn option_values(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.value.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grading {
    pub point_value: u32,
    #[serde(default)]
    pub correct_answers: CorrectAnswers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_right: Option<Feedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_wrong: Option<Feedback>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectAnswers {
    #[serde(default)]
    pub answers: Vec<CorrectAnswer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectAnswer {
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub text: String,
}

// =============================================================================
// BATCH UPDATE
// =============================================================================

/// Body of `forms.batchUpdate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateFormRequest {
    pub requests: Vec<Request>,
    #[serde(default)]
    pub include_form_in_response: bool,
}

impl BatchUpdateFormRequest {
    /// Every mutation this program issues is a one-element batch.
    pub fn single(request: Request) -> Self {
        Self {
            requests: vec![request],
            include_form_in_response: false,
        }
    }
}

/// One mutation in a batch. Serialized as `{"updateSettings": {...}}` etc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    UpdateSettings(UpdateSettingsRequest),
    CreateItem(CreateItemRequest),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub settings: FormSettings,
    /// Comma-separated field paths relative to `settings`.
    pub update_mask: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub item: Item,
    pub location: Location,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub index: usize,
}

/// Reply of `forms.batchUpdate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateFormResponse {
    #[serde(default)]
    pub replies: Vec<Reply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_control: Option<WriteControl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<Form>,
}

/// Per-request reply. Settings updates reply with an empty object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_item: Option<CreateItemResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemResponse {
    pub item_id: String,
    #[serde(default)]
    pub question_id: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteControl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_revision_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_revision_id: Option<String>,
}

// =============================================================================
// RESPONSES
// =============================================================================

/// One respondent's submission. Answers are kept opaque.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    #[serde(default)]
    pub response_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_submitted_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respondent_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_score: Option<f64>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub answers: HashMap<String, serde_json::Value>,
}

/// Reply of `forms.responses.list`. Only the first page is ever read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFormResponsesResponse {
    #[serde(default)]
    pub responses: Vec<FormResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

// =============================================================================
// DRIVE PERMISSIONS
// =============================================================================

pub const ROLE_READER: &str = "reader";
pub const TYPE_ANYONE: &str = "anyone";

/// An access-control entry on the Drive file backing a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: String,
    #[serde(rename = "type")]
    pub permission_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

impl Permission {
    pub fn new(role: &str, permission_type: &str) -> Self {
        Self {
            id: None,
            role: role.to_string(),
            permission_type: permission_type.to_string(),
            email_address: None,
        }
    }

    /// True for the "anyone with the link can view" grant that makes a form public.
    pub fn is_public_reader(&self) -> bool {
        self.role == ROLE_READER && self.permission_type == TYPE_ANYONE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionList {
    #[serde(default)]
    pub permissions: Vec<Permission>,
}
