// This file provides an IN-MEMORY implementation of the Forms, Drive permission
// and token traits.
//
// It mirrors the parts of the remote contract the workflow relies on:
// - batches are atomic (all requests apply or none do)
// - `updateSettings` only writes the fields named in its update mask
// - `createItem` inserts at `location.index` and assigns item/question ids
// - every call checks the bearer token and answers unknown ids like a 404
//
// Used by the test suite and by `QUIZ_OFFLINE=true` runs.

use crate::core::forms::{
    BatchUpdateFormRequest, BatchUpdateFormResponse, CreateItemResponse, Form, FormResponse,
    FormSettings, FormsApi, FormsError, Info, Item, Permission, PermissionsApi, QuizSettings, Reply,
    Request, TokenProvider, UpdateSettingsRequest,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

pub struct InMemoryForms {
    token: String,
    forms: DashMap<String, Form>,
    permissions: DashMap<String, Vec<Permission>>,
    responses: DashMap<String, Vec<FormResponse>>,
    next_id: AtomicU64,
    /// Form id of the most recent `list_responses` call.
    last_responses_form_id: Mutex<Option<String>>,
}

impl InMemoryForms {
    /// Accepts only `token` as a valid bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            forms: DashMap::new(),
            permissions: DashMap::new(),
            responses: DashMap::new(),
            next_id: AtomicU64::new(1),
            last_responses_form_id: Mutex::new(None),
        }
    }

    /// Records a submission, as a respondent filling in the form would.
    #[cfg(test)]
    pub fn submit_response(&self, form_id: &str, response: FormResponse) {
        self.responses
            .entry(form_id.to_string())
            .or_default()
            .push(response);
    }

    #[cfg(test)]
    pub fn form_count(&self) -> usize {
        self.forms.len()
    }

    #[cfg(test)]
    pub fn last_responses_form_id(&self) -> Option<String> {
        self.last_responses_form_id
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("{}{:08x}", prefix, n)
    }

    fn check_token(&self, token: &str) -> Result<(), FormsError> {
        if token.is_empty() || token != self.token {
            return Err(FormsError::Auth(
                "401 Unauthorized: invalid bearer token".to_string(),
            ));
        }
        Ok(())
    }

    fn not_found(id: &str) -> FormsError {
        FormsError::RemoteCall(format!("404 Not Found: no form with id '{}'", id))
    }

    fn apply_request(&self, form: &mut Form, request: &Request) -> Result<Reply, FormsError> {
        match request {
            Request::UpdateSettings(update) => {
                apply_settings_mask(form, update)?;
                Ok(Reply::default())
            }
            Request::CreateItem(create) => {
                let index = create.location.index;
                if index > form.items.len() {
                    return Err(FormsError::RemoteCall(format!(
                        "400 Bad Request: index {} is out of range for {} item(s)",
                        index,
                        form.items.len()
                    )));
                }

                let mut item: Item = create.item.clone();
                let item_id = self.next_id("item-");
                item.item_id = Some(item_id.clone());

                let mut question_ids = Vec::new();
                if let Some(question_item) = item.question_item.as_mut() {
                    let question_id = self.next_id("q-");
                    question_item.question.question_id = Some(question_id.clone());
                    question_ids.push(question_id);
                }

                form.items.insert(index, item);
                Ok(Reply {
                    create_item: Some(CreateItemResponse {
                        item_id,
                        question_id: question_ids,
                    }),
                })
            }
        }
    }
}

/// Copies only the masked fields of `update.settings` onto the form.
fn apply_settings_mask(form: &mut Form, update: &UpdateSettingsRequest) -> Result<(), FormsError> {
    let paths: Vec<&str> = update
        .update_mask
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if paths.is_empty() {
        return Err(FormsError::RemoteCall(
            "400 Bad Request: updateMask is required".to_string(),
        ));
    }

    let settings = form.settings.get_or_insert_with(FormSettings::default);
    for path in paths {
        match path {
            "*" => *settings = update.settings.clone(),
            "quizSettings" => settings.quiz_settings = update.settings.quiz_settings.clone(),
            "quizSettings.isQuiz" => {
                let is_quiz = update
                    .settings
                    .quiz_settings
                    .as_ref()
                    .and_then(|q| q.is_quiz);
                settings
                    .quiz_settings
                    .get_or_insert_with(QuizSettings::default)
                    .is_quiz = is_quiz;
            }
            "emailCollectionType" => {
                settings.email_collection_type = update.settings.email_collection_type.clone()
            }
            other => {
                return Err(FormsError::RemoteCall(format!(
                    "400 Bad Request: unknown field path '{}' in updateMask",
                    other
                )))
            }
        }
    }

    Ok(())
}

#[async_trait]
impl TokenProvider for InMemoryForms {
    async fn access_token(&self) -> Result<String, FormsError> {
        Ok(self.token.clone())
    }
}

#[async_trait]
impl FormsApi for InMemoryForms {
    async fn create_form(&self, token: &str, form: &Form) -> Result<Form, FormsError> {
        self.check_token(token)?;
        if !form.items.is_empty() || form.settings.is_some() {
            return Err(FormsError::RemoteCall(
                "400 Bad Request: only info.title can be set when creating a form".to_string(),
            ));
        }

        let form_id = self.next_id("form-");
        let created = Form {
            form_id: form_id.clone(),
            info: Info {
                title: form.info.title.clone(),
                document_title: Some(form.info.title.clone()),
                description: None,
            },
            settings: None,
            items: Vec::new(),
            revision_id: Some(format!("{:08}", 1)),
            responder_uri: Some(format!(
                "https://docs.google.com/forms/d/e/{}/viewform",
                form_id
            )),
        };

        self.forms.insert(form_id.clone(), created.clone());
        self.permissions.insert(form_id, Vec::new());
        Ok(created)
    }

    async fn get_form(&self, token: &str, form_id: &str) -> Result<Form, FormsError> {
        self.check_token(token)?;
        self.forms
            .get(form_id)
            .map(|f| f.clone())
            .ok_or_else(|| Self::not_found(form_id))
    }

    async fn batch_update(
        &self,
        token: &str,
        form_id: &str,
        batch: &BatchUpdateFormRequest,
    ) -> Result<BatchUpdateFormResponse, FormsError> {
        self.check_token(token)?;
        let mut entry = self
            .forms
            .get_mut(form_id)
            .ok_or_else(|| Self::not_found(form_id))?;

        // Work on a copy so a failing request leaves the stored form untouched
        let mut draft = entry.clone();
        let mut replies = Vec::with_capacity(batch.requests.len());
        for request in &batch.requests {
            replies.push(self.apply_request(&mut draft, request)?);
        }

        let revision = draft
            .revision_id
            .as_deref()
            .and_then(|r| r.parse::<u64>().ok())
            .unwrap_or(0);
        draft.revision_id = Some(format!("{:08}", revision + 1));
        *entry = draft;

        Ok(BatchUpdateFormResponse {
            replies,
            write_control: None,
            form: batch.include_form_in_response.then(|| entry.clone()),
        })
    }

    async fn list_responses(
        &self,
        token: &str,
        form_id: &str,
    ) -> Result<Vec<FormResponse>, FormsError> {
        self.check_token(token)?;
        if let Ok(mut last) = self.last_responses_form_id.lock() {
            *last = Some(form_id.to_string());
        }
        if !self.forms.contains_key(form_id) {
            return Err(Self::not_found(form_id));
        }

        Ok(self
            .responses
            .get(form_id)
            .map(|r| r.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl PermissionsApi for InMemoryForms {
    async fn list_permissions(
        &self,
        token: &str,
        file_id: &str,
    ) -> Result<Vec<Permission>, FormsError> {
        self.check_token(token)?;
        self.permissions
            .get(file_id)
            .map(|p| p.clone())
            .ok_or_else(|| Self::not_found(file_id))
    }

    async fn create_permission(
        &self,
        token: &str,
        file_id: &str,
        permission: &Permission,
    ) -> Result<Permission, FormsError> {
        self.check_token(token)?;
        let mut entry = self
            .permissions
            .get_mut(file_id)
            .ok_or_else(|| Self::not_found(file_id))?;

        let mut created = permission.clone();
        created.id = Some(if permission.is_public_reader() {
            "anyoneWithLink".to_string()
        } else {
            self.next_id("perm-")
        });
        entry.push(created.clone());
        Ok(created)
    }
}
