use secrecy::SecretString;

use super::{required, FormStatus, SubmitOutcome};
use crate::api::{ApiError, ContentClient, Question, QuestionPayload, AUTH_REQUIRED};
use crate::richtext::{AnswerField, RichTextFields};
use crate::telemetry;

const ADD_FAILED: &str = "Failed to add question. Please try again.";
const UPDATE_FAILED: &str = "Failed to update question. Please try again.";
const DELETE_FAILED: &str = "Failed to delete question. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionFields {
    pub category_id: String,
    pub question_en: String,
    pub question_ar: String,
    pub answer_en: String,
    pub answer_ar: String,
    /// Always holds at least one (possibly blank) entry.
    pub links: Vec<String>,
}

impl Default for QuestionFields {
    fn default() -> Self {
        Self {
            category_id: String::new(),
            question_en: String::new(),
            question_ar: String::new(),
            answer_en: String::new(),
            answer_ar: String::new(),
            links: vec![String::new()],
        }
    }
}

impl From<&Question> for QuestionFields {
    fn from(question: &Question) -> Self {
        let links = if question.links.is_empty() {
            vec![String::new()]
        } else {
            question.links.clone()
        };
        Self {
            category_id: question.category_id().unwrap_or_default().to_owned(),
            question_en: question.question_en.clone(),
            question_ar: question.question_ar.clone(),
            answer_en: question.answer_en.clone(),
            answer_ar: question.answer_ar.clone(),
            links,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionErrors {
    pub category_id: Option<String>,
    pub question_en: Option<String>,
    pub question_ar: Option<String>,
    pub answer_en: Option<String>,
    pub answer_ar: Option<String>,
}

impl QuestionErrors {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionField {
    Category,
    QuestionEn,
    QuestionAr,
    AnswerEn,
    AnswerAr,
}

impl From<AnswerField> for QuestionField {
    fn from(field: AnswerField) -> Self {
        match field {
            AnswerField::AnswerEn => QuestionField::AnswerEn,
            AnswerField::AnswerAr => QuestionField::AnswerAr,
        }
    }
}

/// Add form, or the editor of an existing question when `target` is set.
#[derive(Debug, Clone, Default)]
pub struct QuestionForm {
    pub fields: QuestionFields,
    pub errors: QuestionErrors,
    pub status: FormStatus,
    target: Option<String>,
}

impl QuestionForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editing(question: &Question) -> Self {
        Self {
            fields: QuestionFields::from(question),
            target: Some(question.id.clone()),
            ..Self::default()
        }
    }

    pub fn with_fields(mut fields: QuestionFields, target: Option<String>) -> Self {
        if fields.links.is_empty() {
            fields.links.push(String::new());
        }
        Self {
            fields,
            target,
            ..Self::default()
        }
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.target.is_some()
    }

    pub fn edit(&mut self, field: QuestionField, value: impl Into<String>) {
        let value = value.into();
        match field {
            QuestionField::Category => {
                self.fields.category_id = value;
                self.errors.category_id = None;
            }
            QuestionField::QuestionEn => {
                self.fields.question_en = value;
                self.errors.question_en = None;
            }
            QuestionField::QuestionAr => {
                self.fields.question_ar = value;
                self.errors.question_ar = None;
            }
            QuestionField::AnswerEn => {
                self.fields.answer_en = value;
                self.errors.answer_en = None;
            }
            QuestionField::AnswerAr => {
                self.fields.answer_ar = value;
                self.errors.answer_ar = None;
            }
        }
        self.status.clear_messages();
    }

    pub fn add_link(&mut self) {
        self.fields.links.push(String::new());
    }

    pub fn set_link(&mut self, index: usize, value: impl Into<String>) {
        if let Some(link) = self.fields.links.get_mut(index) {
            *link = value.into();
        }
    }

    /// The last remaining link field is never removed.
    pub fn remove_link(&mut self, index: usize) {
        if self.fields.links.len() > 1 && index < self.fields.links.len() {
            self.fields.links.remove(index);
        }
    }

    /// Links as sent to the service: trimmed, blanks dropped.
    pub fn submitted_links(&self) -> Vec<String> {
        self.fields
            .links
            .iter()
            .map(|link| link.trim())
            .filter(|link| !link.is_empty())
            .map(str::to_owned)
            .collect()
    }

    pub fn validate(&mut self) -> bool {
        let fields = &self.fields;
        self.errors = QuestionErrors {
            category_id: required(&fields.category_id, "Please select a category"),
            question_en: required(&fields.question_en, "English question is required"),
            question_ar: required(&fields.question_ar, "Arabic question is required"),
            answer_en: required(&fields.answer_en, "English answer is required"),
            answer_ar: required(&fields.answer_ar, "Arabic answer is required"),
        };
        self.errors.is_empty()
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    fn payload(&self) -> QuestionPayload {
        QuestionPayload {
            category_id: self.fields.category_id.trim().to_owned(),
            question_en: self.fields.question_en.trim().to_owned(),
            question_ar: self.fields.question_ar.trim().to_owned(),
            answer_en: self.fields.answer_en.trim().to_owned(),
            answer_ar: self.fields.answer_ar.trim().to_owned(),
            links: self.submitted_links(),
        }
    }

    /// Success starts the form over outside edit mode, like a cancel that
    /// keeps the status message.
    pub async fn submit(
        &mut self,
        client: &ContentClient,
        token: Option<&SecretString>,
    ) -> SubmitOutcome {
        let form = if self.is_editing() {
            "question_update"
        } else {
            "question_create"
        };
        let outcome = self.run_submit(client, token).await;
        telemetry::record_submission(form, outcome.as_str());
        outcome
    }

    async fn run_submit(
        &mut self,
        client: &ContentClient,
        token: Option<&SecretString>,
    ) -> SubmitOutcome {
        if self.status.is_loading {
            return SubmitOutcome::Busy;
        }
        self.status.clear_messages();
        if !self.validate() {
            return SubmitOutcome::Invalid;
        }
        let Some(token) = token else {
            self.status.fail(AUTH_REQUIRED);
            return SubmitOutcome::Failed;
        };
        let payload = self.payload();

        let (result, fallback) = match self.target.clone() {
            Some(id) => {
                let result = self
                    .status
                    .while_loading(client.update_question(token, &id, &payload))
                    .await
                    .map(|ack| ack.message_or("Question updated successfully!"));
                (result, UPDATE_FAILED)
            }
            None => {
                let result = self
                    .status
                    .while_loading(client.create_question(token, &payload))
                    .await
                    .map(|ack| ack.message_or("Question added successfully!"));
                (result, ADD_FAILED)
            }
        };

        if !self.status.settle(result, fallback) {
            return SubmitOutcome::Failed;
        }
        let status = std::mem::take(&mut self.status);
        *self = Self {
            status,
            ..Self::default()
        };
        SubmitOutcome::Succeeded
    }
}

impl RichTextFields for QuestionForm {
    fn answer_html(&self, field: AnswerField) -> &str {
        match field {
            AnswerField::AnswerEn => &self.fields.answer_en,
            AnswerField::AnswerAr => &self.fields.answer_ar,
        }
    }

    fn set_answer_html(&mut self, field: AnswerField, html: String) {
        self.edit(field.into(), html);
    }
}

pub async fn delete_question(
    client: &ContentClient,
    token: Option<&SecretString>,
    id: &str,
    status: &mut FormStatus,
) -> SubmitOutcome {
    if status.is_loading {
        return SubmitOutcome::Busy;
    }
    status.clear_messages();
    let outcome = match token {
        None => {
            status.fail(ApiError::Unauthenticated.user_message(DELETE_FAILED));
            SubmitOutcome::Failed
        }
        Some(token) => {
            let result = status
                .while_loading(client.delete_question(token, id))
                .await
                .map(|ack| ack.message_or("Question deleted successfully!"));
            if status.settle(result, DELETE_FAILED) {
                SubmitOutcome::Succeeded
            } else {
                SubmitOutcome::Failed
            }
        }
    };
    telemetry::record_submission("question_delete", outcome.as_str());
    outcome
}

/// Search box and category selector of the question list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionFilter {
    pub search: String,
    pub category: Option<String>,
}

impl QuestionFilter {
    /// English text is matched case-insensitively, Arabic text as a plain
    /// substring.
    pub fn matches(&self, question: &Question) -> bool {
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if !question.belongs_to(category) {
                return false;
            }
        }
        let term = self.search.trim();
        if term.is_empty() {
            return true;
        }
        let lowered = term.to_lowercase();
        question.question_en.to_lowercase().contains(&lowered)
            || question.answer_en.to_lowercase().contains(&lowered)
            || question.question_ar.contains(term)
            || question.answer_ar.contains(term)
    }

    pub fn selects(&self, category_id: &str) -> bool {
        self.category.as_deref() == Some(category_id)
    }

    pub fn apply<'a>(&self, questions: &'a [Question]) -> Vec<&'a Question> {
        questions.iter().filter(|q| self.matches(q)).collect()
    }
}
