//! Admin form state.
//!
//! Every form owns its field values, a fixed-shape error record with one
//! optional message per field, and a [`FormStatus`]. Validation reports every
//! failing field at once; a submission only reaches the remote service when
//! the whole form is valid.

mod admin;
mod category;
mod icon;
mod question;

pub use admin::{AdminLoginErrors, AdminLoginForm, AdminRegisterErrors, AdminRegisterForm};
pub use category::{
    delete_category, CategoryErrors, CategoryField, CategoryFields, CategoryForm, DEFAULT_COLOR,
};
pub use icon::{accept_icon, upload_type, Icon, IconRejection, MAX_ICON_BYTES};
pub use question::{
    delete_question, QuestionErrors, QuestionField, QuestionFields, QuestionFilter, QuestionForm,
};

use std::future::Future;

use crate::api::ApiError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormStatus {
    pub is_loading: bool,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

impl FormStatus {
    pub fn clear_messages(&mut self) {
        self.success_message = None;
        self.error_message = None;
    }

    pub fn succeed(&mut self, message: impl Into<String>) {
        self.success_message = Some(message.into());
        self.error_message = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.success_message = None;
        self.error_message = Some(message.into());
    }

    /// Runs `call` with `is_loading` raised. The flag is lowered when the
    /// call finishes or the future is dropped midway.
    pub async fn while_loading<T, F>(&mut self, call: F) -> T
    where
        F: Future<Output = T>,
    {
        let _loading = Loading::start(self);
        call.await
    }

    /// Records a finished request: the service's message on success, the
    /// displayable error (or `fallback`) on failure.
    pub fn settle(&mut self, result: Result<String, ApiError>, fallback: &str) -> bool {
        match result {
            Ok(message) => {
                self.succeed(message);
                true
            }
            Err(err) => {
                self.fail(err.user_message(fallback));
                false
            }
        }
    }
}

struct Loading<'a>(&'a mut FormStatus);

impl<'a> Loading<'a> {
    fn start(status: &'a mut FormStatus) -> Self {
        status.is_loading = true;
        Loading(status)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.is_loading = false;
    }
}

/// What happened to a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A request from this form is already in flight.
    Busy,
    /// Client-side validation failed; nothing was sent.
    Invalid,
    /// The request was not sent or was rejected; values are kept.
    Failed,
    Succeeded,
}

impl SubmitOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmitOutcome::Busy => "busy",
            SubmitOutcome::Invalid => "invalid",
            SubmitOutcome::Failed => "failed",
            SubmitOutcome::Succeeded => "succeeded",
        }
    }
}

pub(crate) fn required(value: &str, message: &str) -> Option<String> {
    value.trim().is_empty().then(|| message.to_owned())
}

/// Two-step delete safeguard: the first click arms the confirmation for one
/// id, a second click on the same id performs the delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteConfirm {
    armed: Option<String>,
}

impl DeleteConfirm {
    pub fn armed(id: impl Into<String>) -> Self {
        Self {
            armed: Some(id.into()),
        }
    }

    /// Returns `true` when this click confirms a previously armed delete.
    pub fn click(&mut self, id: &str) -> bool {
        if self.is_armed(id) {
            self.armed = None;
            true
        } else {
            self.armed = Some(id.to_owned());
            false
        }
    }

    pub fn cancel(&mut self) {
        self.armed = None;
    }

    pub fn is_armed(&self, id: &str) -> bool {
        self.armed.as_deref() == Some(id)
    }

    pub fn armed_id(&self) -> Option<&str> {
        self.armed.as_deref()
    }
}
