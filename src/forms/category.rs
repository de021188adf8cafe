use secrecy::SecretString;

use super::icon::{Icon, IconRejection};
use super::{required, FormStatus, SubmitOutcome};
use crate::api::{ApiError, Category, CategoryPayload, ContentClient, AUTH_REQUIRED};
use crate::telemetry;

pub const DEFAULT_COLOR: &str = "#000000";

const ADD_FAILED: &str = "Failed to add category. Please try again.";
const UPDATE_FAILED: &str = "Failed to update category. Please try again.";
const DELETE_FAILED: &str = "Failed to delete category. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFields {
    pub title_en: String,
    pub title_ar: String,
    pub description_en: String,
    pub description_ar: String,
    pub text_color: String,
    pub border_color: String,
    pub icon: Option<Icon>,
}

impl Default for CategoryFields {
    fn default() -> Self {
        Self {
            title_en: String::new(),
            title_ar: String::new(),
            description_en: String::new(),
            description_ar: String::new(),
            text_color: DEFAULT_COLOR.to_owned(),
            border_color: DEFAULT_COLOR.to_owned(),
            icon: None,
        }
    }
}

impl From<&Category> for CategoryFields {
    fn from(category: &Category) -> Self {
        Self {
            title_en: category.title_en.clone(),
            title_ar: category.title_ar.clone(),
            description_en: category.description_en.clone(),
            description_ar: category.description_ar.clone(),
            text_color: category.text_color.clone(),
            border_color: category.border_color.clone(),
            icon: Some(Icon::new(category.icon.clone(), category.icon_type)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryErrors {
    pub title_en: Option<String>,
    pub title_ar: Option<String>,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub text_color: Option<String>,
    pub border_color: Option<String>,
    pub icon: Option<String>,
}

impl CategoryErrors {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    TitleEn,
    TitleAr,
    DescriptionEn,
    DescriptionAr,
    TextColor,
    BorderColor,
}

/// Add form, or the editor of an existing category when `target` is set.
#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub fields: CategoryFields,
    pub errors: CategoryErrors,
    pub status: FormStatus,
    target: Option<String>,
}

impl CategoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor preloaded with `category`; the stored icon is kept unless a
    /// new one is attached.
    pub fn editing(category: &Category) -> Self {
        Self {
            fields: CategoryFields::from(category),
            target: Some(category.id.clone()),
            ..Self::default()
        }
    }

    /// Rebuilds a form from submitted values.
    pub fn with_fields(fields: CategoryFields, target: Option<String>) -> Self {
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

    pub fn edit(&mut self, field: CategoryField, value: impl Into<String>) {
        let value = value.into();
        match field {
            CategoryField::TitleEn => {
                self.fields.title_en = value;
                self.errors.title_en = None;
            }
            CategoryField::TitleAr => {
                self.fields.title_ar = value;
                self.errors.title_ar = None;
            }
            CategoryField::DescriptionEn => {
                self.fields.description_en = value;
                self.errors.description_en = None;
            }
            CategoryField::DescriptionAr => {
                self.fields.description_ar = value;
                self.errors.description_ar = None;
            }
            CategoryField::TextColor => {
                self.fields.text_color = value;
                self.errors.text_color = None;
            }
            CategoryField::BorderColor => {
                self.fields.border_color = value;
                self.errors.border_color = None;
            }
        }
        self.status.clear_messages();
    }

    /// Stores an accepted upload. A rejected one only sets the icon error and
    /// leaves the current icon in place.
    pub fn attach_icon(&mut self, upload: Result<Icon, IconRejection>) {
        match upload {
            Ok(icon) => {
                self.fields.icon = Some(icon);
                self.errors.icon = None;
            }
            Err(rejection) => self.errors.icon = Some(rejection.to_string()),
        }
        self.status.clear_messages();
    }

    pub fn validate(&mut self) -> bool {
        let fields = &self.fields;
        self.errors = CategoryErrors {
            title_en: required(&fields.title_en, "English title is required"),
            title_ar: required(&fields.title_ar, "Arabic title is required"),
            description_en: required(&fields.description_en, "English description is required"),
            description_ar: required(&fields.description_ar, "Arabic description is required"),
            text_color: required(&fields.text_color, "Text color is required"),
            border_color: required(&fields.border_color, "Border color is required"),
            icon: match &fields.icon {
                Some(icon) if !icon.source.trim().is_empty() => None,
                _ => Some("Icon image is required".to_owned()),
            },
        };
        self.errors.is_empty()
    }

    /// Restores defaults and leaves edit mode.
    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    fn payload(&self) -> Option<CategoryPayload> {
        let icon = self.fields.icon.as_ref()?;
        Some(CategoryPayload {
            title_en: self.fields.title_en.trim().to_owned(),
            title_ar: self.fields.title_ar.trim().to_owned(),
            description_en: self.fields.description_en.trim().to_owned(),
            description_ar: self.fields.description_ar.trim().to_owned(),
            text_color: self.fields.text_color.trim().to_owned(),
            border_color: self.fields.border_color.trim().to_owned(),
            icon: icon.source.clone(),
            icon_type: icon.icon_type,
        })
    }

    /// Validates and sends the form. Success resets the fields and leaves
    /// edit mode; the status keeps the service's message.
    pub async fn submit(
        &mut self,
        client: &ContentClient,
        token: Option<&SecretString>,
    ) -> SubmitOutcome {
        let form = if self.is_editing() {
            "category_update"
        } else {
            "category_create"
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
        let Some(payload) = self.payload() else {
            return SubmitOutcome::Invalid;
        };

        let (result, fallback) = match self.target.clone() {
            Some(id) => {
                let result = self
                    .status
                    .while_loading(client.update_category(token, &id, &payload))
                    .await
                    .map(|ack| ack.message_or("Category updated successfully!"));
                (result, UPDATE_FAILED)
            }
            None => {
                let result = self
                    .status
                    .while_loading(client.create_category(token, &payload))
                    .await
                    .map(|ack| ack.message_or("Category added successfully!"));
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

/// Deletes a category once the two-step confirmation has fired.
pub async fn delete_category(
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
                .while_loading(client.delete_category(token, id))
                .await
                .map(|ack| ack.message_or("Category deleted successfully!"));
            if status.settle(result, DELETE_FAILED) {
                SubmitOutcome::Succeeded
            } else {
                SubmitOutcome::Failed
            }
        }
    };
    telemetry::record_submission("category_delete", outcome.as_str());
    outcome
}
