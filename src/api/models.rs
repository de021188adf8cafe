use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::lang::Lang;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconType {
    Svg,
    Png,
}

impl IconType {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/svg+xml" => Some(IconType::Svg),
            "image/png" => Some(IconType::Png),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            IconType::Svg => "image/svg+xml",
            IconType::Png => "image/png",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IconType::Svg => "svg",
            IconType::Png => "png",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "svg" => Some(IconType::Svg),
            "png" => Some(IconType::Png),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub title_en: String,
    pub title_ar: String,
    pub description_en: String,
    pub description_ar: String,
    #[serde(default, deserialize_with = "deserialize_number_from_string")]
    pub question_number: i64,
    pub text_color: String,
    pub border_color: String,
    pub icon: String,
    pub icon_type: IconType,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Category {
    pub fn title(&self, lang: Lang) -> &str {
        lang.pick(&self.title_en, &self.title_ar)
    }

    pub fn description(&self, lang: Lang) -> &str {
        lang.pick(&self.description_en, &self.description_ar)
    }
}

/// The category a question points at. Listing endpoints populate it with the
/// category document, other endpoints send the bare id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(String),
    Populated(CategorySummary),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub title_ar: Option<String>,
}

impl CategoryRef {
    pub fn id(&self) -> &str {
        match self {
            CategoryRef::Id(id) => id,
            CategoryRef::Populated(summary) => &summary.id,
        }
    }

    pub fn title(&self, lang: Lang) -> Option<&str> {
        match self {
            CategoryRef::Id(_) => None,
            CategoryRef::Populated(summary) => match lang {
                Lang::En => summary.title_en.as_deref(),
                Lang::Ar => summary.title_ar.as_deref(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: String,
    /// `None` when the owning category was deleted and the service sends `null`.
    #[serde(rename = "categoryId", default)]
    pub category: Option<CategoryRef>,
    pub question_en: String,
    pub question_ar: String,
    pub answer_en: String,
    pub answer_ar: String,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Question {
    pub fn category_id(&self) -> Option<&str> {
        self.category.as_ref().map(CategoryRef::id)
    }

    pub fn belongs_to(&self, category_id: &str) -> bool {
        self.category_id() == Some(category_id)
    }

    pub fn question(&self, lang: Lang) -> &str {
        lang.pick(&self.question_en, &self.question_ar)
    }

    pub fn answer(&self, lang: Lang) -> &str {
        lang.pick(&self.answer_en, &self.answer_ar)
    }
}

/// Body of category create and update requests. Always sent in full.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub title_en: String,
    pub title_ar: String,
    pub description_en: String,
    pub description_ar: String,
    pub text_color: String,
    pub border_color: String,
    /// URL of a stored icon or a base64 data URI of a fresh upload.
    pub icon: String,
    pub icon_type: IconType,
}

impl From<&Category> for CategoryPayload {
    fn from(category: &Category) -> Self {
        Self {
            title_en: category.title_en.clone(),
            title_ar: category.title_ar.clone(),
            description_en: category.description_en.clone(),
            description_ar: category.description_ar.clone(),
            text_color: category.text_color.clone(),
            border_color: category.border_color.clone(),
            icon: category.icon.clone(),
            icon_type: category.icon_type,
        }
    }
}

/// Body of question create and update requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    pub category_id: String,
    pub question_en: String,
    pub question_ar: String,
    pub answer_en: String,
    pub answer_ar: String,
    /// Omitted from the body when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginData {
    #[serde(default)]
    pub token: Option<String>,
}

/// Success envelope of the remote service: `{ "data": .., "message": .. }`.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self {
            data: None,
            message: None,
        }
    }
}

/// Acknowledgement of a mutating request.
#[derive(Debug, Clone, PartialEq)]
pub struct Ack<T> {
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Ack<T> {
    /// The service's own message, or `default` when it sent none.
    pub fn message_or(&self, default: &str) -> String {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(default)
            .to_owned()
    }
}

impl<T: DeserializeOwned> Ack<T> {
    /// Mutations succeed regardless of what the service echoes back, so the
    /// payload is decoded leniently.
    pub(crate) fn from_envelope(envelope: Envelope<serde_json::Value>) -> Self {
        Self {
            message: envelope.message,
            data: envelope
                .data
                .and_then(|value| serde_json::from_value(value).ok()),
        }
    }
}
