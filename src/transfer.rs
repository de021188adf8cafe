//! CSV export and import of the whole content set.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{
    ApiError, Category, CategoryPayload, ContentClient, IconType, Question, QuestionPayload,
};

pub const CATEGORIES_FILE: &str = "categories.csv";
pub const QUESTIONS_FILE: &str = "questions.csv";

#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: String,
    pub title_en: String,
    pub title_ar: String,
    pub description_en: String,
    pub description_ar: String,
    pub text_color: String,
    pub border_color: String,
    pub icon: String,
    pub icon_type: IconType,
}

impl From<&Category> for CategoryRecord {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
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

impl From<CategoryRecord> for CategoryPayload {
    fn from(record: CategoryRecord) -> Self {
        Self {
            title_en: record.title_en,
            title_ar: record.title_ar,
            description_en: record.description_en,
            description_ar: record.description_ar,
            text_color: record.text_color,
            border_color: record.border_color,
            icon: record.icon,
            icon_type: record.icon_type,
        }
    }
}

/// A question row. Links are stored space separated in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub category_id: String,
    pub question_en: String,
    pub question_ar: String,
    pub answer_en: String,
    pub answer_ar: String,
    #[serde(default)]
    pub links: String,
}

impl From<&Question> for QuestionRecord {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            category_id: question.category_id().unwrap_or_default().to_owned(),
            question_en: question.question_en.clone(),
            question_ar: question.question_ar.clone(),
            answer_en: question.answer_en.clone(),
            answer_ar: question.answer_ar.clone(),
            links: question.links.join(" "),
        }
    }
}

impl QuestionRecord {
    pub fn links(&self) -> Vec<String> {
        self.links.split_whitespace().map(str::to_owned).collect()
    }

    fn into_payload(self, category_id: String) -> QuestionPayload {
        let links = self.links();
        QuestionPayload {
            category_id,
            question_en: self.question_en,
            question_ar: self.question_ar,
            answer_en: self.answer_en,
            answer_ar: self.answer_ar,
            links,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferSummary {
    pub categories: usize,
    pub questions: usize,
    /// Questions whose category could not be resolved.
    pub skipped: usize,
}

pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), TransferError> {
    let file = File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, TransferError> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        out.push(record?);
    }
    Ok(out)
}

pub async fn export_to(
    client: &ContentClient,
    dir: &Path,
) -> Result<TransferSummary, TransferError> {
    let categories = client.list_categories().await?;
    let questions = client.list_questions(None).await?;
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    let category_records: Vec<CategoryRecord> =
        categories.iter().map(CategoryRecord::from).collect();
    let question_records: Vec<QuestionRecord> =
        questions.iter().map(QuestionRecord::from).collect();
    write_records(&dir.join(CATEGORIES_FILE), &category_records)?;
    write_records(&dir.join(QUESTIONS_FILE), &question_records)?;
    tracing::info!(
        categories = category_records.len(),
        questions = question_records.len(),
        "exported content to {}",
        dir.display()
    );
    Ok(TransferSummary {
        categories: category_records.len(),
        questions: question_records.len(),
        skipped: 0,
    })
}

/// Creates every exported category, then every question under the id the
/// service assigned to its category.
pub async fn import_from(
    client: &ContentClient,
    token: &SecretString,
    dir: &Path,
) -> Result<TransferSummary, TransferError> {
    let categories: Vec<CategoryRecord> = read_records(&dir.join(CATEGORIES_FILE))?;
    let questions: Vec<QuestionRecord> = read_records(&dir.join(QUESTIONS_FILE))?;

    let mut ids: HashMap<String, String> = HashMap::new();
    let mut unresolved: Vec<(String, String)> = Vec::new();
    for record in categories.iter().cloned() {
        let old_id = record.id.clone();
        let title_en = record.title_en.clone();
        let ack = client.create_category(token, &CategoryPayload::from(record)).await?;
        match ack.data {
            Some(created) => {
                ids.insert(old_id, created.id);
            }
            None => unresolved.push((old_id, title_en)),
        }
    }
    // the service did not echo the created documents, match them by title
    if !unresolved.is_empty() {
        let existing = client.list_categories().await?;
        for (old_id, title_en) in unresolved {
            if let Some(category) = existing.iter().find(|c| c.title_en == title_en) {
                ids.insert(old_id, category.id.clone());
            }
        }
    }

    let mut summary = TransferSummary {
        categories: categories.len(),
        ..TransferSummary::default()
    };
    for record in questions {
        let Some(category_id) = ids.get(&record.category_id).cloned() else {
            tracing::warn!(
                question = %record.id,
                category = %record.category_id,
                "skipping question with unknown category"
            );
            summary.skipped += 1;
            continue;
        };
        client
            .create_question(token, &record.into_payload(category_id))
            .await?;
        summary.questions += 1;
    }
    tracing::info!(?summary, "imported content from {}", dir.display());
    Ok(summary)
}
