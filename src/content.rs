//! Public content pages: data loading and per-page view state.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::api::{ApiError, Category, ContentClient, Question};
use crate::lang::Lang;
use crate::richtext::{safe_href, RichText};

/// Outcome of a read: the data, or why it could not be loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Loaded(T),
    Failed(String),
}

impl<T: Default> Fetched<T> {
    pub fn from_result(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Fetched::Loaded(value),
            Err(err) => {
                tracing::warn!("read failed: {err}");
                Fetched::Failed(err.to_string())
            }
        }
    }

    /// A failed read shows as empty data plus `notice`.
    pub fn or_notice(self, notice: &str) -> (T, Option<String>) {
        match self {
            Fetched::Loaded(value) => (value, None),
            Fetched::Failed(_) => (T::default(), Some(notice.to_owned())),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Fetched::Loaded(_))
    }
}

/// Expanded questions of a category page, carried in the `open` query
/// parameter as comma separated ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accordion {
    open: BTreeSet<String>,
}

impl Accordion {
    pub fn from_query(open: Option<&str>) -> Self {
        let open = open
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .collect();
        Self { open }
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.open.contains(id)
    }

    /// Copy of this state with only `id` flipped.
    pub fn toggled(&self, id: &str) -> Self {
        let mut open = self.open.clone();
        if !open.remove(id) {
            open.insert(id.to_owned());
        }
        Self { open }
    }

    pub fn to_query(&self) -> String {
        self.open.iter().join(",")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub question_number: i64,
    pub text_color: String,
    pub border_color: String,
    pub icon: String,
    pub href: String,
}

impl CategoryCard {
    pub fn new(category: &Category, lang: Lang) -> Self {
        Self {
            id: category.id.clone(),
            title: category.title(lang).to_owned(),
            description: category.description(lang).to_owned(),
            question_number: category.question_number,
            text_color: category.text_color.clone(),
            border_color: category.border_color.clone(),
            icon: category.icon.clone(),
            href: format!("/{}/{}", lang.code(), category.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionPanel {
    pub id: String,
    pub question: String,
    /// Sanitized answer markup.
    pub answer_html: String,
    pub links: Vec<String>,
    pub open: bool,
    /// `open` query value that flips this panel.
    pub toggle_query: String,
}

impl QuestionPanel {
    pub fn new(question: &Question, lang: Lang, accordion: &Accordion) -> Self {
        Self {
            id: question.id.clone(),
            question: question.question(lang).to_owned(),
            answer_html: RichText::sanitize(question.answer(lang)),
            links: question.links.iter().filter_map(|link| safe_href(link)).collect(),
            open: accordion.is_open(&question.id),
            toggle_query: accordion.toggled(&question.id).to_query(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HomeView {
    pub cards: Vec<CategoryCard>,
    pub notice: Option<String>,
}

pub async fn load_home(client: &ContentClient, lang: Lang) -> HomeView {
    let (categories, notice) = Fetched::from_result(client.list_categories().await)
        .or_notice(lang.dictionary().load_categories_failed);
    HomeView {
        cards: categories
            .iter()
            .map(|category| CategoryCard::new(category, lang))
            .collect(),
        notice,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryView {
    NotFound,
    Found {
        category: CategoryCard,
        panels: Vec<QuestionPanel>,
        notice: Option<String>,
    },
}

/// Loads a category with its questions. The service has no per-category
/// listing, so all questions are fetched and filtered by category id.
pub async fn load_category_page(
    client: &ContentClient,
    lang: Lang,
    category_id: &str,
    accordion: &Accordion,
) -> CategoryView {
    let (category, questions) = tokio::join!(
        client.get_category_or_none(category_id),
        client.questions_by_category(category_id, None)
    );
    let Some(category) = category else {
        return CategoryView::NotFound;
    };
    let (questions, notice) =
        Fetched::from_result(questions).or_notice(lang.dictionary().load_questions_failed);
    CategoryView::Found {
        category: CategoryCard::new(&category, lang),
        panels: questions
            .iter()
            .map(|question| QuestionPanel::new(question, lang, accordion))
            .collect(),
        notice,
    }
}
