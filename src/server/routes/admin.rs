use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use axum_extra::extract::cookie::CookieJar;
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::{Category, ContentClient, Question};
use crate::content::Fetched;
use crate::forms::{
    AdminLoginErrors, AdminLoginForm, AdminRegisterErrors, AdminRegisterForm, CategoryForm,
    DeleteConfirm, FormStatus, QuestionFilter, QuestionForm,
};
use crate::lang::Lang;
use crate::server::app::AppState;
use crate::server::deserializers::empty_string_as_none;
use crate::session::{self, AdminSession};
use crate::settings::Settings;

use super::Chrome;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub(super) enum Tab {
    #[default]
    AddCategory,
    ManageCategories,
    AddQuestion,
    ManageQuestions,
}

// unknown tab names fall back to the first tab instead of failing the query
impl From<String> for Tab {
    fn from(value: String) -> Self {
        match value.as_str() {
            "manage-categories" => Tab::ManageCategories,
            "add-question" => Tab::AddQuestion,
            "manage-questions" => Tab::ManageQuestions,
            _ => Tab::AddCategory,
        }
    }
}

impl Tab {
    pub const ALL: [Tab; 4] = [
        Tab::AddCategory,
        Tab::ManageCategories,
        Tab::AddQuestion,
        Tab::ManageQuestions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::AddCategory => "add-category",
            Tab::ManageCategories => "manage-categories",
            Tab::AddQuestion => "add-question",
            Tab::ManageQuestions => "manage-questions",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::AddCategory => "Add Category",
            Tab::ManageCategories => "Manage Categories",
            Tab::AddQuestion => "Add Question",
            Tab::ManageQuestions => "Manage Questions",
        }
    }
}

#[derive(Deserialize)]
struct DashboardQuery {
    #[serde(default)]
    tab: Tab,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    edit: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    q: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
}

/// A question as listed on the manage tab.
pub(super) struct QuestionRow {
    pub id: String,
    pub question_en: String,
    pub question_ar: String,
    pub category_title: String,
    pub link_count: usize,
}

impl QuestionRow {
    fn new(question: &Question, categories: &[Category]) -> Self {
        let category_title = question
            .category
            .as_ref()
            .and_then(|category| {
                category.title(Lang::En).map(str::to_owned).or_else(|| {
                    categories
                        .iter()
                        .find(|c| c.id == category.id())
                        .map(|c| c.title_en.clone())
                })
            })
            .unwrap_or_else(|| "Uncategorized".to_owned());
        Self {
            id: question.id.clone(),
            question_en: question.question_en.clone(),
            question_ar: question.question_ar.clone(),
            category_title,
            link_count: question.links.len(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub(super) struct DashboardPage {
    chrome: Chrome,
    tab: Tab,
    tabs: [Tab; 4],
    categories: Vec<Category>,
    questions: Vec<QuestionRow>,
    category_form: Option<CategoryForm>,
    question_form: Option<QuestionForm>,
    confirm: DeleteConfirm,
    status: FormStatus,
    filter: QuestionFilter,
    notice: Option<String>,
}

/// State of one dashboard render. Handlers fill in what their action
/// produced, the rest is loaded fresh from the service.
#[derive(Default)]
pub(super) struct Dashboard {
    pub tab: Tab,
    pub category_form: Option<CategoryForm>,
    pub question_form: Option<QuestionForm>,
    pub confirm: DeleteConfirm,
    pub status: FormStatus,
    pub filter: QuestionFilter,
    pub edit: Option<String>,
}

impl Dashboard {
    pub fn new(tab: Tab) -> Self {
        Self {
            tab,
            ..Self::default()
        }
    }

    pub async fn render(self, client: &ContentClient, session: &AdminSession) -> DashboardPage {
        let lang = session.lang;
        let dict = lang.dictionary();
        let (categories, mut notice) = Fetched::from_result(client.list_categories().await)
            .or_notice(dict.load_categories_failed);

        let mut questions = Vec::new();
        if self.tab == Tab::ManageQuestions {
            let (loaded, questions_notice) =
                Fetched::from_result(client.list_questions(Some(&session.token)).await)
                    .or_notice(dict.load_questions_failed);
            notice = notice.or(questions_notice);
            questions = loaded;
        }

        let edit = self.edit.as_deref();
        let category_form = self.category_form.or_else(|| match self.tab {
            Tab::AddCategory => Some(CategoryForm::new()),
            Tab::ManageCategories => edit
                .and_then(|id| categories.iter().find(|c| c.id == id))
                .map(CategoryForm::editing),
            _ => None,
        });
        let question_form = self.question_form.or_else(|| match self.tab {
            Tab::AddQuestion => Some(QuestionForm::new()),
            Tab::ManageQuestions => edit
                .and_then(|id| questions.iter().find(|q| q.id == id))
                .map(QuestionForm::editing),
            _ => None,
        });
        let rows = self
            .filter
            .apply(&questions)
            .into_iter()
            .map(|question| QuestionRow::new(question, &categories))
            .collect();

        let path = format!("{}?tab={}", lang.dashboard_path(), self.tab.as_str());
        DashboardPage {
            chrome: Chrome::new(lang, &path),
            tab: self.tab,
            tabs: Tab::ALL,
            categories,
            questions: rows,
            category_form,
            question_form,
            confirm: self.confirm,
            status: self.status,
            filter: self.filter,
            notice,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
struct LoginPage {
    chrome: Chrome,
    email: String,
    errors: AdminLoginErrors,
    status: FormStatus,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/register.html")]
struct RegisterPage {
    chrome: Chrome,
    username: String,
    errors: AdminRegisterErrors,
    status: FormStatus,
}

#[derive(Deserialize)]
struct LoginInput {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
struct RegisterInput {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

async fn login_page(lang: Lang) -> LoginPage {
    LoginPage {
        chrome: Chrome::new(lang, &lang.login_path()),
        email: String::new(),
        errors: AdminLoginErrors::default(),
        status: FormStatus::default(),
    }
}

async fn login(
    lang: Lang,
    State(client): State<ContentClient>,
    State(settings): State<Arc<Settings>>,
    jar: CookieJar,
    Form(input): Form<LoginInput>,
) -> Response {
    let mut form = AdminLoginForm::new(input.email, SecretString::from(input.password));
    match form.submit(&client).await {
        Some(token) => {
            let jar = jar.add(session::login_cookie(&token, settings.production));
            (jar, Redirect::to(&lang.dashboard_path())).into_response()
        }
        None => LoginPage {
            chrome: Chrome::new(lang, &lang.login_path()),
            email: form.email,
            errors: form.errors,
            status: form.status,
        }
        .into_response(),
    }
}

async fn register_page(lang: Lang) -> RegisterPage {
    RegisterPage {
        chrome: Chrome::new(lang, &format!("/{}/admin/register", lang.code())),
        username: String::new(),
        errors: AdminRegisterErrors::default(),
        status: FormStatus::default(),
    }
}

async fn register(
    lang: Lang,
    State(client): State<ContentClient>,
    Form(input): Form<RegisterInput>,
) -> RegisterPage {
    let mut form = AdminRegisterForm::new(input.username, SecretString::from(input.password));
    form.submit(&client).await;
    RegisterPage {
        chrome: Chrome::new(lang, &format!("/{}/admin/register", lang.code())),
        username: form.username,
        errors: form.errors,
        status: form.status,
    }
}

async fn logout(lang: Lang, jar: CookieJar) -> (CookieJar, Redirect) {
    (session::logout(jar), Redirect::to(&lang.home_path()))
}

async fn dashboard(
    session: AdminSession,
    State(client): State<ContentClient>,
    Query(query): Query<DashboardQuery>,
) -> DashboardPage {
    let dashboard = Dashboard {
        tab: query.tab,
        edit: query.edit,
        filter: QuestionFilter {
            search: query.q.unwrap_or_default(),
            category: query.category,
        },
        ..Dashboard::default()
    };
    dashboard.render(&client, &session).await
}

pub fn admin_router(state: AppState) -> Router {
    Router::new()
        .route("/{lang}/admin/login", get(login_page).post(login))
        .route("/{lang}/admin/register", get(register_page).post(register))
        .route("/{lang}/admin/logout", post(logout))
        .route("/{lang}/admin/dashboard", get(dashboard))
        .with_state(state)
}
