use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::api::ContentClient;
use crate::content::{
    load_category_page, load_home, Accordion, CategoryCard, CategoryView, QuestionPanel,
};
use crate::lang::Lang;
use crate::server::app::AppState;
use crate::server::deserializers::empty_string_as_none;

use super::{ApiResponse, Chrome};

#[derive(Deserialize)]
struct CategoryQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    open: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
struct HomePage {
    chrome: Chrome,
    cards: Vec<CategoryCard>,
    notice: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "category.html")]
struct CategoryPage {
    chrome: Chrome,
    category: CategoryCard,
    panels: Vec<QuestionPanel>,
    notice: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "category_not_found.html")]
struct CategoryNotFoundPage {
    chrome: Chrome,
}

async fn root() -> Redirect {
    Redirect::to(&Lang::En.home_path())
}

async fn home(lang: Lang, uri: Uri, State(client): State<ContentClient>) -> ApiResponse<HomePage> {
    let view = load_home(&client, lang).await;
    Ok(HomePage {
        chrome: Chrome::new(lang, &uri.to_string()),
        cards: view.cards,
        notice: view.notice,
    })
}

async fn category(
    lang: Lang,
    uri: Uri,
    State(client): State<ContentClient>,
    Path((_, category_id)): Path<(String, String)>,
    Query(query): Query<CategoryQuery>,
) -> ApiResponse<Response> {
    let accordion = Accordion::from_query(query.open.as_deref());
    let chrome = Chrome::new(lang, &uri.to_string());
    let page = match load_category_page(&client, lang, &category_id, &accordion).await {
        CategoryView::NotFound => {
            (StatusCode::NOT_FOUND, CategoryNotFoundPage { chrome }).into_response()
        }
        CategoryView::Found {
            category,
            panels,
            notice,
        } => CategoryPage {
            chrome,
            category,
            panels,
            notice,
        }
        .into_response(),
    };
    Ok(page)
}

async fn admin_entry(lang: Lang) -> Redirect {
    Redirect::to(&lang.dashboard_path())
}

pub fn public_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/{lang}", get(home))
        .route("/{lang}/admin", get(admin_entry))
        .route("/{lang}/{category_id}", get(category))
        .with_state(state)
}
