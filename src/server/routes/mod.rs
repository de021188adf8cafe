mod admin;
mod categories;
mod public;
mod questions;

pub use admin::admin_router;
pub use categories::category_router;
pub use public::public_router;
pub use questions::questions_router;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::lang::{Dictionary, Lang};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("page not found")]
    NotFound,
    #[error("failed to encode metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            AppError::Metrics(err) => {
                tracing::error!("{err}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

pub type ApiResponse<T> = Result<T, AppError>;

/// The locale prefix of the request path; any other prefix is a 404.
impl<S> FromRequestParts<S> for Lang
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Lang::from_path(parts.uri.path()).ok_or(AppError::NotFound)
    }
}

/// Fields every page template shares with `base.html`.
pub(crate) struct Chrome {
    pub lang: Lang,
    pub dict: &'static Dictionary,
    pub switch_href: String,
}

impl Chrome {
    pub fn new(lang: Lang, path: &str) -> Self {
        Self {
            lang,
            dict: lang.dictionary(),
            switch_href: lang.switch_path(path),
        }
    }
}
