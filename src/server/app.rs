use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, FromRef};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::routes::{self, admin_router, category_router, public_router, questions_router};
use crate::api::ContentClient;
use crate::settings::Settings;
use crate::telemetry;

/// Request cap for every route but the category forms, which bound each
/// multipart field themselves.
const BODY_LIMIT: usize = 8 * 1024 * 1024;

#[derive(FromRef, Clone)]
pub struct AppState {
    client: ContentClient,
    settings: Arc<Settings>,
}

impl AppState {
    pub fn new(client: ContentClient, settings: Settings) -> Self {
        Self {
            client,
            settings: Arc::new(settings),
        }
    }

    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let client = ContentClient::from_settings(&settings)?;
        Ok(Self::new(client, settings))
    }
}

pub fn router(state: AppState) -> Router {
    let static_dir = state.settings.static_dir.clone();
    Router::new()
        .route("/metrics", get(metrics))
        .nest_service("/static", ServeDir::new(static_dir))
        .merge(public_router(state.clone()))
        .merge(admin_router(state.clone()))
        .merge(category_router(state.clone()))
        .merge(questions_router(state))
        .fallback(|| async {
            tracing::info!("Fallback");
            StatusCode::NOT_FOUND
        })
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let addr = settings.bind_address.clone();
    let state = AppState::from_settings(settings)?;
    let app = router(state);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Serving on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics() -> routes::ApiResponse<impl IntoResponse> {
    let (content_type, body) = telemetry::gather_metrics()?;
    Ok(([(header::CONTENT_TYPE, content_type)], body))
}
