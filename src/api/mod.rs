//! Client for the remote Learn2UX content service.
//!
//! Every call goes straight to the service: reads are sent with caching
//! disabled and nothing is kept between calls. Authenticated operations take
//! the admin bearer token explicitly.

mod error;
mod models;

pub use error::{ApiError, AUTH_REQUIRED, UNEXPECTED_ERROR};
pub use models::{
    Ack, Category, CategoryPayload, CategoryRef, CategorySummary, IconType, Question,
    QuestionPayload,
};

use std::time::Duration;

use reqwest::header::CACHE_CONTROL;
use reqwest::{RequestBuilder, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;

use crate::settings::Settings;
use crate::telemetry;
use error::ErrorBody;
use models::{Envelope, LoginData, LoginRequest, RegisterRequest};

#[derive(Debug, Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    base: Url,
}

impl ContentClient {
    /// `base_url` is the service's `/api/` root, e.g. `https://host/api/`.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base =
            Url::parse(base_url).map_err(|_| ApiError::InvalidBaseUrl(base_url.to_owned()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_owned()));
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        Self::new(&settings.api_base_url, settings.request_timeout())
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn read(&self, url: Url) -> RequestBuilder {
        self.http.get(url).header(CACHE_CONTROL, "no-cache")
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let result = execute(request).await;
        telemetry::record_api_call(operation, result.is_ok());
        match &result {
            Ok(_) => tracing::debug!(operation, "remote call succeeded"),
            Err(err) => tracing::warn!(operation, "remote call failed: {err}"),
        }
        result
    }

    async fn mutate<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Ack<T>, ApiError> {
        self.send::<serde_json::Value>(operation, request)
            .await
            .map(Ack::from_envelope)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let url = self.endpoint(&["categories"]);
        let envelope: Envelope<Vec<Category>> =
            self.send("list_categories", self.read(url)).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Read failures are logged and reported as an empty list.
    pub async fn list_categories_or_empty(&self) -> Vec<Category> {
        self.list_categories().await.unwrap_or_else(|err| {
            tracing::warn!("Error fetching categories: {err}");
            Vec::new()
        })
    }

    /// `Ok(None)` when the service does not know the id.
    pub async fn get_category(&self, id: &str) -> Result<Option<Category>, ApiError> {
        let url = self.endpoint(&["categories", id]);
        match self.send::<Category>("get_category", self.read(url)).await {
            Ok(envelope) => Ok(envelope.data),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn get_category_or_none(&self, id: &str) -> Option<Category> {
        self.get_category(id).await.unwrap_or_else(|err| {
            tracing::warn!("Error fetching category {id}: {err}");
            None
        })
    }

    pub async fn create_category(
        &self,
        token: &SecretString,
        payload: &CategoryPayload,
    ) -> Result<Ack<Category>, ApiError> {
        let request = self
            .http
            .post(self.endpoint(&["categories"]))
            .bearer_auth(token.expose_secret())
            .json(payload);
        self.mutate("create_category", request).await
    }

    pub async fn update_category(
        &self,
        token: &SecretString,
        id: &str,
        payload: &CategoryPayload,
    ) -> Result<Ack<Category>, ApiError> {
        let request = self
            .http
            .put(self.endpoint(&["categories", id]))
            .bearer_auth(token.expose_secret())
            .json(payload);
        self.mutate("update_category", request).await
    }

    pub async fn delete_category(
        &self,
        token: &SecretString,
        id: &str,
    ) -> Result<Ack<IgnoredAny>, ApiError> {
        let request = self
            .http
            .delete(self.endpoint(&["categories", id]))
            .bearer_auth(token.expose_secret());
        self.mutate("delete_category", request).await
    }

    /// Admin views pass their token, the public pages read anonymously.
    pub async fn list_questions(
        &self,
        token: Option<&SecretString>,
    ) -> Result<Vec<Question>, ApiError> {
        let mut request = self.read(self.endpoint(&["questions"]));
        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }
        let envelope: Envelope<Vec<Question>> = self.send("list_questions", request).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// The service has no category filter; the full list is fetched and
    /// filtered here.
    pub async fn questions_by_category(
        &self,
        category_id: &str,
        token: Option<&SecretString>,
    ) -> Result<Vec<Question>, ApiError> {
        let questions = self.list_questions(token).await?;
        Ok(questions
            .into_iter()
            .filter(|question| question.belongs_to(category_id))
            .collect())
    }

    pub async fn create_question(
        &self,
        token: &SecretString,
        payload: &QuestionPayload,
    ) -> Result<Ack<Question>, ApiError> {
        let request = self
            .http
            .post(self.endpoint(&["questions"]))
            .bearer_auth(token.expose_secret())
            .json(payload);
        self.mutate("create_question", request).await
    }

    pub async fn update_question(
        &self,
        token: &SecretString,
        id: &str,
        payload: &QuestionPayload,
    ) -> Result<Ack<Question>, ApiError> {
        let request = self
            .http
            .put(self.endpoint(&["questions", id]))
            .bearer_auth(token.expose_secret())
            .json(payload);
        self.mutate("update_question", request).await
    }

    pub async fn delete_question(
        &self,
        token: &SecretString,
        id: &str,
    ) -> Result<Ack<IgnoredAny>, ApiError> {
        let request = self
            .http
            .delete(self.endpoint(&["questions", id]))
            .bearer_auth(token.expose_secret());
        self.mutate("delete_question", request).await
    }

    /// Exchanges admin credentials for a bearer token.
    pub async fn admin_login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SecretString, ApiError> {
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        let envelope: Envelope<LoginData> = self
            .send("admin_login", self.post_json(&["admin", "login"], &body))
            .await?;
        envelope
            .data
            .and_then(|data| data.token)
            .filter(|token| !token.is_empty())
            .map(SecretString::from)
            .ok_or_else(|| ApiError::Decode("login response carries no token".to_owned()))
    }

    pub async fn admin_register(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Ack<IgnoredAny>, ApiError> {
        let body = RegisterRequest {
            username,
            password: password.expose_secret(),
        };
        let request = self.post_json(&["admin", "register"], &body);
        self.mutate("admin_register", request).await
    }

    fn post_json<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> RequestBuilder {
        self.http.post(self.endpoint(segments)).json(body)
    }
}

async fn execute<T: DeserializeOwned>(request: RequestBuilder) -> Result<Envelope<T>, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        return Err(ApiError::Remote {
            status,
            message: ErrorBody::parse(&bytes).into_message(),
        });
    }
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Envelope::default());
    }
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
}
