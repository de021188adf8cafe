//! Admin session kept in the `adminToken` cookie.
//!
//! The token is only checked for presence; the remote service rejects it
//! when it has expired.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration;
use secrecy::{ExposeSecret, SecretString};

use crate::lang::Lang;

pub const TOKEN_COOKIE: &str = "adminToken";
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Default)]
pub struct Session {
    token: Option<SecretString>,
}

impl Session {
    pub fn from_jar(jar: &CookieJar) -> Self {
        let token = jar
            .get(TOKEN_COOKIE)
            .map(|cookie| cookie.value().trim())
            .filter(|value| !value.is_empty())
            .map(|value| SecretString::from(value.to_owned()));
        Self { token }
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn into_token(self) -> Option<SecretString> {
        self.token
    }
}

/// Cookie storing a freshly issued token.
pub fn login_cookie(token: &SecretString, production: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token.expose_secret().to_owned()))
        .path("/")
        .http_only(true)
        .secure(production)
        .same_site(SameSite::Strict)
        .max_age(Duration::days(TOKEN_TTL_DAYS))
        .build()
}

pub fn logout(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(TOKEN_COOKIE).path("/"))
}

/// Gate of every admin-only handler. Without a token the request is
/// redirected to the login page of its locale and the handler never runs.
#[derive(Debug)]
pub struct AdminSession {
    pub lang: Lang,
    pub token: SecretString,
}

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let lang = Lang::from_path(parts.uri.path())
            .ok_or_else(|| StatusCode::NOT_FOUND.into_response())?;
        let jar = CookieJar::from_headers(&parts.headers);
        match Session::from_jar(&jar).into_token() {
            Some(token) => Ok(Self { lang, token }),
            None => {
                tracing::debug!(path = parts.uri.path(), "no admin token, redirecting to login");
                Err(Redirect::to(&lang.login_path()).into_response())
            }
        }
    }
}
