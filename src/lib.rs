pub mod activities;
pub mod auth;
pub mod db;
pub mod listings;
pub mod messages;
pub mod profiles;
pub mod res;
pub mod session;

#[cfg(test)]
pub(crate) mod testutil;

use std::fmt;
use std::ops::Deref;

use axum::{extract::FromRef, http::StatusCode, response::{Html, IntoResponse, Response}};
use sqlx::SqlitePool;
use tokio::sync::broadcast;

use crate::messages::Message;
use crate::profiles::name::NameCache;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    /// Insert feed for message rows. Every open thread subscribes to this and
    /// filters down to its own conversation.
    pub feed: broadcast::Sender<Message>,
    pub names: NameCache,
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError(pub StatusCode, pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, anyhow::Error::msg(msg.into()))
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(StatusCode::NOT_FOUND, anyhow::Error::msg(msg.into()))
    }

    pub fn sign_in_required() -> Self {
        Self(StatusCode::UNAUTHORIZED, anyhow::Error::msg("sign in to continue"))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.1)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.0.is_server_error() {
            tracing::error!(error = %self.1, "request failed");
            return (
                self.0,
                format!("{}\n\n{}", self.1, self.1.backtrace()),
            )
                .into_response();
        }
        (self.0, self.1.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(StatusCode::INTERNAL_SERVER_ERROR, err.into())
    }
}

pub struct Markdown<T>(pub T);

impl<T> IntoResponse for Markdown<T>
where
    T: Deref<Target = str>,
{
    fn into_response(self) -> Response {
        let parser = pulldown_cmark::Parser::new(&self.0);

        let mut html_output = String::new();
        pulldown_cmark::html::push_html(&mut html_output, parser);
        Html(html_output).into_response()
    }
}
