use crate::markdown::RenderError;
use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] crate::config::LoadError),
    #[error("failed to install tracing subscriber: {0}")]
    Telemetry(String),
    #[error("failed to open post store at {path:?}: {source}")]
    Store {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// An error answered to the client. Internal details are logged, never sent.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: String,
}

impl HttpError {
    pub fn not_found(message: impl Into<String>) -> HttpError {
        HttpError {
            status: StatusCode::NOT_FOUND,
            public_message: message.into(),
        }
    }

    pub fn internal(source: &'static str, error: &dyn std::error::Error) -> HttpError {
        tracing::error!(source, error = %error, "request failed");
        HttpError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            public_message: String::from("Internal server error"),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, self.public_message).into_response()
    }
}

impl From<StoreError> for HttpError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(slug) | StoreError::InvalidSlug(slug) => {
                HttpError::not_found(format!("Post not found: {slug}"))
            }
            err => HttpError::internal("store", &err),
        }
    }
}

impl From<RenderError> for HttpError {
    fn from(error: RenderError) -> Self {
        HttpError::internal("markdown", &error)
    }
}

impl From<askama::Error> for HttpError {
    fn from(error: askama::Error) -> Self {
        HttpError::internal("template", &error)
    }
}
