use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::error::Error as StdError;
use thiserror::Error;
use tracing::error;

/// Bilingual page shown for unknown locales, unknown paths and missing records.
/// Served without the dictionaries since the locale may be the thing that is wrong.
pub const NOT_FOUND_PAGE: &str = include_str!("../../templates/not_found.html");

#[derive(Debug, Error)]
pub enum WebError {
    #[error("page not found")]
    NotFound,

    #[error("invalid or missing revalidation secret")]
    Unauthorized,

    #[error("failed to render template: {0}")]
    Render(#[from] tera::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::NotFound => (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response(),

            WebError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Invalid or missing revalidation secret",
            )
                .into_response(),

            WebError::Render(e) => {
                // tera nests the useful part of the message in the source chain
                let mut message = e.to_string();
                let mut source = e.source();
                while let Some(cause) = source {
                    message.push_str(&format!(": {}", cause));
                    source = cause.source();
                }
                error!("Template rendering failed: {}", message);

                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
