//! Error types for the web layer.
//!
//! [`WebError`] unifies all failure modes into a single enum that
//! converts into an Axum HTTP response with a JSON body of the form
//! `{"error": ..., "status": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use wals_db::DbError;

use crate::routes::RouteError;

/// Errors that can occur while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The requested resource existed once and has been retired.
    #[error("gone: {0}")]
    Gone(String),

    /// A catalog lookup failed.
    #[error("database error: {0}")]
    Database(#[from] DbError),

    /// A canonical URL could not be built.
    #[error("route error: {0}")]
    Route(#[from] RouteError),
}

impl WebError {
    /// Shorthand for a not-found error naming the resource.
    pub fn not_found(kind: &str, id: &str) -> Self {
        Self::NotFound(format!("{kind} {id:?} does not exist"))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Gone(msg) => (StatusCode::GONE, msg.clone()),
            Self::Database(e) => {
                tracing::error!(error = %e, "catalog lookup failed");
                (StatusCode::INTERNAL_SERVER_ERROR, String::from("database error"))
            }
            Self::Route(e) => {
                tracing::error!(error = %e, "url generation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_variant() {
        let cases = [
            (WebError::not_found("feature", "999Z"), StatusCode::NOT_FOUND),
            (WebError::Gone(String::from("/experimental/x")), StatusCode::GONE),
            (
                WebError::from(RouteError::MissingParam {
                    pattern: String::from("/chapter/{id}"),
                    param: String::from("id"),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                WebError::from(DbError::Config(String::from("bad url"))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
