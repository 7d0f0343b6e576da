use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use quill_db::DbError;
use quill_types::models::PostId;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum BlogError {
    /// A required field was missing.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Auth(String),
    #[error("Post id {0} doesn't exist.")]
    NotFound(PostId),
    #[error("You don't have permission to modify this post.")]
    Forbidden,
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("{0}")]
    Internal(String),
}

impl BlogError {
    /// Split user-correctable errors, which views flash and re-render, from
    /// terminal ones, which are handed back unchanged.
    pub fn into_flash(self) -> Result<String, BlogError> {
        match self {
            BlogError::Validation(msg) | BlogError::Conflict(msg) | BlogError::Auth(msg) => Ok(msg),
            other => Err(other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BlogError::Validation(_) | BlogError::Conflict(_) | BlogError::Auth(_) => {
                StatusCode::OK
            }
            BlogError::NotFound(_) => StatusCode::NOT_FOUND,
            BlogError::Forbidden => StatusCode::FORBIDDEN,
            BlogError::Database(_) | BlogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            BlogError::Database(e) => {
                error!("Database error: {}", e);
                "Internal Server Error".to_string()
            }
            BlogError::Internal(msg) => {
                error!("Internal error: {}", msg);
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        let title = status.canonical_reason().unwrap_or("Error");
        (
            status,
            Html(format!(
                "<!doctype html>\n<title>{status} {title}</title>\n<h1>{title}</h1>\n<p>{}</p>\n",
                crate::render::escape(&message),
                status = status.as_u16(),
            )),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_errors_become_flashes() {
        let msg = BlogError::Validation("Title is required.".into()).into_flash();
        assert_eq!(msg.unwrap(), "Title is required.");
        assert!(BlogError::Auth("Incorrect password.".into()).into_flash().is_ok());
        assert!(BlogError::Conflict("taken".into()).into_flash().is_ok());
    }

    #[test]
    fn terminal_errors_pass_through() {
        assert!(matches!(
            BlogError::NotFound(7).into_flash(),
            Err(BlogError::NotFound(7))
        ));
        assert!(matches!(BlogError::Forbidden.into_flash(), Err(BlogError::Forbidden)));
    }

    #[test]
    fn status_codes() {
        assert_eq!(BlogError::NotFound(1).into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(BlogError::Forbidden.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            BlogError::Database(DbError::Closed).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_the_id() {
        assert_eq!(BlogError::NotFound(3).to_string(), "Post id 3 doesn't exist.");
    }
}
