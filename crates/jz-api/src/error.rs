use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jz_quiz::QuizError;
use thiserror::Error;

use crate::{
    metrics::record_quiz_abort,
    response::found,
    session::{FLASH_ERROR, FORM, QUIZ, SessionEffects},
    validation::FormErrors,
};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("You must be logged in to play a quiz.")]
    AuthRequired { topic_id: i64 },
    #[error("An error occurred during the quiz. {source}")]
    Quiz {
        #[source]
        source: QuizError,
    },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Authentication required: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid form input")]
    Validation {
        /// Page the form was submitted from
        redirect: String,
        errors: FormErrors,
    },
    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
    #[error("Session error: {0}")]
    Session(#[from] serde_json::Error),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<QuizError> for ApiError {
    fn from(source: QuizError) -> Self {
        Self::Quiz { source }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthRequired { .. } | Self::Quiz { .. } | Self::Validation { .. } => {
                StatusCode::FOUND
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) | Self::Jwt(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Storage(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::AuthRequired { topic_id } => {
                tracing::info!(topic_id, "Quiz requested without being logged in");
                let effects = SessionEffects::default().put(FLASH_ERROR, self.to_string());
                effects.attach(found(&format!("/topics/{topic_id}")))
            }
            Self::Quiz { ref source } => {
                let reason = source.reason();
                tracing::warn!(reason, error = %source, "Quiz aborted");
                record_quiz_abort(reason);

                let effects = SessionEffects::default()
                    .remove(QUIZ)
                    .put(FLASH_ERROR, self.to_string());
                effects.attach(found("/topics"))
            }
            Self::Validation { redirect, errors } => {
                tracing::debug!(fields = errors.len(), "Form validation failed");
                let effects = SessionEffects::default()
                    .put(FLASH_ERROR, "Please correct the marked fields.")
                    .put(FORM, errors.into_value());
                effects.attach(found(&redirect))
            }
            Self::Storage(ref err) => {
                tracing::error!(error = ?err, "Storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
            Self::Session(ref err) => {
                tracing::error!(error = %err, "Session error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Session error").into_response()
            }
            Self::Internal(ref msg) => {
                tracing::error!(message = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            Self::Jwt(_) => {
                (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response()
            }
            Self::NotFound(_) | Self::Unauthorized(_) | Self::Forbidden(_) => {
                (self.status_code(), self.to_string()).into_response()
            }
        }
    }
}
