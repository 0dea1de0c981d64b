use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use omm_booking::WizardError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    NotFoundError(String),
    ConflictError(String),
    ValidationError(Vec<String>),
    UpstreamError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "Validation failed", "errors": errors }),
            ),
            AppError::UpstreamError(msg) => {
                tracing::error!("Upstream failure: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "error": "Something went wrong. Please try again." }),
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<WizardError> for AppError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::Validation(errors) => AppError::ValidationError(errors),
            WizardError::TripNotFound(_) | WizardError::ParticipantNotFound(_) => {
                AppError::NotFoundError(err.to_string())
            }
            WizardError::CannotRemovePrimary
            | WizardError::CannotRemoveLast
            | WizardError::AtFinalStep
            | WizardError::NotAtFinalStep
            | WizardError::AlreadySubmitted(_) => AppError::ConflictError(err.to_string()),
            WizardError::TripLoad(msg) | WizardError::Submission(msg) => AppError::UpstreamError(msg),
        }
    }
}
