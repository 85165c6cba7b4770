use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gigflow_core::catalog;
use gigflow_core::error::CoreError;
use gigflow_core::validation::{FieldErrors, NON_FIELD_ERRORS};
use serde::Serialize;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `gigflow_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A malformed request (unparseable body or path) with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl ErrorBody {
    fn plain(code: &'static str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
            fields: None,
        }
    }

    fn validation(fields: FieldErrors) -> Self {
        Self {
            error: fields.to_string(),
            code: "VALIDATION_ERROR",
            fields: Some(fields),
        }
    }

    fn internal() -> Self {
        Self::plain("INTERNAL_ERROR", "An internal error occurred")
    }
}

impl AppError {
    /// Map to the status and body sent to the client.
    pub fn to_status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    ErrorBody::plain("NOT_FOUND", format!("{entity} with id {id} not found")),
                ),
                CoreError::Validation(fields) => {
                    (StatusCode::BAD_REQUEST, ErrorBody::validation(fields.clone()))
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::plain("BAD_REQUEST", msg.clone()),
            ),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_status_and_body();
        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status and body.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations on `uq_*` constraints map to 400 validation errors,
///   worded like the eager duplicate checks in the handlers.
/// - Foreign key violations on `fk_services_service_type` map to a 400 on
///   `service_type_id`.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, ErrorBody) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            ErrorBody::plain("NOT_FOUND", "Resource not found"),
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                // PostgreSQL unique_violation
                Some("23505") if constraint.starts_with("uq_") => {
                    return (
                        StatusCode::BAD_REQUEST,
                        ErrorBody::validation(unique_violation_fields(constraint)),
                    );
                }
                // PostgreSQL foreign_key_violation
                Some("23503") if constraint == "fk_services_service_type" => {
                    return (
                        StatusCode::BAD_REQUEST,
                        ErrorBody::validation(FieldErrors::single(
                            "service_type_id",
                            "Object does not exist.",
                        )),
                    );
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
        }
    }
}

fn unique_violation_fields(constraint: &str) -> FieldErrors {
    let core = match constraint {
        "uq_service_types_name" => catalog::duplicate_name(),
        "uq_services_title_service_type" => catalog::duplicate_service(),
        other => CoreError::invalid(
            NON_FIELD_ERRORS,
            format!("Duplicate value violates unique constraint: {other}"),
        ),
    };
    match core {
        CoreError::Validation(fields) => fields,
        _ => FieldErrors::single(NON_FIELD_ERRORS, "Duplicate value."),
    }
}
