use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use keydesk_core::error::CoreError;
use keydesk_core::lifecycle::LifecycleError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`LifecycleError`] for domain errors and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce consistent
/// `{ "error": ..., "code": ... }` JSON error responses with the stable
/// error codes clients dispatch on.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `keydesk_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A lifecycle transition failure from the engine.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Lifecycle transition failures ---
            AppError::Lifecycle(lifecycle) => {
                (lifecycle_status(lifecycle), lifecycle.code(), lifecycle.to_string())
            }

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// HTTP status for a lifecycle failure.
///
/// Validation failures are 400, the private-room gate is 403, and every
/// state-mismatch failure is 409 -- they signal "someone already acted" and
/// are safe for clients to surface directly.
fn lifecycle_status(err: &LifecycleError) -> StatusCode {
    match err {
        LifecycleError::MissingField(_) => StatusCode::BAD_REQUEST,
        LifecycleError::RoomPrivate => StatusCode::FORBIDDEN,
        LifecycleError::RoomUnavailable(_)
        | LifecycleError::ActiveKeyExists
        | LifecycleError::NotPending(_)
        | LifecycleError::NotApproved(_)
        | LifecycleError::ReturnAlreadyPending
        | LifecycleError::NoPendingReturn(_)
        | LifecycleError::RoomInUse
        | LifecycleError::InvalidTransition { .. } => StatusCode::CONFLICT,
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - A violation of `uq_requests_active_holder` is the create/create race
///   on the single-active-key rule and maps to 409 `ACTIVE_KEY_EXISTS`.
/// - Other unique constraint violations (constraint name starting with
///   `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint == "uq_requests_active_holder" {
                    return (
                        StatusCode::CONFLICT,
                        "ACTIVE_KEY_EXISTS",
                        "Holder already has an active key request".to_string(),
                    );
                }
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keydesk_core::status::{RequestStatus, ReturnStatus, RoomStatus};

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn missing_field_is_bad_request() {
        assert_eq!(
            status_of(AppError::Lifecycle(LifecycleError::MissingField(
                "contact_phone"
            ))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn room_private_is_forbidden() {
        assert_eq!(
            status_of(AppError::Lifecycle(LifecycleError::RoomPrivate)),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn conflict_class_failures_are_409() {
        let conflicts = [
            LifecycleError::RoomUnavailable(RoomStatus::Occupied),
            LifecycleError::ActiveKeyExists,
            LifecycleError::NotPending(RequestStatus::Approved),
            LifecycleError::NotApproved(RequestStatus::Pending),
            LifecycleError::ReturnAlreadyPending,
            LifecycleError::NoPendingReturn(ReturnStatus::None),
            LifecycleError::RoomInUse,
            LifecycleError::InvalidTransition {
                from: RoomStatus::Occupied,
                to: RoomStatus::Maintenance,
            },
        ];
        for err in conflicts {
            assert_eq!(status_of(AppError::Lifecycle(err)), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            status_of(AppError::Core(CoreError::NotFound {
                entity: "Room",
                id: 9
            })),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Database(sqlx::Error::RowNotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn forbidden_core_error_maps_to_403() {
        assert_eq!(
            status_of(AppError::Core(CoreError::Forbidden("nope".into()))),
            StatusCode::FORBIDDEN
        );
    }
}
