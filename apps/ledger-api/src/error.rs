//! API error types.
//!
//! Everything a handler can fail with ends up as an [`ApiError`], which
//! renders as `{ "code": "...", "message": "..." }` with a matching status.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shiftbook_core::{CoreError, ErrorKind};
use shiftbook_db::DbError;
use tracing::error;

use crate::register::RegisterError;

/// Error returned to consoles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} not found: {id}"),
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error",
        )
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let status = match err.kind() {
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Payment => StatusCode::PAYMENT_REQUIRED,
        };
        ApiError::new(status, err.code(), err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field } => ApiError::new(
                StatusCode::CONFLICT,
                "DUPLICATE",
                format!("A record with this {field} already exists"),
            ),
            DbError::Conflict(message) => ApiError::new(StatusCode::CONFLICT, "CONFLICT", message),
            other => {
                error!(error = %other, "Database error");
                ApiError::internal()
            }
        }
    }
}

impl From<RegisterError> for ApiError {
    fn from(err: RegisterError) -> Self {
        match err {
            RegisterError::Core(core) => core.into(),
            RegisterError::Db(db) => db.into(),
            other => {
                error!(error = %other, "Register unavailable");
                ApiError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "REGISTER_UNAVAILABLE",
                    "Register is not accepting commands",
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION_ERROR",
            rejection.body_text(),
        )
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// `Json<T>` whose rejection uses the API error body.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_status() {
        let err: ApiError = CoreError::NoActiveShift.into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "NO_ACTIVE_SHIFT");

        let err: ApiError = CoreError::InsufficientPayment {
            required: 430,
            received: 400,
        }
        .into();
        assert_eq!(err.status, StatusCode::PAYMENT_REQUIRED);

        let err: ApiError = CoreError::InvalidQuantity {
            quantity: 0,
            max: 999,
        }
        .into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_db_error_hides_details() {
        let err: ApiError = DbError::QueryFailed("no such column: secret".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("secret"));

        let err: ApiError = DbError::NotFound {
            entity: "Shift".into(),
            id: "s-1".into(),
        }
        .into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Shift not found: s-1");
    }

    #[test]
    fn test_unique_violation_names_field_only() {
        let err: ApiError = DbError::UniqueViolation {
            field: "orders.order_number".into(),
        }
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "DUPLICATE");
        assert_eq!(
            err.message,
            "A record with this orders.order_number already exists"
        );
        assert!(!err.message.contains("unknown"));
    }
}
