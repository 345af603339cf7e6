use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;

use crate::kv::KvError;

/// Request-level error taxonomy.
///
/// Every failure renders as `{"error": "<message>"}`. Rate-limit and
/// code-validity failures are deliberately opaque so responses do not
/// reveal whether an email is registered; store failures log their detail
/// server-side and return a generic message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Требуется авторизация.")]
    Unauthorized,

    #[error("Запись не найдена.")]
    NotFound,

    #[error("Слишком много запросов. Попробуйте позже.")]
    RateLimited,

    #[error("Код не валиден или истек.")]
    InvalidCode,

    #[error("Не удалось отправить код.")]
    Dispatch,

    #[error("Внутренняя ошибка сервера.")]
    Database(#[from] DbErr),

    #[error("Внутренняя ошибка сервера.")]
    Cache(#[from] KvError),

    #[error("Внутренняя ошибка сервера.")]
    Token(#[from] crate::jwt::JwtError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidCode => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Dispatch
            | ApiError::Database(_)
            | ApiError::Cache(_)
            | ApiError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Database(e) => error!("database error: {e}"),
            ApiError::Cache(e) => error!("ephemeral store error: {e}"),
            ApiError::Dispatch => error!("code delivery enqueue failed"),
            ApiError::Token(e) => error!("token issuance error: {e}"),
            _ => {}
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::InvalidCode.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::Dispatch.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_code_message_is_stable() {
        // Clients match on this string.
        assert_eq!(ApiError::InvalidCode.to_string(), "Код не валиден или истек.");
    }
}
