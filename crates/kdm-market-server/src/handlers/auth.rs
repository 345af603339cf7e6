use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use entity::user;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{account, code};
use crate::error::ApiError;
use crate::handlers::ensure_email;
use crate::jwt;
use crate::state::AppState;
use crate::util::now_ts;

/// Resolve the bearer access token to an active account. Every failure
/// collapses into the same 401.
pub(crate) async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<user::Model, ApiError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;
    let token = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;

    let claims =
        jwt::verify_access(&state.jwt_secret, token).map_err(|_| ApiError::Unauthorized)?;

    entity::User::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .filter(|account| account.is_active)
        .ok_or(ApiError::Unauthorized)
}

#[derive(Debug, Deserialize)]
pub struct RequestCodeBody {
    pub email: String,
}

pub async fn request_code(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RequestCodeBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    ensure_email(&body.email)?;
    let email = body.email.trim().to_lowercase();

    code::request_code(&state.db, state.kv.as_ref(), &state.sender, &email).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Код отправлен." })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeBody {
    pub email: String,
    pub code: String,
}

pub async fn verify_code(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifyCodeBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    ensure_email(&body.email)?;
    let email = body.email.trim().to_lowercase();

    let (_, created, tokens) = account::verify_code(
        &state.db,
        state.kv.as_ref(),
        &state.jwt_secret,
        &email,
        body.code.trim(),
    )
    .await?;

    let (status, message) = if created {
        (StatusCode::CREATED, "Аккаунт создан.")
    } else {
        (StatusCode::OK, "Вход выполнен.")
    };

    Ok((
        status,
        Json(json!({
            "message": message,
            "refresh": tokens.refresh,
            "access": tokens.access,
        })),
    ))
}

pub async fn profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<user::Model>, ApiError> {
    let account = authenticate(&state, &headers).await?;
    Ok(Json(account))
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub image: Option<String>,
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<user::Model>, ApiError> {
    let account = authenticate(&state, &headers).await?;

    let mut active = account.into_active_model();
    if let Some(username) = body.username {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(ApiError::Validation(
                "Имя пользователя не может быть пустым.".to_string(),
            ));
        }
        active.username = Set(username);
    }
    if let Some(image) = body.image {
        active.image = Set(Some(image));
    }
    active.updated_at = Set(now_ts());

    let updated = active.update(&state.db).await?;
    Ok(Json(updated))
}
