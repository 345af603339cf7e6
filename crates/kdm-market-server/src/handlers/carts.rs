//! Cart lines and favourites.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use entity::{cart, favourite};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::ensure_positive;
use crate::handlers::goods::ensure_product;
use crate::handlers::users::ensure_user;
use crate::state::AppState;
use crate::util::now_ts;

#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    pub user: Option<i64>,
}

// ---------------------------------------------------------------------------
// Carts

pub async fn list_carts(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Vec<cart::Model>>, ApiError> {
    let mut query = entity::Cart::find().order_by_asc(cart::Column::Id);
    if let Some(user) = filter.user {
        query = query.filter(cart::Column::UserId.eq(user));
    }
    Ok(Json(query.all(&state.db).await?))
}

pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<cart::Model>, ApiError> {
    entity::Cart::find_by_id(id)
        .one(&state.db)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct CartIn {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub session_key: Option<String>,
}

pub async fn create_cart(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CartIn>,
) -> Result<(StatusCode, Json<cart::Model>), ApiError> {
    ensure_positive("quantity", body.quantity)?;
    ensure_user(&state.db, body.user_id).await?;
    ensure_product(&state.db, body.product_id).await?;

    let created = cart::ActiveModel {
        user_id: Set(body.user_id),
        session_key: Set(body.session_key),
        product_id: Set(body.product_id),
        quantity: Set(body.quantity),
        created_at: Set(now_ts()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct CartPatch {
    pub quantity: Option<i32>,
}

pub async fn update_cart(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<CartPatch>,
) -> Result<Json<cart::Model>, ApiError> {
    let existing = entity::Cart::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut active = existing.into_active_model();
    if let Some(quantity) = body.quantity {
        ensure_positive("quantity", quantity)?;
        active.quantity = Set(quantity);
    }

    Ok(Json(active.update(&state.db).await?))
}

pub async fn delete_cart(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = entity::Cart::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Favourites

pub async fn list_favourites(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Vec<favourite::Model>>, ApiError> {
    let mut query = entity::Favourite::find().order_by_asc(favourite::Column::Id);
    if let Some(user) = filter.user {
        query = query.filter(favourite::Column::UserId.eq(user));
    }
    Ok(Json(query.all(&state.db).await?))
}

pub async fn get_favourite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<favourite::Model>, ApiError> {
    entity::Favourite::find_by_id(id)
        .one(&state.db)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct FavouriteIn {
    pub user_id: i64,
    pub product_id: i64,
    pub session_key: Option<String>,
}

pub async fn create_favourite(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FavouriteIn>,
) -> Result<(StatusCode, Json<favourite::Model>), ApiError> {
    ensure_user(&state.db, body.user_id).await?;
    ensure_product(&state.db, body.product_id).await?;

    let created = favourite::ActiveModel {
        user_id: Set(body.user_id),
        session_key: Set(body.session_key),
        product_id: Set(body.product_id),
        created_at: Set(now_ts()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_favourite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = entity::Favourite::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
