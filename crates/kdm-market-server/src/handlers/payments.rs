//! Payment attempts and their per-product breakdown.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use entity::{payment, payment_item};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::goods::ensure_product;
use crate::handlers::orders::PAYMENT_METHODS;
use crate::handlers::users::ensure_user;
use crate::handlers::{ensure_non_negative, ensure_one_of, ensure_positive};
use crate::state::AppState;
use crate::util::now_ts;

const CURRENCIES: &[&str] = &["RUB", "USD", "EUR"];

async fn ensure_payment(db: &DatabaseConnection, id: i64) -> Result<(), ApiError> {
    entity::Payment::find_by_id(id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::Validation(format!("Платеж {id} не существует.")))
}

async fn ensure_order(db: &DatabaseConnection, id: i64) -> Result<(), ApiError> {
    entity::Order::find_by_id(id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::Validation(format!("Заказ {id} не существует.")))
}

// ---------------------------------------------------------------------------
// Payments

#[derive(Debug, Default, Deserialize)]
pub struct PaymentFilter {
    pub user: Option<i64>,
    pub status: Option<String>,
}

pub async fn list_payments(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<PaymentFilter>,
) -> Result<Json<Vec<payment::Model>>, ApiError> {
    let mut query = entity::Payment::find().order_by_asc(payment::Column::Id);
    if let Some(user) = filter.user {
        query = query.filter(payment::Column::UserId.eq(user));
    }
    if let Some(status) = filter.status {
        query = query.filter(payment::Column::Status.eq(status));
    }
    Ok(Json(query.all(&state.db).await?))
}

pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<payment::Model>, ApiError> {
    entity::Payment::find_by_id(id)
        .one(&state.db)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct PaymentIn {
    pub transaction_id: String,
    pub user_id: i64,
    pub order_id: i64,
    pub amount: f64,
    pub payment_method: String,
    #[serde(default)]
    pub is_paid: bool,
    pub status: Option<String>,
    pub transaction_error: Option<String>,
    pub currency: String,
}

pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PaymentIn>,
) -> Result<(StatusCode, Json<payment::Model>), ApiError> {
    let transaction_id = body.transaction_id.trim().to_string();
    if transaction_id.is_empty() {
        return Err(ApiError::Validation(
            "Поле transaction_id не может быть пустым.".to_string(),
        ));
    }
    ensure_one_of("payment_method", &body.payment_method, PAYMENT_METHODS)?;
    ensure_one_of("currency", &body.currency, CURRENCIES)?;
    ensure_non_negative("amount", body.amount)?;
    ensure_user(&state.db, body.user_id).await?;
    ensure_order(&state.db, body.order_id).await?;

    let now = now_ts();
    let created = payment::ActiveModel {
        transaction_id: Set(transaction_id),
        user_id: Set(body.user_id),
        order_id: Set(body.order_id),
        amount: Set(body.amount),
        payment_method: Set(body.payment_method),
        is_paid: Set(body.is_paid),
        status: Set(body.status.unwrap_or_else(|| "pending".to_string())),
        transaction_error: Set(body.transaction_error),
        currency: Set(body.currency),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct PaymentPatch {
    pub is_paid: Option<bool>,
    pub status: Option<String>,
    pub transaction_error: Option<String>,
}

pub async fn update_payment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<PaymentPatch>,
) -> Result<Json<payment::Model>, ApiError> {
    let existing = entity::Payment::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut active = existing.into_active_model();
    if let Some(is_paid) = body.is_paid {
        active.is_paid = Set(is_paid);
    }
    if let Some(status) = body.status {
        active.status = Set(status);
    }
    if let Some(error) = body.transaction_error {
        active.transaction_error = Set(Some(error));
    }
    active.updated_at = Set(now_ts());

    Ok(Json(active.update(&state.db).await?))
}

pub async fn delete_payment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = entity::Payment::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Payment items

#[derive(Debug, Default, Deserialize)]
pub struct PaymentItemFilter {
    pub payment: Option<i64>,
}

pub async fn list_payment_items(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<PaymentItemFilter>,
) -> Result<Json<Vec<payment_item::Model>>, ApiError> {
    let mut query = entity::PaymentItem::find().order_by_asc(payment_item::Column::Id);
    if let Some(payment) = filter.payment {
        query = query.filter(payment_item::Column::PaymentId.eq(payment));
    }
    Ok(Json(query.all(&state.db).await?))
}

pub async fn get_payment_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<payment_item::Model>, ApiError> {
    entity::PaymentItem::find_by_id(id)
        .one(&state.db)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct PaymentItemIn {
    pub payment_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub total_price: f64,
}

pub async fn create_payment_item(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PaymentItemIn>,
) -> Result<(StatusCode, Json<payment_item::Model>), ApiError> {
    ensure_positive("quantity", body.quantity)?;
    ensure_non_negative("total_price", body.total_price)?;
    ensure_payment(&state.db, body.payment_id).await?;
    ensure_product(&state.db, body.product_id).await?;

    let now = now_ts();
    let created = payment_item::ActiveModel {
        payment_id: Set(body.payment_id),
        product_id: Set(body.product_id),
        quantity: Set(body.quantity),
        total_price: Set(body.total_price),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct PaymentItemPatch {
    pub quantity: Option<i32>,
    pub total_price: Option<f64>,
}

pub async fn update_payment_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<PaymentItemPatch>,
) -> Result<Json<payment_item::Model>, ApiError> {
    let existing = entity::PaymentItem::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut active = existing.into_active_model();
    if let Some(quantity) = body.quantity {
        ensure_positive("quantity", quantity)?;
        active.quantity = Set(quantity);
    }
    if let Some(total) = body.total_price {
        ensure_non_negative("total_price", total)?;
        active.total_price = Set(total);
    }
    active.updated_at = Set(now_ts());

    Ok(Json(active.update(&state.db).await?))
}

pub async fn delete_payment_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = entity::PaymentItem::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
