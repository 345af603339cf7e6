//! Order headers and their line items.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use entity::{order, order_item};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::goods::ensure_product;
use crate::handlers::users::ensure_user;
use crate::handlers::{ensure_non_negative, ensure_one_of, ensure_positive};
use crate::state::AppState;
use crate::util::now_ts;

pub(crate) const PAYMENT_METHODS: &[&str] = &["cash_on_delivery", "online_payment"];
const STATUSES: &[&str] = &["pending", "processing", "shipped", "delivered", "cancelled"];

async fn ensure_order(db: &DatabaseConnection, id: i64) -> Result<(), ApiError> {
    entity::Order::find_by_id(id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::Validation(format!("Заказ {id} не существует.")))
}

// ---------------------------------------------------------------------------
// Orders

#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<String>,
}

pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<order::Model>>, ApiError> {
    let mut query = entity::Order::find().order_by_asc(order::Column::Id);
    if let Some(status) = filter.status {
        query = query.filter(order::Column::Status.eq(status));
    }
    Ok(Json(query.all(&state.db).await?))
}

pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<order::Model>, ApiError> {
    entity::Order::find_by_id(id)
        .one(&state.db)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct OrderIn {
    pub user_id: i64,
    #[serde(default)]
    pub requires_delivery: bool,
    pub delivery_address: Option<String>,
    pub pickup_point: Option<String>,
    pub payment_method: String,
    pub total_price: f64,
}

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OrderIn>,
) -> Result<(StatusCode, Json<order::Model>), ApiError> {
    ensure_one_of("payment_method", &body.payment_method, PAYMENT_METHODS)?;
    ensure_non_negative("total_price", body.total_price)?;
    ensure_user(&state.db, body.user_id).await?;

    if body.requires_delivery && body.delivery_address.is_none() {
        return Err(ApiError::Validation(
            "Для доставки нужен адрес.".to_string(),
        ));
    }

    let created = order::ActiveModel {
        user_id: Set(body.user_id),
        created_at: Set(now_ts()),
        requires_delivery: Set(body.requires_delivery),
        delivery_address: Set(body.delivery_address),
        pickup_point: Set(body.pickup_point),
        payment_method: Set(body.payment_method),
        is_paid: Set(false),
        status: Set("pending".to_string()),
        total_price: Set(body.total_price),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct OrderPatch {
    pub requires_delivery: Option<bool>,
    pub delivery_address: Option<String>,
    pub pickup_point: Option<String>,
    pub payment_method: Option<String>,
    pub is_paid: Option<bool>,
    pub status: Option<String>,
    pub total_price: Option<f64>,
}

pub async fn update_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<OrderPatch>,
) -> Result<Json<order::Model>, ApiError> {
    let existing = entity::Order::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(method) = &body.payment_method {
        ensure_one_of("payment_method", method, PAYMENT_METHODS)?;
    }
    if let Some(status) = &body.status {
        ensure_one_of("status", status, STATUSES)?;
    }
    if let Some(total) = body.total_price {
        ensure_non_negative("total_price", total)?;
    }

    let mut active = existing.into_active_model();
    if let Some(requires_delivery) = body.requires_delivery {
        active.requires_delivery = Set(requires_delivery);
    }
    if let Some(address) = body.delivery_address {
        active.delivery_address = Set(Some(address));
    }
    if let Some(point) = body.pickup_point {
        active.pickup_point = Set(Some(point));
    }
    if let Some(method) = body.payment_method {
        active.payment_method = Set(method);
    }
    if let Some(is_paid) = body.is_paid {
        active.is_paid = Set(is_paid);
    }
    if let Some(status) = body.status {
        active.status = Set(status);
    }
    if let Some(total) = body.total_price {
        active.total_price = Set(total);
    }

    Ok(Json(active.update(&state.db).await?))
}

pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = entity::Order::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Order items

#[derive(Debug, Default, Deserialize)]
pub struct OrderItemFilter {
    pub order: Option<i64>,
}

pub async fn list_order_items(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<OrderItemFilter>,
) -> Result<Json<Vec<order_item::Model>>, ApiError> {
    let mut query = entity::OrderItem::find().order_by_asc(order_item::Column::Id);
    if let Some(order) = filter.order {
        query = query.filter(order_item::Column::OrderId.eq(order));
    }
    Ok(Json(query.all(&state.db).await?))
}

pub async fn get_order_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<order_item::Model>, ApiError> {
    entity::OrderItem::find_by_id(id)
        .one(&state.db)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct OrderItemIn {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    /// Unit price at order time.
    pub price: f64,
}

pub async fn create_order_item(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OrderItemIn>,
) -> Result<(StatusCode, Json<order_item::Model>), ApiError> {
    ensure_positive("quantity", body.quantity)?;
    ensure_non_negative("price", body.price)?;
    ensure_order(&state.db, body.order_id).await?;
    ensure_product(&state.db, body.product_id).await?;

    let created = order_item::ActiveModel {
        order_id: Set(body.order_id),
        product_id: Set(body.product_id),
        quantity: Set(body.quantity),
        price: Set(body.price),
        created_at: Set(now_ts()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct OrderItemPatch {
    pub quantity: Option<i32>,
    pub price: Option<f64>,
}

pub async fn update_order_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<OrderItemPatch>,
) -> Result<Json<order_item::Model>, ApiError> {
    let existing = entity::OrderItem::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut active = existing.into_active_model();
    if let Some(quantity) = body.quantity {
        ensure_positive("quantity", quantity)?;
        active.quantity = Set(quantity);
    }
    if let Some(price) = body.price {
        ensure_non_negative("price", price)?;
        active.price = Set(price);
    }

    Ok(Json(active.update(&state.db).await?))
}

pub async fn delete_order_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = entity::OrderItem::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
