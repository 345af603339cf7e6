//! Catalog resources: products, categories, brands, reviews, attributes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use entity::{attribute, brand, category, product, product_attribute, product_review};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::handlers::{ensure_discount, ensure_non_negative};
use crate::pricing;
use crate::state::AppState;
use crate::util::slugify;

pub(crate) async fn ensure_category(db: &DatabaseConnection, id: i64) -> Result<(), ApiError> {
    entity::Category::find_by_id(id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::Validation(format!("Категория {id} не существует.")))
}

pub(crate) async fn ensure_brand(db: &DatabaseConnection, id: i64) -> Result<(), ApiError> {
    entity::Brand::find_by_id(id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::Validation(format!("Бренд {id} не существует.")))
}

pub(crate) async fn ensure_product(db: &DatabaseConnection, id: i64) -> Result<(), ApiError> {
    entity::Product::find_by_id(id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::Validation(format!("Товар {id} не существует.")))
}

async fn ensure_attribute(db: &DatabaseConnection, id: i64) -> Result<(), ApiError> {
    entity::Attribute::find_by_id(id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::Validation(format!("Атрибут {id} не существует.")))
}

fn non_blank(field: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(format!(
            "Поле {field} не может быть пустым."
        )));
    }
    Ok(trimmed.to_string())
}

fn slug_or_derived(slug: Option<String>, name: &str) -> String {
    match slug {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => slugify(name),
    }
}

// ---------------------------------------------------------------------------
// Products

/// Product representation: the stored row plus the resolved sale price.
#[derive(Debug, Serialize)]
pub struct ProductOut {
    #[serde(flatten)]
    pub product: product::Model,
    pub final_price: f64,
}

async fn product_out(state: &AppState, model: product::Model) -> Result<ProductOut, ApiError> {
    let final_price = pricing::final_price(state.kv.as_ref(), &model).await?;
    Ok(ProductOut {
        product: model,
        final_price,
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<i64>,
    pub brand: Option<i64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub is_on_sale: Option<bool>,
}

pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<ProductOut>>, ApiError> {
    let mut query = entity::Product::find().order_by_asc(product::Column::Id);
    if let Some(category) = filter.category {
        query = query.filter(product::Column::CategoryId.eq(category));
    }
    if let Some(brand) = filter.brand {
        query = query.filter(product::Column::BrandId.eq(brand));
    }
    if let Some(min) = filter.min_price {
        query = query.filter(product::Column::Price.gte(min));
    }
    if let Some(max) = filter.max_price {
        query = query.filter(product::Column::Price.lte(max));
    }
    if let Some(on_sale) = filter.is_on_sale {
        query = query.filter(product::Column::IsOnSale.eq(on_sale));
    }

    let mut out = Vec::new();
    for model in query.all(&state.db).await? {
        out.push(product_out(&state, model).await?);
    }
    Ok(Json(out))
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ProductOut>, ApiError> {
    let model = entity::Product::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(product_out(&state, model).await?))
}

#[derive(Debug, Deserialize)]
pub struct ProductIn {
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_on_sale: bool,
    pub quantity: i32,
    #[serde(default)]
    pub discount: f64,
    pub price: f64,
    pub category_id: i64,
    pub brand_id: i64,
    #[serde(default)]
    pub image: String,
}

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ProductIn>,
) -> Result<(StatusCode, Json<ProductOut>), ApiError> {
    let name = non_blank("name", &body.name)?;
    ensure_non_negative("price", body.price)?;
    ensure_discount(body.discount)?;
    if body.quantity < 0 {
        return Err(ApiError::Validation(
            "Поле quantity не может быть отрицательным.".to_string(),
        ));
    }
    ensure_category(&state.db, body.category_id).await?;
    ensure_brand(&state.db, body.brand_id).await?;

    let created = product::ActiveModel {
        slug: Set(slug_or_derived(body.slug, &name)),
        name: Set(name),
        description: Set(body.description),
        is_on_sale: Set(body.is_on_sale),
        quantity: Set(body.quantity),
        discount: Set(body.discount),
        price: Set(body.price),
        category_id: Set(body.category_id),
        brand_id: Set(body.brand_id),
        image: Set(body.image),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(product_out(&state, created).await?),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub is_on_sale: Option<bool>,
    pub quantity: Option<i32>,
    pub discount: Option<f64>,
    pub price: Option<f64>,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
    pub image: Option<String>,
}

pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<ProductPatch>,
) -> Result<Json<ProductOut>, ApiError> {
    let existing = entity::Product::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(price) = body.price {
        ensure_non_negative("price", price)?;
    }
    if let Some(discount) = body.discount {
        ensure_discount(discount)?;
    }
    if let Some(quantity) = body.quantity {
        if quantity < 0 {
            return Err(ApiError::Validation(
                "Поле quantity не может быть отрицательным.".to_string(),
            ));
        }
    }
    if let Some(category_id) = body.category_id {
        ensure_category(&state.db, category_id).await?;
    }
    if let Some(brand_id) = body.brand_id {
        ensure_brand(&state.db, brand_id).await?;
    }

    let mut active = existing.into_active_model();
    if let Some(name) = body.name {
        active.name = Set(non_blank("name", &name)?);
    }
    if let Some(slug) = body.slug {
        active.slug = Set(non_blank("slug", &slug)?);
    }
    if let Some(description) = body.description {
        active.description = Set(description);
    }
    if let Some(is_on_sale) = body.is_on_sale {
        active.is_on_sale = Set(is_on_sale);
    }
    if let Some(quantity) = body.quantity {
        active.quantity = Set(quantity);
    }
    if let Some(discount) = body.discount {
        active.discount = Set(discount);
    }
    if let Some(price) = body.price {
        active.price = Set(price);
    }
    if let Some(category_id) = body.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(brand_id) = body.brand_id {
        active.brand_id = Set(brand_id);
    }
    if let Some(image) = body.image {
        active.image = Set(image);
    }

    // Deliberately no memo invalidation: the resolved price may lag the
    // row until its hour is up.
    let updated = active.update(&state.db).await?;
    Ok(Json(product_out(&state, updated).await?))
}

pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = entity::Product::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Categories

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<category::Model>>, ApiError> {
    let rows = entity::Category::find()
        .order_by_asc(category::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(rows))
}

pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<category::Model>, ApiError> {
    entity::Category::find_by_id(id)
        .one(&state.db)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct CategoryIn {
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub image: String,
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CategoryIn>,
) -> Result<(StatusCode, Json<category::Model>), ApiError> {
    let name = non_blank("name", &body.name)?;

    let created = category::ActiveModel {
        slug: Set(slug_or_derived(body.slug, &name)),
        name: Set(name),
        image: Set(body.image),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub image: Option<String>,
}

pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<CategoryPatch>,
) -> Result<Json<category::Model>, ApiError> {
    let existing = entity::Category::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut active = existing.into_active_model();
    if let Some(name) = body.name {
        active.name = Set(non_blank("name", &name)?);
    }
    if let Some(slug) = body.slug {
        active.slug = Set(non_blank("slug", &slug)?);
    }
    if let Some(image) = body.image {
        active.image = Set(image);
    }

    Ok(Json(active.update(&state.db).await?))
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = entity::Category::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Brands

pub async fn list_brands(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<brand::Model>>, ApiError> {
    let rows = entity::Brand::find()
        .order_by_asc(brand::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(rows))
}

pub async fn get_brand(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<brand::Model>, ApiError> {
    entity::Brand::find_by_id(id)
        .one(&state.db)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct BrandIn {
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub description: String,
}

pub async fn create_brand(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BrandIn>,
) -> Result<(StatusCode, Json<brand::Model>), ApiError> {
    let name = non_blank("name", &body.name)?;

    let created = brand::ActiveModel {
        slug: Set(slug_or_derived(body.slug, &name)),
        name: Set(name),
        logo: Set(body.logo),
        description: Set(body.description),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct BrandPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub logo: Option<String>,
    pub description: Option<String>,
}

pub async fn update_brand(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<BrandPatch>,
) -> Result<Json<brand::Model>, ApiError> {
    let existing = entity::Brand::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut active = existing.into_active_model();
    if let Some(name) = body.name {
        active.name = Set(non_blank("name", &name)?);
    }
    if let Some(slug) = body.slug {
        active.slug = Set(non_blank("slug", &slug)?);
    }
    if let Some(logo) = body.logo {
        active.logo = Set(logo);
    }
    if let Some(description) = body.description {
        active.description = Set(description);
    }

    Ok(Json(active.update(&state.db).await?))
}

pub async fn delete_brand(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = entity::Brand::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Reviews

#[derive(Debug, Default, Deserialize)]
pub struct ReviewFilter {
    pub product: Option<i64>,
    pub user: Option<i64>,
}

pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ReviewFilter>,
) -> Result<Json<Vec<product_review::Model>>, ApiError> {
    let mut query = entity::ProductReview::find().order_by_asc(product_review::Column::Id);
    if let Some(product) = filter.product {
        query = query.filter(product_review::Column::ProductId.eq(product));
    }
    if let Some(user) = filter.user {
        query = query.filter(product_review::Column::UserId.eq(user));
    }
    Ok(Json(query.all(&state.db).await?))
}

pub async fn get_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<product_review::Model>, ApiError> {
    entity::ProductReview::find_by_id(id)
        .one(&state.db)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct ReviewIn {
    pub user_id: i64,
    pub product_id: i64,
    pub comment: String,
    pub image: Option<String>,
}

pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReviewIn>,
) -> Result<(StatusCode, Json<product_review::Model>), ApiError> {
    let comment = non_blank("comment", &body.comment)?;
    crate::handlers::users::ensure_user(&state.db, body.user_id).await?;
    ensure_product(&state.db, body.product_id).await?;

    let created = product_review::ActiveModel {
        user_id: Set(body.user_id),
        product_id: Set(body.product_id),
        comment: Set(comment),
        image: Set(body.image),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct ReviewPatch {
    pub comment: Option<String>,
    pub image: Option<String>,
}

pub async fn update_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<ReviewPatch>,
) -> Result<Json<product_review::Model>, ApiError> {
    let existing = entity::ProductReview::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut active = existing.into_active_model();
    if let Some(comment) = body.comment {
        active.comment = Set(non_blank("comment", &comment)?);
    }
    if let Some(image) = body.image {
        active.image = Set(Some(image));
    }

    Ok(Json(active.update(&state.db).await?))
}

pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = entity::ProductReview::delete_by_id(id)
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Attributes

pub async fn list_attributes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<attribute::Model>>, ApiError> {
    let rows = entity::Attribute::find()
        .order_by_asc(attribute::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(rows))
}

pub async fn get_attribute(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<attribute::Model>, ApiError> {
    entity::Attribute::find_by_id(id)
        .one(&state.db)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct AttributeIn {
    pub name: String,
    pub kind: String,
}

pub async fn create_attribute(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AttributeIn>,
) -> Result<(StatusCode, Json<attribute::Model>), ApiError> {
    let created = attribute::ActiveModel {
        name: Set(non_blank("name", &body.name)?),
        kind: Set(non_blank("kind", &body.kind)?),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct AttributePatch {
    pub name: Option<String>,
    pub kind: Option<String>,
}

pub async fn update_attribute(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<AttributePatch>,
) -> Result<Json<attribute::Model>, ApiError> {
    let existing = entity::Attribute::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut active = existing.into_active_model();
    if let Some(name) = body.name {
        active.name = Set(non_blank("name", &name)?);
    }
    if let Some(kind) = body.kind {
        active.kind = Set(non_blank("kind", &kind)?);
    }

    Ok(Json(active.update(&state.db).await?))
}

pub async fn delete_attribute(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = entity::Attribute::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Product attributes

#[derive(Debug, Default, Deserialize)]
pub struct ProductAttributeFilter {
    pub product: Option<i64>,
    pub attribute: Option<i64>,
}

pub async fn list_product_attributes(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ProductAttributeFilter>,
) -> Result<Json<Vec<product_attribute::Model>>, ApiError> {
    let mut query =
        entity::ProductAttribute::find().order_by_asc(product_attribute::Column::Id);
    if let Some(product) = filter.product {
        query = query.filter(product_attribute::Column::ProductId.eq(product));
    }
    if let Some(attribute) = filter.attribute {
        query = query.filter(product_attribute::Column::AttributeId.eq(attribute));
    }
    Ok(Json(query.all(&state.db).await?))
}

pub async fn get_product_attribute(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<product_attribute::Model>, ApiError> {
    entity::ProductAttribute::find_by_id(id)
        .one(&state.db)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct ProductAttributeIn {
    pub product_id: i64,
    pub attribute_id: i64,
    pub value: String,
}

pub async fn create_product_attribute(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ProductAttributeIn>,
) -> Result<(StatusCode, Json<product_attribute::Model>), ApiError> {
    ensure_product(&state.db, body.product_id).await?;
    ensure_attribute(&state.db, body.attribute_id).await?;

    let created = product_attribute::ActiveModel {
        product_id: Set(body.product_id),
        attribute_id: Set(body.attribute_id),
        value: Set(non_blank("value", &body.value)?),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct ProductAttributePatch {
    pub value: Option<String>,
}

pub async fn update_product_attribute(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<ProductAttributePatch>,
) -> Result<Json<product_attribute::Model>, ApiError> {
    let existing = entity::ProductAttribute::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut active = existing.into_active_model();
    if let Some(value) = body.value {
        active.value = Set(non_blank("value", &value)?);
    }

    Ok(Json(active.update(&state.db).await?))
}

pub async fn delete_product_attribute(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = entity::ProductAttribute::delete_by_id(id)
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
