use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog product.
///
/// `discount` is a percentage in [0, 100]; the API layer validates the
/// range on writes. The discounted price is never stored here; the
/// server's price resolver computes it on read.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub slug: String,
    pub name: String,
    pub description: String,

    pub is_on_sale: bool,

    /// Units in stock.
    pub quantity: i32,

    /// Discount percentage in [0, 100].
    pub discount: f64,

    pub price: f64,

    pub category_id: i64,
    pub brand_id: i64,

    /// Path of the product image.
    pub image: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
