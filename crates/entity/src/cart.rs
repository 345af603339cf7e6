use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One cart line: a user holding a quantity of a product.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "carts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub user_id: i64,

    /// Anonymous-session key for carts built before login.
    pub session_key: Option<String>,

    pub product_id: i64,
    pub quantity: i32,

    /// Unix timestamp (seconds).
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
