use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer order header.
///
/// `payment_method` is one of `cash_on_delivery` | `online_payment`;
/// `status` is a free-form label defaulting to "pending". Both are
/// validated at the API boundary, not by the schema.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub user_id: i64,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    pub requires_delivery: bool,
    pub delivery_address: Option<String>,
    pub pickup_point: Option<String>,

    pub payment_method: String,
    pub is_paid: bool,
    pub status: String,

    pub total_price: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
