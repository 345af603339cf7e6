use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment attempt against an order.
///
/// `transaction_id` comes from the payment provider and is unique.
/// `currency` is one of RUB | USD | EUR.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(unique)]
    pub transaction_id: String,

    pub user_id: i64,
    pub order_id: i64,

    pub amount: f64,

    pub payment_method: String,
    pub is_paid: bool,
    pub status: String,

    /// Provider error detail for failed transactions.
    pub transaction_error: Option<String>,

    pub currency: String,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    /// Unix timestamp (seconds).
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
