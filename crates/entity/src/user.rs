use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Store account, keyed by email.
///
/// There is no password column: accounts are resolved (get-or-create)
/// through the one-time-code flow, so email is the only credential root.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(unique)]
    pub email: String,

    pub username: String,

    /// Path of the uploaded avatar, if any.
    pub image: Option<String>,

    pub is_active: bool,
    pub is_staff: bool,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    /// Unix timestamp (seconds).
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
