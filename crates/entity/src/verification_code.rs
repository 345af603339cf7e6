use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One-time login codes delivered by email.
///
/// Rows are never deleted; `is_used` flips exactly once from unused to
/// used. Expiry is not enforced from this table. The ephemeral store's
/// TTL on `verification_code:{email}` is the single expiry authority,
/// and `created_at` is kept for audit only.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verification_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub email: String,

    /// 4-digit zero-padded numeric code.
    pub code: String,

    pub is_used: bool,

    /// Unix timestamp (seconds).
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
