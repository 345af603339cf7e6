use entity::{user, verification_code};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{info, warn};

use crate::auth::code::CODE_LEN;
use crate::auth::code_key;
use crate::error::ApiError;
use crate::jwt::{self, TokenPair};
use crate::kv::KvStore;
use crate::util::now_ts;

/// Redeem `code` for `email`: consume the code row, resolve (or create)
/// the account, and mint a token pair.
///
/// Returns the user, whether the account was created by this call, and
/// the tokens. Every rejection path answers with the same opaque
/// [`ApiError::InvalidCode`] so callers cannot probe which codes exist.
pub async fn verify_code(
    db: &DatabaseConnection,
    kv: &dyn KvStore,
    secret: &[u8],
    email: &str,
    code: &str,
) -> Result<(user::Model, bool, TokenPair), ApiError> {
    if code.len() != CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::InvalidCode);
    }

    // The ephemeral key is the expiry authority: no live key, no login,
    // regardless of what the table still holds.
    match kv.get(&code_key(email)).await? {
        Some(cached) if cached == code => {}
        _ => return Err(ApiError::InvalidCode),
    }

    let txn = db.begin().await?;

    let consumed = entity::VerificationCode::update_many()
        .col_expr(verification_code::Column::IsUsed, Expr::value(true))
        .filter(verification_code::Column::Email.eq(email))
        .filter(verification_code::Column::Code.eq(code))
        .filter(verification_code::Column::IsUsed.eq(false))
        .exec(&txn)
        .await?;
    if consumed.rows_affected == 0 {
        // Already consumed (or never issued): a stale key must not
        // re-authenticate.
        txn.rollback().await?;
        return Err(ApiError::InvalidCode);
    }

    let existing = entity::User::find()
        .filter(user::Column::Email.eq(email))
        .one(&txn)
        .await?;

    let (resolved, created) = match existing {
        Some(found) => (found, false),
        None => {
            let now = now_ts();
            let inserted = user::ActiveModel {
                email: Set(email.to_string()),
                username: Set(default_username(email)),
                image: Set(None),
                is_active: Set(true),
                is_staff: Set(false),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            (inserted, true)
        }
    };

    if !resolved.is_active {
        txn.rollback().await?;
        return Err(ApiError::Validation("Аккаунт отключен.".to_string()));
    }

    txn.commit().await?;

    // The login is already durable and the consumed row blocks a second
    // redemption, so a failed key drop must not fail the request; the
    // key lapses on its own TTL.
    if let Err(e) = kv.del(&code_key(email)).await {
        warn!("failed to drop code key for {email}: {e}");
    }

    let tokens = jwt::issue_pair(secret, resolved.id, &resolved.email)?;

    if created {
        info!("account created for {email}");
    }
    Ok((resolved, created, tokens))
}

fn default_username(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
