use std::time::Duration;

use entity::verification_code;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::info;

use crate::auth::code_key;
use crate::auth::rate_limit::RateLimiter;
use crate::error::ApiError;
use crate::mailer::CodeSender;
use crate::kv::KvStore;
use crate::util::{now_ts, numeric_code};

pub const CODE_LEN: usize = 4;

/// How long an issued code stays redeemable. The ephemeral key's TTL is
/// the only expiry check; rows past it are unusable even though they
/// remain in the table.
pub const CODE_TTL: Duration = Duration::from_secs(180);

/// Issue a fresh code for `email`, persist it, and queue its delivery.
///
/// Re-requesting supersedes any earlier code: previous unused rows are
/// marked used and the ephemeral key is overwritten, so at any moment at
/// most one code can be redeemed per address.
pub async fn request_code(
    db: &DatabaseConnection,
    kv: &dyn KvStore,
    sender: &CodeSender,
    email: &str,
) -> Result<(), ApiError> {
    let limiter = RateLimiter::new(kv);
    if limiter.is_limited(email).await? {
        return Err(ApiError::RateLimited);
    }

    let code = numeric_code(CODE_LEN);

    entity::VerificationCode::update_many()
        .col_expr(verification_code::Column::IsUsed, Expr::value(true))
        .filter(verification_code::Column::Email.eq(email))
        .filter(verification_code::Column::IsUsed.eq(false))
        .exec(db)
        .await?;

    verification_code::ActiveModel {
        email: Set(email.to_string()),
        code: Set(code.clone()),
        is_used: Set(false),
        created_at: Set(now_ts()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    kv.set(&code_key(email), &code, CODE_TTL).await?;
    limiter.mark_limited(email).await?;

    if !sender.enqueue(email, &code) {
        // The stored code stays redeemable; only delivery failed.
        return Err(ApiError::Dispatch);
    }

    info!("verification code issued for {email}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use crate::mailer::spawn_dispatcher;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, PaginatorTrait};

    async fn test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    struct Discard;

    #[async_trait::async_trait]
    impl crate::mailer::Mailer for Discard {
        async fn send_code(&self, _: &str, _: &str) -> Result<(), crate::mailer::MailError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn issues_a_row_and_an_ephemeral_key() {
        let db = test_db().await;
        let kv = MemoryKv::new();
        let sender = spawn_dispatcher(std::sync::Arc::new(Discard));

        request_code(&db, &kv, &sender, "a@b.com").await.unwrap();

        let cached = kv.get("verification_code:a@b.com").await.unwrap();
        let code = cached.expect("code key must be set");
        assert_eq!(code.len(), CODE_LEN);
        assert!(code.bytes().all(|b| b.is_ascii_digit()));

        let rows = entity::VerificationCode::find().count(&db).await.unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn second_request_inside_the_window_is_rejected() {
        let db = test_db().await;
        let kv = MemoryKv::new();
        let sender = spawn_dispatcher(std::sync::Arc::new(Discard));

        request_code(&db, &kv, &sender, "a@b.com").await.unwrap();
        let err = request_code(&db, &kv, &sender, "a@b.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::RateLimited));
    }

    #[tokio::test]
    async fn reissue_retires_the_previous_code() {
        let db = test_db().await;
        let kv = MemoryKv::new();
        let sender = spawn_dispatcher(std::sync::Arc::new(Discard));

        request_code(&db, &kv, &sender, "a@b.com").await.unwrap();
        // End the throttle window manually so a second issue is allowed.
        kv.del("sms_rate_limit:a@b.com").await.unwrap();
        request_code(&db, &kv, &sender, "a@b.com").await.unwrap();

        let unused = entity::VerificationCode::find()
            .filter(verification_code::Column::IsUsed.eq(false))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(unused, 1);
    }

    #[tokio::test]
    async fn enqueue_failure_surfaces_as_dispatch_error() {
        let db = test_db().await;
        let kv = MemoryKv::new();

        let (tx, rx) = tokio::sync::mpsc::channel(1);
        drop(rx);
        let sender = crate::mailer::CodeSender::new(tx);

        let err = request_code(&db, &kv, &sender, "a@b.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Dispatch));
        // The issued code is still redeemable despite the failed send.
        assert!(kv
            .get("verification_code:a@b.com")
            .await
            .unwrap()
            .is_some());
    }
}
