use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::kv::{KvStore, RedisKv};
use crate::mailer::{spawn_dispatcher, CodeSender, HttpMailer, LogMailer, Mailer};

pub struct AppState {
    pub db: DatabaseConnection,
    pub kv: Arc<dyn KvStore>,
    pub sender: CodeSender,
    pub jwt_secret: Vec<u8>,
}

impl AppState {
    pub async fn new(config: &Config) -> Arc<Self> {
        let db = db::connect(&config.database_url)
            .await
            .expect("Failed to connect to the database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to apply migrations");

        let kv = RedisKv::connect(&config.redis_url)
            .await
            .expect("Failed to connect to redis");

        let mailer: Arc<dyn Mailer> = if config.mail_is_configured() {
            Arc::new(HttpMailer::new(
                config.mail_api_url.clone(),
                config.mail_api_key.clone().unwrap_or_default(),
                config.mail_sender_email.clone().unwrap_or_default(),
                config.mail_sender_name.clone(),
            ))
        } else {
            info!("Mail credentials not set; verification codes will be logged");
            Arc::new(LogMailer)
        };
        let sender = spawn_dispatcher(mailer);

        Arc::new(Self {
            db,
            kv: Arc::new(kv),
            sender,
            jwt_secret: config.jwt_secret.clone().into_bytes(),
        })
    }

    /// Assemble a state from pre-built parts; used by tests to swap in
    /// sqlite and the in-memory kv store.
    pub fn from_parts(
        db: DatabaseConnection,
        kv: Arc<dyn KvStore>,
        sender: CodeSender,
        jwt_secret: impl Into<Vec<u8>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            db,
            kv,
            sender,
            jwt_secret: jwt_secret.into(),
        })
    }
}
