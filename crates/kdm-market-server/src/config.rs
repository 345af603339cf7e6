use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,

    pub mail_api_url: String,
    pub mail_api_key: Option<String>,
    pub mail_sender_email: Option<String>,
    pub mail_sender_name: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "8000"),
            database_url: require("DATABASE_URL"),
            redis_url: try_load("REDIS_URL", "redis://127.0.0.1:6379/1"),
            jwt_secret: require("JWT_SECRET"),
            mail_api_url: try_load("MAIL_API_URL", "https://api.brevo.com/v3/smtp/email"),
            mail_api_key: optional("MAIL_API_KEY"),
            mail_sender_email: optional("MAIL_SENDER_EMAIL"),
            mail_sender_name: optional("MAIL_SENDER_NAME"),
        }
    }

    /// Both the API key and a sender address are needed to send real mail;
    /// otherwise codes are only logged.
    pub fn mail_is_configured(&self) -> bool {
        self.mail_api_key.is_some() && self.mail_sender_email.is_some()
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key)
        .map(|v| v.trim().to_string())
        .map_err(|_| ())
        .and_then(|v| if v.is_empty() { Err(()) } else { Ok(v) })
}

fn require(key: &str) -> String {
    var(key)
        .map_err(|_| warn!("Required environment variable {key} is not set"))
        .expect("Environment misconfigured!")
}

fn optional(key: &str) -> Option<String> {
    var(key).ok()
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
