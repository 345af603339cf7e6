use std::time::Duration;

use crate::kv::{KvError, KvStore};

/// Minimum gap between code requests for one address.
pub const REQUEST_WINDOW: Duration = Duration::from_secs(300);

fn limit_key(email: &str) -> String {
    format!("sms_rate_limit:{email}")
}

/// Per-address request throttle backed by the ephemeral store.
///
/// Errors from the store propagate; a request is never let through just
/// because the limiter could not be consulted.
pub struct RateLimiter<'a> {
    kv: &'a dyn KvStore,
}

impl<'a> RateLimiter<'a> {
    pub fn new(kv: &'a dyn KvStore) -> Self {
        Self { kv }
    }

    pub async fn is_limited(&self, email: &str) -> Result<bool, KvError> {
        Ok(self.kv.get(&limit_key(email)).await?.is_some())
    }

    /// Start a new window for `email`. Expiry of the marker key is what
    /// ends the window.
    pub async fn mark_limited(&self, email: &str) -> Result<(), KvError> {
        self.kv.set(&limit_key(email), "1", REQUEST_WINDOW).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;

    #[tokio::test]
    async fn fresh_address_is_not_limited() {
        let kv = MemoryKv::new();
        let limiter = RateLimiter::new(&kv);

        assert!(!limiter.is_limited("a@b.com").await.unwrap());
    }

    #[tokio::test]
    async fn marking_opens_a_window() {
        let kv = MemoryKv::new();
        let limiter = RateLimiter::new(&kv);

        limiter.mark_limited("a@b.com").await.unwrap();
        assert!(limiter.is_limited("a@b.com").await.unwrap());
        // Other addresses are unaffected.
        assert!(!limiter.is_limited("c@d.com").await.unwrap());
    }

    #[tokio::test]
    async fn window_ends_when_the_marker_expires() {
        let kv = MemoryKv::new();

        kv.set("sms_rate_limit:a@b.com", "1", Duration::ZERO)
            .await
            .unwrap();
        let limiter = RateLimiter::new(&kv);
        assert!(!limiter.is_limited("a@b.com").await.unwrap());
    }
}
