//! Outbound code delivery.
//!
//! The HTTP response path never waits on the mail provider: handlers push
//! `(email, code)` onto a bounded channel and a background task performs
//! the actual send. A full channel surfaces as a dispatch error; the
//! persisted code row stays valid for a retry.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info};

const QUEUE_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail provider rejected the message (status={status}): {body}")]
    Provider { status: u16, body: String },
}

/// Transactional mail backend.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_code(&self, to: &str, code: &str) -> Result<(), MailError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody {
    sender: EmailAddress,
    to: Vec<EmailAddress>,
    subject: String,
    text_content: String,
}

/// HTTP transactional-mail API client (Brevo-compatible JSON body).
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    sender_email: String,
    sender_name: Option<String>,
}

impl HttpMailer {
    pub fn new(
        api_url: String,
        api_key: String,
        sender_email: String,
        sender_name: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            sender_email,
            sender_name,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_code(&self, to: &str, code: &str) -> Result<(), MailError> {
        let body = SendEmailBody {
            sender: EmailAddress {
                email: self.sender_email.clone(),
                name: self.sender_name.clone(),
            },
            to: vec![EmailAddress {
                email: to.to_string(),
                name: None,
            }],
            subject: "Код подтверждения".to_string(),
            text_content: format!("Ваш код подтверждения: {code}"),
        };

        let resp = self
            .client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(MailError::Provider {
            status: status.as_u16(),
            body,
        })
    }
}

/// Development fallback when mail credentials are absent: the code is only
/// written to the log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_code(&self, to: &str, code: &str) -> Result<(), MailError> {
        info!("mail not configured; code for {to}: {code}");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CodeEmail {
    pub to: String,
    pub code: String,
}

/// Cheaply cloneable handle that enqueues deliveries for the background
/// worker.
#[derive(Clone)]
pub struct CodeSender {
    tx: mpsc::Sender<CodeEmail>,
}

impl CodeSender {
    pub(crate) fn new(tx: mpsc::Sender<CodeEmail>) -> Self {
        Self { tx }
    }

    /// Non-blocking enqueue. `false` means the queue is full or the worker
    /// is gone; callers surface that as a dispatch error.
    pub fn enqueue(&self, to: &str, code: &str) -> bool {
        self.tx
            .try_send(CodeEmail {
                to: to.to_string(),
                code: code.to_string(),
            })
            .is_ok()
    }
}

/// Spawn the delivery worker and return its enqueue handle.
pub fn spawn_dispatcher(mailer: Arc<dyn Mailer>) -> CodeSender {
    let (tx, mut rx) = mpsc::channel::<CodeEmail>(QUEUE_CAPACITY);

    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            if let Err(e) = mailer.send_code(&job.to, &job.code).await {
                // The code row is still valid; the client can re-request
                // after the rate-limit window.
                error!("failed to deliver code to {}: {e}", job.to);
            }
        }
    });

    CodeSender::new(tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn enqueue_fails_once_the_worker_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        let sender = CodeSender::new(tx);

        drop(rx);
        assert!(!sender.enqueue("a@b.com", "1234"));
    }

    #[tokio::test]
    async fn dispatcher_hands_jobs_to_the_mailer() {
        struct Recording(parking_lot::Mutex<Vec<CodeEmail>>);

        #[async_trait]
        impl Mailer for Recording {
            async fn send_code(&self, to: &str, code: &str) -> Result<(), MailError> {
                self.0.lock().push(CodeEmail {
                    to: to.to_string(),
                    code: code.to_string(),
                });
                Ok(())
            }
        }

        let mailer = Arc::new(Recording(parking_lot::Mutex::new(Vec::new())));
        let sender = spawn_dispatcher(mailer.clone());

        assert!(sender.enqueue("a@b.com", "4321"));

        // Give the worker a moment to drain the queue.
        for _ in 0..50 {
            if !mailer.0.lock().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let sent = mailer.0.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@b.com");
        assert_eq!(sent[0].code, "4321");
    }
}
