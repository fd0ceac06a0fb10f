//! Outbound e-mail seam.
//!
//! Production posts to an HTTP e-mail function; without one configured the
//! message is only logged.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crm_core::config::NotificationsConfig;
use crm_core::error::{AppError, ErrorKind};

/// A single e-mail to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync + std::fmt::Debug {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError>;
}

/// Posts messages as JSON to the e-mail function endpoint.
#[derive(Debug, Clone)]
pub struct WebhookEmailSender {
    client: reqwest::Client,
    url: String,
    key: Option<String>,
}

impl WebhookEmailSender {
    pub fn new(url: impl Into<String>, key: Option<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;
        Ok(Self {
            client,
            url: url.into(),
            key,
        })
    }
}

#[async_trait]
impl EmailSender for WebhookEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        let mut request = self.client.post(&self.url).json(message);
        if let Some(key) = &self.key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "E-mail function unreachable", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external(format!(
                "E-mail function returned {status}: {body}"
            )));
        }
        Ok(())
    }
}

/// Logs messages instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        info!(to = %message.to, subject = %message.subject, "E-mail (log only)");
        Ok(())
    }
}

/// Pick the sender for the configured environment.
pub fn sender_from_config(
    config: &NotificationsConfig,
) -> Result<std::sync::Arc<dyn EmailSender>, AppError> {
    match &config.email_function_url {
        Some(url) if !url.is_empty() => Ok(std::sync::Arc::new(WebhookEmailSender::new(
            url.clone(),
            config.email_function_key.clone(),
        )?)),
        _ => Ok(std::sync::Arc::new(LogEmailSender)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sender_always_succeeds() {
        let msg = EmailMessage {
            to: "ana@example.com".into(),
            subject: "Lead".into(),
            body: "Hola".into(),
        };
        assert!(LogEmailSender.send(&msg).await.is_ok());
    }

    #[test]
    fn test_sender_from_config_defaults_to_log() {
        let sender = sender_from_config(&NotificationsConfig::default()).unwrap();
        assert!(format!("{sender:?}").contains("LogEmailSender"));
    }
}
