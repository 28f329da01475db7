//! Email delivery for transactional and operator-composed mail.
//!
//! Supports multiple providers:
//! - `console`: Logs emails to the console (development)
//! - `smtp`: Sends via an SMTP relay
//! - `sendgrid`: Uses the SendGrid API
//!
//! The sender identity is resolved from the settings row at send time so
//! operators can change it without a redeploy; the configured identity is
//! only a fallback.

use std::sync::Arc;

use lettre::{
    message::{header::ContentType, Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use persistence::repositories::SettingsRepository;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::EmailConfig;
use crate::middleware::metrics::record_email_sent;

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Recipient name (optional)
    pub to_name: Option<String>,
    /// Email subject
    pub subject: String,
    /// Plain text body
    pub body_text: String,
    /// HTML body (optional)
    pub body_html: Option<String>,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    settings: SettingsRepository,
    http: reqwest::Client,
    smtp: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    ///
    /// The SMTP transport is built up front so a bad relay hostname fails
    /// at startup instead of on the first send.
    pub fn new(config: EmailConfig, settings: SettingsRepository) -> Result<Self, EmailError> {
        let smtp = if config.provider == "smtp" && !config.smtp_host.is_empty() {
            Some(build_smtp_transport(&config)?)
        } else {
            None
        };
        Ok(Self {
            config: Arc::new(config),
            settings,
            http: reqwest::Client::new(),
            smtp,
        })
    }

    /// Check if email service is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Send an email message.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email service disabled, skipping send"
            );
            return Ok(());
        }

        let sender = self.sender_identity().await;
        match self.config.provider.as_str() {
            "console" => self.send_console(&sender, message).await?,
            "smtp" => self.send_smtp(&sender, message).await?,
            "sendgrid" => self.send_sendgrid(&sender, message).await?,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                return Err(EmailError::NotConfigured);
            }
        }
        record_email_sent(&self.config.provider);
        Ok(())
    }

    /// Resolve the From identity, preferring the settings row.
    async fn sender_identity(&self) -> SenderIdentity {
        match self.settings.get().await {
            Ok(Some(row)) if !row.sender_email.is_empty() => SenderIdentity {
                name: row.sender_name,
                email: row.sender_email,
            },
            Ok(_) => SenderIdentity::from_config(&self.config),
            Err(e) => {
                warn!(error = %e, "Failed to read sender settings, using configured identity");
                SenderIdentity::from_config(&self.config)
            }
        }
    }

    /// Console provider - logs the email instead of delivering it.
    async fn send_console(
        &self,
        sender: &SenderIdentity,
        message: EmailMessage,
    ) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            to_name = ?message.to_name,
            subject = %message.subject,
            from = %sender.email,
            from_name = %sender.name,
            "Email (console provider)"
        );
        info!(body_text = %message.body_text, "Email body (plain text)");
        if let Some(html) = &message.body_html {
            debug!(body_html_length = html.len(), "Email body (HTML)");
        }
        Ok(())
    }

    /// SMTP provider - sends via the transport built at startup.
    async fn send_smtp(
        &self,
        sender: &SenderIdentity,
        message: EmailMessage,
    ) -> Result<(), EmailError> {
        let transport = self.smtp.as_ref().ok_or(EmailError::NotConfigured)?;

        let from: Mailbox = format!("{} <{}>", sender.name, sender.email)
            .parse()
            .map_err(|e| EmailError::InvalidAddress(format!("{}: {}", sender.email, e)))?;
        let to: Mailbox = match &message.to_name {
            Some(name) => format!("{} <{}>", name, message.to),
            None => message.to.clone(),
        }
        .parse()
        .map_err(|e| EmailError::InvalidAddress(format!("{}: {}", message.to, e)))?;

        let builder = Message::builder()
            .from(from)
            .to(to)
            .subject(&message.subject);
        let email = match &message.body_html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                message.body_text.clone(),
                html.clone(),
            )),
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(message.body_text.clone()),
        }
        .map_err(|e| EmailError::SendFailed(format!("Failed to build message: {}", e)))?;

        transport
            .send(email)
            .await
            .map_err(|e| EmailError::SendFailed(format!("SMTP send failed: {}", e)))?;

        info!(to = %message.to, subject = %message.subject, "Email sent via SMTP");
        Ok(())
    }

    /// SendGrid provider - sends via SendGrid API.
    async fn send_sendgrid(
        &self,
        sender: &SenderIdentity,
        message: EmailMessage,
    ) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let mut personalizations = serde_json::json!({
            "to": [{
                "email": message.to
            }]
        });
        if let Some(name) = &message.to_name {
            personalizations["to"][0]["name"] = serde_json::json!(name);
        }

        let mut body = serde_json::json!({
            "personalizations": [personalizations],
            "from": {
                "email": sender.email,
                "name": sender.name
            },
            "subject": message.subject,
            "content": [{
                "type": "text/plain",
                "value": message.body_text
            }]
        });
        if let Some(html) = &message.body_html {
            if let Some(content) = body["content"].as_array_mut() {
                content.push(serde_json::json!({
                    "type": "text/html",
                    "value": html
                }));
            }
        }

        let response = self
            .http
            .post("https://api.sendgrid.com/v3/mail/send")
            .header(
                "Authorization",
                format!("Bearer {}", self.config.sendgrid_api_key),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            info!(to = %message.to, subject = %message.subject, "Email sent via SendGrid");
            Ok(())
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_body, "SendGrid API error");
            Err(EmailError::ProviderError(format!(
                "SendGrid returned {}: {}",
                status, error_body
            )))
        }
    }
}

/// Resolved From identity for one send.
#[derive(Debug, Clone)]
struct SenderIdentity {
    name: String,
    email: String,
}

impl SenderIdentity {
    fn from_config(config: &EmailConfig) -> Self {
        Self {
            name: config.sender_name.clone(),
            email: config.sender_email.clone(),
        }
    }
}

fn build_smtp_transport(
    config: &EmailConfig,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
    let mut builder = if config.smtp_use_tls {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| EmailError::ProviderError(format!("Invalid SMTP relay: {}", e)))?
    } else {
        // Plain transport for local development relays.
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
    };
    builder = builder.port(config.smtp_port);
    if !config.smtp_username.is_empty() {
        builder = builder.credentials(Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        ));
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;

    fn test_config() -> EmailConfig {
        EmailConfig {
            enabled: true,
            provider: "console".to_string(),
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            smtp_use_tls: true,
            sendgrid_api_key: String::new(),
            sender_email: "test@example.com".to_string(),
            sender_name: "Test".to_string(),
        }
    }

    fn test_service(config: EmailConfig) -> EmailService {
        // The pool never connects: sender resolution falls back to the
        // configured identity when the settings read fails.
        let pool = PgPool::connect_lazy("postgres://localhost/conference_manager_unused")
            .expect("lazy pool");
        EmailService::new(config, SettingsRepository::new(pool)).expect("email service")
    }

    #[tokio::test]
    async fn test_email_service_creation() {
        let service = test_service(test_config());
        assert!(service.is_enabled());
    }

    #[tokio::test]
    async fn test_email_service_disabled() {
        let mut config = test_config();
        config.enabled = false;
        let service = test_service(config);
        assert!(!service.is_enabled());
    }

    #[tokio::test]
    async fn test_send_console_email() {
        let service = test_service(test_config());
        let message = EmailMessage {
            to: "user@example.com".to_string(),
            to_name: Some("Test User".to_string()),
            subject: "Test Subject".to_string(),
            body_text: "Test body".to_string(),
            body_html: Some("<p>Test body</p>".to_string()),
        };
        assert!(service.send(message).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_disabled_silently_succeeds() {
        let mut config = test_config();
        config.enabled = false;
        let service = test_service(config);
        let message = EmailMessage {
            to: "user@example.com".to_string(),
            to_name: None,
            subject: "Test".to_string(),
            body_text: "Test".to_string(),
            body_html: None,
        };
        assert!(service.send(message).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_provider_fails() {
        let mut config = test_config();
        config.provider = "pigeon".to_string();
        let service = test_service(config);
        let message = EmailMessage {
            to: "user@example.com".to_string(),
            to_name: None,
            subject: "Test".to_string(),
            body_text: "Test".to_string(),
            body_html: None,
        };
        assert!(matches!(
            service.send(message).await,
            Err(EmailError::NotConfigured)
        ));
    }

    #[test]
    fn test_smtp_transport_builds_without_credentials() {
        let mut config = test_config();
        config.provider = "smtp".to_string();
        config.smtp_host = "localhost".to_string();
        config.smtp_use_tls = false;
        assert!(build_smtp_transport(&config).is_ok());
    }
}
