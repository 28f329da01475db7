//! Zalo Official Account messaging through the Abitstore proxy.
//!
//! Credentials live in the settings row, not in configuration, because
//! the refresh flow rotates the stored token pair in place. Only the
//! OAuth endpoint and the request timeout come from config.

use std::time::Duration;

use domain::models::SystemSettings;
use persistence::repositories::SettingsRepository;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::config::ZaloConfig;

/// Errors that can occur talking to Zalo or the Abitstore proxy.
#[derive(Debug, Error)]
pub enum ZaloError {
    #[error("Zalo integration is not configured: {0}")]
    NotConfigured(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream error text, surfaced verbatim to the operator.
    #[error("{0}")]
    Upstream(String),
}

#[derive(Debug, Deserialize)]
struct ProxyResponse {
    message: Option<String>,
    error: Option<String>,
}

/// Zalo's OAuth endpoint reports errors in the body, sometimes with a
/// 200 status, so token presence decides success.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    error_name: Option<String>,
    error_description: Option<String>,
}

/// Client for the two operator actions: test send and token refresh.
#[derive(Clone)]
pub struct ZaloClient {
    http: reqwest::Client,
    config: ZaloConfig,
    settings: SettingsRepository,
}

impl ZaloClient {
    /// Creates a new client with the configured request timeout.
    pub fn new(config: ZaloConfig, settings: SettingsRepository) -> Result<Self, ZaloError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            config,
            settings,
        })
    }

    /// Send one message through the stored Abitstore endpoint.
    ///
    /// Returns the upstream success message so the operator sees exactly
    /// what the proxy reported.
    pub async fn send_message(&self, recipient: &str, text: &str) -> Result<String, ZaloError> {
        let settings = self
            .settings
            .get()
            .await?
            .ok_or_else(|| ZaloError::NotConfigured("settings row is missing".to_string()))?;

        let access_token = settings
            .zalo_access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ZaloError::NotConfigured("no access token stored".to_string()))?;
        let api_url = settings
            .abitstore_api_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ZaloError::NotConfigured("no Abitstore API URL stored".to_string()))?;

        let response = self
            .http
            .post(api_url)
            .header("access_token", access_token)
            .json(&serde_json::json!({
                "phone": recipient,
                "message": text,
            }))
            .send()
            .await?;

        let status = response.status();
        let body: ProxyResponse = response.json().await.unwrap_or(ProxyResponse {
            message: None,
            error: Some(format!("Unreadable response (status {})", status)),
        });

        if status.is_success() && body.error.is_none() {
            let message = body.message.unwrap_or_else(|| "Message sent".to_string());
            info!(recipient = %recipient, "Zalo message sent");
            Ok(message)
        } else {
            let detail = body
                .error
                .or(body.message)
                .unwrap_or_else(|| format!("Abitstore returned status {}", status));
            error!(status = %status, error = %detail, "Zalo send failed");
            Err(ZaloError::Upstream(detail))
        }
    }

    /// Exchange the stored refresh token for a new pair and persist it.
    pub async fn refresh_token(&self) -> Result<String, ZaloError> {
        let settings = self
            .settings
            .get()
            .await?
            .map(SystemSettings::from)
            .ok_or_else(|| ZaloError::NotConfigured("settings row is missing".to_string()))?;

        if !settings.zalo_refreshable() {
            return Err(ZaloError::NotConfigured(
                "app id, secret key and refresh token are all required".to_string(),
            ));
        }
        let app_id = settings.zalo_app_id.unwrap_or_default();
        let secret_key = settings.zalo_secret_key.unwrap_or_default();
        let refresh_token = settings.zalo_refresh_token.unwrap_or_default();

        let response = self
            .http
            .post(&self.config.oauth_url)
            .header("secret_key", &secret_key)
            .form(&[
                ("app_id", app_id.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ZaloError::Upstream(format!("Unreadable token response: {}", e)))?;

        match (body.access_token, body.refresh_token) {
            (Some(access), Some(refresh)) if !access.is_empty() => {
                self.settings.update_zalo_tokens(&access, &refresh).await?;
                info!("Zalo token pair rotated");
                Ok("Token refreshed".to_string())
            }
            _ => {
                let detail = match (body.error_name, body.error_description) {
                    (Some(name), Some(desc)) => format!("{}: {}", name, desc),
                    (Some(name), None) => name,
                    (None, Some(desc)) => desc,
                    (None, None) => format!("Zalo OAuth returned status {}", status),
                };
                error!(status = %status, error = %detail, "Zalo token refresh failed");
                Err(ZaloError::Upstream(detail))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;

    fn test_client() -> ZaloClient {
        let pool = PgPool::connect_lazy("postgres://localhost/conference_manager_unused")
            .expect("lazy pool");
        ZaloClient::new(
            ZaloConfig {
                oauth_url: "https://oauth.zaloapp.com/v4/oa/access_token".to_string(),
                request_timeout_secs: 1,
            },
            SettingsRepository::new(pool),
        )
        .expect("zalo client")
    }

    #[tokio::test]
    async fn test_send_without_settings_row_is_not_configured() {
        // The lazy pool fails on first use, which surfaces as a database
        // error rather than a panic.
        let client = test_client();
        let result = client.send_message("0900000000", "hello").await;
        assert!(matches!(
            result,
            Err(ZaloError::Database(_)) | Err(ZaloError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_upstream_error_displays_verbatim() {
        let err = ZaloError::Upstream("Invalid access token".to_string());
        assert_eq!(err.to_string(), "Invalid access token");
    }
}
