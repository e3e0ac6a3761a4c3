use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::FcmConfig;
use crate::error::{NotifyError, NotifyResult};
use crate::models::notification::PushNotification;

/// Delivers a push message to one device token and returns the provider's message id.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn send(&self, notification: &PushNotification) -> NotifyResult<String>;
}

#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Firebase Cloud Messaging over the HTTP v1 API.
#[derive(Clone)]
pub struct FcmService {
    client: Client,
    config: FcmConfig,
    access_token: Arc<Mutex<Option<AccessToken>>>,
}

impl FcmService {
    pub fn new(config: FcmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            access_token: Arc::new(Mutex::new(None)),
        }
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.config.api_url.trim_end_matches('/'),
            self.config.project_id
        )
    }

    /// Bearer token for the FCM API. A statically configured token wins;
    /// otherwise one is fetched from the metadata server and reused until
    /// it is close to expiring.
    ///
    /// The cache lock is held across the refresh, so concurrent sends on a
    /// cold cache wait for a single token request instead of each making one.
    async fn authenticate(&self) -> NotifyResult<String> {
        if let Some(token) = &self.config.access_token {
            return Ok(token.clone());
        }

        let mut token_guard = self.access_token.lock().await;
        if let Some(token) = &*token_guard {
            if token.expires_at > Utc::now() + Duration::minutes(5) {
                return Ok(token.token.clone());
            }
        }

        log::info!("Requesting new FCM access token");

        let response = self.client
            .get(&self.config.token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(NotifyError::Transport(format!(
                "token request failed with status {}: {}",
                status, error_text
            )));
        }

        let auth_response: Value = response.json().await?;
        let access_token = auth_response["access_token"]
            .as_str()
            .ok_or_else(|| NotifyError::Transport("No access_token in response".to_string()))?
            .to_string();

        let expires_in = auth_response["expires_in"].as_i64().unwrap_or(3600);

        *token_guard = Some(AccessToken {
            token: access_token.clone(),
            expires_at: Utc::now() + Duration::seconds(expires_in),
        });

        Ok(access_token)
    }
}

#[async_trait]
impl NotificationTransport for FcmService {
    async fn send(&self, notification: &PushNotification) -> NotifyResult<String> {
        let access_token = self.authenticate().await?;

        let payload = json!({
            "message": {
                "token": notification.token,
                "notification": {
                    "title": notification.title,
                    "body": notification.body,
                }
            }
        });

        let response = self.client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let body: Value = serde_json::from_str(&body_text)
            .map_err(|e| NotifyError::Transport(format!("unreadable FCM response: {}", e)))?;

        let message_id = body["name"]
            .as_str()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| NotifyError::Transport("FCM response has no message name".to_string()))?
            .to_string();
        log::debug!("FCM accepted message {}", message_id);
        Ok(message_id)
    }
}
