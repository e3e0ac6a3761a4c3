use serde::{Deserialize, Serialize};

/// A document in the `users` collection.
///
/// The client app owns these documents and writes `fcmToken` whenever the
/// device registers for push; this service only reads them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub fcm_token: Option<String>,
}

impl UserRecord {
    #[cfg(test)]
    pub fn with_token(token: &str) -> Self {
        Self {
            display_name: None,
            fcm_token: Some(token.to_string()),
        }
    }

    /// The stored push token, if the user has a usable one. Blank tokens
    /// count as missing; anything else is returned exactly as stored.
    pub fn token(&self) -> Option<&str> {
        self.fcm_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }
}
