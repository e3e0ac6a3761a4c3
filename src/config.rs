use anyhow::{anyhow, Context, Result};
use chrono::{FixedOffset, NaiveTime};
use std::env;

const DEFAULT_FCM_API_URL: &str = "https://fcm.googleapis.com";
const DEFAULT_FCM_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub webhook_secret: Option<String>,
    pub database: DatabaseConfig,
    pub fcm: FcmConfig,
    pub app: AppConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FcmConfig {
    pub project_id: String,
    pub api_url: String,
    pub access_token: Option<String>,
    pub token_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_name: String,
    /// Wall-clock zone for the digest schedule, period labels and appointment dates.
    pub utc_offset: FixedOffset,
    pub digest_time: NaiveTime,
    pub digest_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("PORT must be a port number")?;

        Ok(Config {
            port,
            webhook_secret: optional_var("WEBHOOK_SECRET"),

            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "mem://".to_string()),
                namespace: env::var("DATABASE_NAMESPACE")
                    .unwrap_or_else(|_| "neural_insight".to_string()),
                database: env::var("DATABASE_NAME").unwrap_or_else(|_| "main".to_string()),
                username: optional_var("DATABASE_USER"),
                password: optional_var("DATABASE_PASS"),
            },

            fcm: FcmConfig {
                project_id: env::var("FCM_PROJECT_ID")
                    .context("FCM_PROJECT_ID must be set in the environment or .env file")?,
                api_url: env::var("FCM_API_URL")
                    .unwrap_or_else(|_| DEFAULT_FCM_API_URL.to_string()),
                access_token: optional_var("FCM_ACCESS_TOKEN"),
                token_url: env::var("FCM_TOKEN_URL")
                    .unwrap_or_else(|_| DEFAULT_FCM_TOKEN_URL.to_string()),
            },

            app: AppConfig {
                app_name: env::var("APP_NAME").unwrap_or_else(|_| "Neural Insight".to_string()),
                utc_offset: parse_utc_offset(
                    &env::var("NOTIFIER_UTC_OFFSET").unwrap_or_else(|_| "+05:30".to_string()),
                )?,
                digest_time: NaiveTime::parse_from_str(
                    &env::var("DIGEST_TIME").unwrap_or_else(|_| "08:00".to_string()),
                    "%H:%M",
                )
                .context("DIGEST_TIME must look like HH:MM")?,
                digest_enabled: env::var("DIGEST_ENABLED")
                    .map(|v| v != "false" && v != "0")
                    .unwrap_or(true),
            },
        })
    }
}

impl DatabaseConfig {
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            url: "mem://".to_string(),
            namespace: "neural_insight".to_string(),
            database: "test".to_string(),
            username: None,
            password: None,
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parses offsets written as `+05:30`, `-04:00` or `Z`.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(|| anyhow!("invalid offset"));
    }

    let (sign, rest) = if let Some(rest) = value.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = value.strip_prefix('-') {
        (-1, rest)
    } else {
        return Err(anyhow!("UTC offset must start with + or -: {}", value));
    };

    let (hours, minutes) = rest
        .split_once(':')
        .ok_or_else(|| anyhow!("UTC offset must look like +HH:MM: {}", value))?;
    let hours: i32 = hours.parse().with_context(|| format!("bad offset hours in {}", value))?;
    let minutes: i32 = minutes.parse().with_context(|| format!("bad offset minutes in {}", value))?;

    if minutes >= 60 {
        return Err(anyhow!("UTC offset minutes out of range: {}", value));
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| anyhow!("UTC offset out of range: {}", value))
}
