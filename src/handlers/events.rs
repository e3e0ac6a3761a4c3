use actix_web::web::{self, Bytes, Data};
use actix_web::{HttpRequest, HttpResponse};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::NotifyError;
use crate::models::common::ApiResponse;
use crate::models::event::EventEnvelope;
use crate::services::{DirectoryStore, NotificationTransport};
use crate::triggers::Notifier;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "X-Notifier-Signature";

/// Shared secret trigger sources sign event bodies with. `None` turns
/// verification off.
#[derive(Debug, Clone, Default)]
pub struct WebhookSecret(pub Option<String>);

pub fn configure<S, T>(cfg: &mut web::ServiceConfig)
where
    S: DirectoryStore + 'static,
    T: NotificationTransport + 'static,
{
    cfg.route("/events", web::post().to(receive_event::<S, T>));
}

/// Hex HMAC-SHA256 of the raw request body.
pub fn calculate_signature(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

fn signature_is_valid(secret: &str, body: &[u8], provided: &str) -> bool {
    let provided = match hex::decode(provided.trim()) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    mac.verify_slice(&provided).is_ok()
}

fn unauthorized(reason: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::<()>::error(reason.to_string()))
}

/// Accepts exactly one trigger event per request and runs its handler.
///
/// Responds 200 with the dispatch outcome (including skips), 400 for an
/// unreadable event, 401 for a bad signature and 502 when the store or the
/// push transport failed, so the caller can decide whether to redeliver.
pub async fn receive_event<S, T>(
    req: HttpRequest,
    body: Bytes,
    notifier: Data<Notifier<S, T>>,
    secret: Data<WebhookSecret>,
) -> Result<HttpResponse, NotifyError>
where
    S: DirectoryStore + 'static,
    T: NotificationTransport + 'static,
{
    if let Some(secret) = &secret.0 {
        let provided = req
            .headers()
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        if provided.is_empty() {
            log::warn!("Rejected event without {} header", SIGNATURE_HEADER);
            return Ok(unauthorized("Missing signature"));
        }

        if !signature_is_valid(secret, &body, provided) {
            log::warn!("Rejected event with invalid signature");
            return Ok(unauthorized("Invalid signature"));
        }
    }

    let envelope: EventEnvelope = serde_json::from_slice(&body)?;
    let event_id = envelope.event_id;
    log::info!("📨 Received {} event {}", envelope.event.kind(), event_id);

    match notifier.dispatch(envelope.event, Utc::now()).await {
        Ok(outcome) => {
            log::info!("Event {} handled: {:?}", event_id, outcome);
            Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
                outcome,
                format!("event {}", event_id),
            )))
        }
        Err(e) => {
            log::error!("❌ Event {} failed: {}", event_id, e);
            Err(e)
        }
    }
}
