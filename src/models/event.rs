use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One event delivered by a trigger source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerEvent {
    #[serde(rename_all = "camelCase")]
    AccountCreated {
        id: String,
        #[serde(default)]
        display_name: Option<String>,
    },
    TimeTick {},
    DocumentCreated {
        collection: String,
        record: Value,
    },
    DocumentUpdated {
        collection: String,
        before: Value,
        after: Value,
    },
}

impl TriggerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            TriggerEvent::AccountCreated { .. } => "account_created",
            TriggerEvent::TimeTick {} => "time_tick",
            TriggerEvent::DocumentCreated { .. } => "document_created",
            TriggerEvent::DocumentUpdated { .. } => "document_updated",
        }
    }
}

/// Wire shape accepted by the intake endpoint: the event plus an optional id
/// the caller can use to correlate logs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    #[serde(default = "Uuid::new_v4")]
    pub event_id: Uuid,
    #[serde(flatten)]
    pub event: TriggerEvent,
}
