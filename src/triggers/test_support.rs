use async_trait::async_trait;
use chrono::{FixedOffset, NaiveTime};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::error::{NotifyError, NotifyResult};
use crate::models::common::{DOCTORS, USERS};
use crate::models::doctor::DoctorRecord;
use crate::models::notification::PushNotification;
use crate::models::user::UserRecord;
use crate::services::{DirectoryStore, FieldPredicate, NotificationTransport};

use super::Notifier;

pub fn app_config() -> AppConfig {
    AppConfig {
        app_name: "Neural Insight".to_string(),
        utc_offset: FixedOffset::east_opt(0).unwrap(),
        digest_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        digest_enabled: true,
    }
}

pub fn notifier(
    store: MemoryStore,
    transport: RecordingTransport,
) -> Notifier<MemoryStore, RecordingTransport> {
    Notifier::new(store, transport, app_config())
}

/// Collections held as JSON documents keyed by id.
#[derive(Default)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<(String, Value)>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails.
    pub fn unavailable() -> Self {
        Self { unavailable: true, ..Self::default() }
    }

    pub fn with_document<R: Serialize>(mut self, collection: &str, id: &str, record: R) -> Self {
        let value = serde_json::to_value(record).unwrap();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push((id.to_string(), value));
        self
    }

    pub fn with_user(self, id: &str, user: UserRecord) -> Self {
        self.with_document(USERS, id, user)
    }

    pub fn with_doctor(self, id: &str, name: &str) -> Self {
        self.with_document(DOCTORS, id, DoctorRecord { doctor_name: name.to_string() })
    }

    fn check(&self) -> NotifyResult<()> {
        if self.unavailable {
            return Err(NotifyError::Store("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn get<T>(&self, collection: &str, id: &str) -> NotifyResult<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.check()?;
        let found = self.collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| doc_id == id))
            .map(|(_, value)| value.clone());

        match found {
            Some(value) => Ok(Some(decode(value)?)),
            None => Ok(None),
        }
    }

    async fn query<T>(&self, collection: &str, predicate: &FieldPredicate) -> NotifyResult<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.check()?;
        let docs = match self.collections.get(collection) {
            Some(docs) => docs,
            None => return Ok(Vec::new()),
        };

        docs.iter()
            .filter(|(_, value)| match predicate {
                FieldPredicate::NotNull(field) => value.get(*field).map_or(false, |v| !v.is_null()),
            })
            .map(|(_, value)| decode(value.clone()))
            .collect()
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> NotifyResult<T> {
    serde_json::from_value(value).map_err(|e| NotifyError::Store(e.to_string()))
}

/// Records every push; tokens listed in `failing` are rejected.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<PushNotification>>>,
    failing: Arc<HashSet<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(tokens: &[&str]) -> Self {
        Self {
            sent: Arc::default(),
            failing: Arc::new(tokens.iter().map(|t| t.to_string()).collect()),
        }
    }

    /// Every attempted push, including rejected ones.
    pub fn sent(&self) -> Vec<PushNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn send(&self, notification: &PushNotification) -> NotifyResult<String> {
        let index = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(notification.clone());
            sent.len()
        };

        if self.failing.contains(&notification.token) {
            return Err(NotifyError::Rejected {
                status: 404,
                body: format!("UNREGISTERED {}", notification.token),
            });
        }

        Ok(format!("projects/test/messages/{}", index))
    }
}
