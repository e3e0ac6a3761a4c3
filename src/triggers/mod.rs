//! Event handlers: each one turns a single trigger event into at most one
//! push per recipient.

pub mod appointment_confirmed;
pub mod appointment_created;
pub mod daily_digest;
pub mod welcome;

#[cfg(test)]
pub(crate) mod test_support;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::NotifyResult;
use crate::models::common::USERS;
use crate::models::event::TriggerEvent;
use crate::models::user::UserRecord;
use crate::services::{DirectoryStore, NotificationTransport};

/// Why a handler finished without sending anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoUserRecord,
    NoToken,
    NoRecipients,
    NotAConfirmation,
    UnwatchedCollection,
}

/// What a handler did with an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Dispatch {
    Sent { message_ids: Vec<String> },
    Skipped { reason: SkipReason },
}

impl Dispatch {
    pub fn sent(message_id: String) -> Self {
        Dispatch::Sent { message_ids: vec![message_id] }
    }

    pub fn skipped(reason: SkipReason) -> Self {
        Dispatch::Skipped { reason }
    }
}

/// Process-wide handle shared by the intake endpoint and the digest schedule.
pub struct Notifier<S, T> {
    store: S,
    transport: T,
    app: AppConfig,
}

impl<S, T> Notifier<S, T>
where
    S: DirectoryStore,
    T: NotificationTransport,
{
    pub fn new(store: S, transport: T, app: AppConfig) -> Self {
        Self { store, transport, app }
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    /// Routes an event to its handler. `now` is the invocation time the
    /// digest uses to pick its period label.
    pub async fn dispatch(
        &self,
        event: TriggerEvent,
        now: DateTime<Utc>,
    ) -> NotifyResult<Dispatch> {
        match event {
            TriggerEvent::AccountCreated { id, display_name } => {
                welcome::on_account_created(self, &id, display_name.as_deref()).await
            }
            TriggerEvent::TimeTick {} => daily_digest::on_time_tick(self, now).await,
            TriggerEvent::DocumentCreated { collection, record } => {
                appointment_created::on_document_created(self, &collection, record).await
            }
            TriggerEvent::DocumentUpdated { collection, before, after } => {
                appointment_confirmed::on_document_updated(self, &collection, before, after).await
            }
        }
    }

    /// Looks up the push token for a user. A missing record or token is a
    /// normal outcome and comes back as the reason to skip.
    pub(crate) async fn recipient_token(
        &self,
        user_id: &str,
    ) -> NotifyResult<Result<String, SkipReason>> {
        let user: Option<UserRecord> = self.store.get(USERS, user_id).await?;

        Ok(match user {
            None => Err(SkipReason::NoUserRecord),
            Some(user) => user.token().map(str::to_string).ok_or(SkipReason::NoToken),
        })
    }
}
