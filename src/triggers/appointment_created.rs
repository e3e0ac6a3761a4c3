use serde_json::Value;

use crate::error::NotifyResult;
use crate::models::appointment::Appointment;
use crate::models::common::APPOINTMENTS;
use crate::models::notification::PushNotification;
use crate::services::{DirectoryStore, NotificationTransport};

use super::{Dispatch, Notifier, SkipReason};

/// Acknowledges a new appointment request to the patient who made it.
pub async fn on_document_created<S, T>(
    notifier: &Notifier<S, T>,
    collection: &str,
    record: Value,
) -> NotifyResult<Dispatch>
where
    S: DirectoryStore,
    T: NotificationTransport,
{
    if collection != APPOINTMENTS {
        log::debug!("Ignoring document created in {}", collection);
        return Ok(Dispatch::skipped(SkipReason::UnwatchedCollection));
    }

    let appointment: Appointment = serde_json::from_value(record)?;
    let patient_id = appointment.patient()?;

    let token = match notifier.recipient_token(patient_id).await? {
        Ok(token) => token,
        Err(reason) => {
            log::info!("No FCM token for user {} on new appointment ({:?})", patient_id, reason);
            return Ok(Dispatch::skipped(reason));
        }
    };

    log::info!("Sending appointment creation notification to user {}", patient_id);
    let message_id = notifier
        .transport
        .send(&PushNotification::appointment_requested(&token))
        .await?;

    Ok(Dispatch::sent(message_id))
}
