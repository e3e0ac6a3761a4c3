use serde_json::Value;

use crate::error::{NotifyError, NotifyResult};
use crate::models::appointment::{Appointment, AppointmentChange};
use crate::models::common::{APPOINTMENTS, DOCTORS};
use crate::models::doctor::DoctorRecord;
use crate::models::notification::{
    format_appointment_date, PushNotification, DEFAULT_DOCTOR_NAME,
};
use crate::services::{DirectoryStore, NotificationTransport};

use super::{Dispatch, Notifier, SkipReason};

/// Tells the patient their appointment was confirmed, with the doctor and time.
/// Only a move from a non-confirmed status to exactly "confirmed" notifies.
pub async fn on_document_updated<S, T>(
    notifier: &Notifier<S, T>,
    collection: &str,
    before: Value,
    after: Value,
) -> NotifyResult<Dispatch>
where
    S: DirectoryStore,
    T: NotificationTransport,
{
    if collection != APPOINTMENTS {
        log::debug!("Ignoring document updated in {}", collection);
        return Ok(Dispatch::skipped(SkipReason::UnwatchedCollection));
    }

    if !AppointmentChange::from_documents(&before, &after).is_confirmation() {
        return Ok(Dispatch::skipped(SkipReason::NotAConfirmation));
    }

    let appointment: Appointment = serde_json::from_value(after)?;
    let patient_id = appointment.patient()?;
    let doctor_name = doctor_name(notifier, appointment.confirmed_doctor_id.as_deref()).await?;

    let token = match notifier.recipient_token(patient_id).await? {
        Ok(token) => token,
        Err(reason) => {
            log::info!(
                "No FCM token for user {} on appointment confirmation ({:?})",
                patient_id, reason
            );
            return Ok(Dispatch::skipped(reason));
        }
    };

    let scheduled_for = appointment
        .appointment_date
        .map(|date| format_appointment_date(date, notifier.app().utc_offset))
        .ok_or_else(|| {
            NotifyError::InvalidEvent("confirmed appointment has no appointmentDate".to_string())
        })?;

    log::info!("Sending appointment confirmation to user {}", patient_id);
    let push = PushNotification::appointment_confirmed(&token, &doctor_name, &scheduled_for);
    let message_id = notifier.transport.send(&push).await?;

    Ok(Dispatch::sent(message_id))
}

async fn doctor_name<S, T>(
    notifier: &Notifier<S, T>,
    doctor_id: Option<&str>,
) -> NotifyResult<String>
where
    S: DirectoryStore,
    T: NotificationTransport,
{
    let doctor_id = doctor_id.map(str::trim).filter(|id| !id.is_empty());
    let doctor: Option<DoctorRecord> = match doctor_id {
        Some(id) => notifier.store.get(DOCTORS, id).await?,
        None => None,
    };

    Ok(doctor
        .map(|d| d.doctor_name)
        .unwrap_or_else(|| DEFAULT_DOCTOR_NAME.to_string()))
}
