use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

use crate::error::{NotifyError, NotifyResult};

/// Appointment status as written by the client and doctor apps.
///
/// The set is open: unknown values are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
    Other(String),
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Rejected => "rejected",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Other(value) => value,
        }
    }
}

// Matching is exact: "Confirmed" is not "confirmed".
impl From<String> for AppointmentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => AppointmentStatus::Pending,
            "confirmed" => AppointmentStatus::Confirmed,
            "rejected" => AppointmentStatus::Rejected,
            "cancelled" => AppointmentStatus::Cancelled,
            "completed" => AppointmentStatus::Completed,
            _ => AppointmentStatus::Other(value),
        }
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document in the `appointments` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub confirmed_doctor_id: Option<String>,
    #[serde(default)]
    pub appointment_date: Option<DateTime<Utc>>,
}

impl Appointment {
    /// The patient this appointment belongs to; a blank id makes the event unusable.
    pub fn patient(&self) -> NotifyResult<&str> {
        let patient_id = self.patient_id.trim();
        if patient_id.is_empty() {
            return Err(NotifyError::InvalidEvent("appointment has no patientId".to_string()));
        }
        Ok(patient_id)
    }
}

/// The status on each side of an update to an appointment document.
///
/// Only `status` is read here, so other fields in the raw documents cannot
/// turn an irrelevant update into an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentChange {
    pub before: Option<AppointmentStatus>,
    pub after: Option<AppointmentStatus>,
}

impl AppointmentChange {
    pub fn from_documents(before: &Value, after: &Value) -> Self {
        Self {
            before: status_of(before),
            after: status_of(after),
        }
    }

    /// True only for a move from any non-confirmed status into "confirmed".
    pub fn is_confirmation(&self) -> bool {
        let confirmed = Some(AppointmentStatus::Confirmed);
        self.before != confirmed && self.after == confirmed
    }
}

fn status_of(document: &Value) -> Option<AppointmentStatus> {
    document
        .get("status")
        .and_then(Value::as_str)
        .map(|status| AppointmentStatus::from(status.to_string()))
}
