use serde::Serialize;
use chrono::{DateTime, FixedOffset, Utc};

use crate::models::common::RoutinePeriod;

pub const DEFAULT_DISPLAY_NAME: &str = "User";
pub const DEFAULT_DOCTOR_NAME: &str = "Your Doctor";

/// en-US "full" date followed by "short" time, e.g. `Monday, March 3, 2025 at 2:30 PM`.
const APPOINTMENT_DATE_FORMAT: &str = "%A, %B %-d, %Y at %-I:%M %p";

/// A push message addressed to a single device token. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushNotification {
    pub token: String,
    pub title: String,
    pub body: String,
}

impl PushNotification {
    pub fn new(token: &str, title: String, body: String) -> Self {
        Self {
            token: token.to_string(),
            title,
            body,
        }
    }

    pub fn welcome(token: &str, app_name: &str, display_name: Option<&str>) -> Self {
        let name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME);

        Self::new(
            token,
            format!("Welcome to {}, {}!", app_name, name),
            "We're glad to have you on this journey with us.".to_string(),
        )
    }

    pub fn daily_routine(token: &str, period: RoutinePeriod) -> Self {
        Self::new(
            token,
            "Your Daily Routine is Ready!".to_string(),
            format!("Here are your {} tasks to keep your mind sharp.", period),
        )
    }

    pub fn appointment_requested(token: &str) -> Self {
        Self::new(
            token,
            "Appointment Request Sent!".to_string(),
            "Your request has been submitted. We will notify you of any updates.".to_string(),
        )
    }

    pub fn appointment_confirmed(token: &str, doctor_name: &str, scheduled_for: &str) -> Self {
        Self::new(
            token,
            "Your Appointment is Confirmed!".to_string(),
            format!(
                "Your appointment with {} is scheduled for {}.",
                doctor_name, scheduled_for
            ),
        )
    }
}

pub fn format_appointment_date(date: DateTime<Utc>, offset: FixedOffset) -> String {
    date.with_timezone(&offset)
        .format(APPOINTMENT_DATE_FORMAT)
        .to_string()
}
