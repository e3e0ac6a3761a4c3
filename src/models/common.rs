use serde::Serialize;
use std::fmt;

pub const USERS: &str = "users";
pub const APPOINTMENTS: &str = "appointments";
pub const DOCTORS: &str = "doctors";

/// Field the client app stores the device push token under.
pub const FCM_TOKEN_FIELD: &str = "fcmToken";

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message),
            error: None,
        }
    }

    pub fn error(error: String) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error),
        }
    }
}

/// Part of the day a routine reminder refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoutinePeriod {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl RoutinePeriod {
    /// Buckets a wall-clock hour (0-23): [4,12) morning, [12,17) afternoon,
    /// [17,21) evening, everything else night.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            4..=11 => RoutinePeriod::Morning,
            12..=16 => RoutinePeriod::Afternoon,
            17..=20 => RoutinePeriod::Evening,
            _ => RoutinePeriod::Night,
        }
    }
}

impl fmt::Display for RoutinePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutinePeriod::Morning => write!(f, "Morning"),
            RoutinePeriod::Afternoon => write!(f, "Afternoon"),
            RoutinePeriod::Evening => write!(f, "Evening"),
            RoutinePeriod::Night => write!(f, "Night"),
        }
    }
}
