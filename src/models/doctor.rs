use serde::{Deserialize, Serialize};

/// A document in the `doctors` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorRecord {
    pub doctor_name: String,
}
