use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Backend ids arrive as JSON strings or numbers; both are kept as strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Signed(n) => n.to_string(),
        RawId::Unsigned(n) => n.to_string(),
    })
}

/// Appointment as returned by the backend. `schedule` stays a raw string so
/// that malformed values reach the classifiers instead of failing the fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Appointment {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[schema(example = "2025-01-17T19:00:00.000Z")]
    pub schedule: String,
    /// Minutes.
    pub duration: u32,
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct NewAppointment {
    #[schema(value_type = String, format = "date-time", example = "2025-01-17T19:00:00Z")]
    pub schedule: DateTime<Utc>,
    pub duration: u32,
    pub user_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct TimeGroups {
    pub past: Vec<Appointment>,
    pub future: Vec<Appointment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct LocalDayGroup {
    #[schema(value_type = String, format = "date", example = "2025-01-17")]
    pub date: NaiveDate,
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceLevel {
    Sufficient,
    Insufficient,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct FridayEvening {
    #[schema(value_type = String, format = "date", example = "2025-01-17")]
    pub date: NaiveDate,
    pub attendees: Vec<String>,
    pub is_user_attending: bool,
    pub level: AttendanceLevel,
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Invite {
    pub token: String,
    pub email: String,
    /// ISO-8601 on most records, epoch milliseconds or locale strings on older ones.
    pub expires_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ActiveInvite {
    pub token: String,
    pub email: String,
    pub expires: String,
}
