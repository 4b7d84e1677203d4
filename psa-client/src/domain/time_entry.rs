use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Request body for creating a time entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryPayload {
    pub ticket_id: String,
    pub time_sheet_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
    pub billable_minutes: i64,
    pub notes: String,
}

impl TimeEntryPayload {
    pub fn new(
        ticket_id: impl Into<String>,
        time_sheet_id: impl Into<String>,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
        billable_minutes: i64,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            time_sheet_id: time_sheet_id.into(),
            start_time,
            end_time,
            billable_minutes,
            notes: notes.into(),
        }
    }
}

/// A persisted time entry as returned by the PSA server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryRow {
    pub id: String,
    pub ticket_id: String,
    pub time_sheet_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
    pub billable_minutes: i64,
    #[serde(default)]
    pub notes: Option<String>,
}
