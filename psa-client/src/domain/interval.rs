use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A raw tracking interval as returned by the PSA server.
///
/// `end_time` is `None` while the interval is still being tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalRow {
    pub id: String,
    pub ticket_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
}

/// Request body for the interval merge endpoint.
///
/// The server replaces the listed intervals with a single one spanning
/// their union and returns the replacement row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeIntervalsPayload {
    pub ticket_id: String,
    pub interval_ids: Vec<String>,
}

impl MergeIntervalsPayload {
    pub fn new(ticket_id: impl Into<String>, interval_ids: Vec<String>) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            interval_ids,
        }
    }
}

/// Request body for the bulk interval delete endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteIntervalsPayload {
    pub interval_ids: Vec<String>,
}

impl DeleteIntervalsPayload {
    pub fn new(interval_ids: Vec<String>) -> Self {
        Self { interval_ids }
    }
}
