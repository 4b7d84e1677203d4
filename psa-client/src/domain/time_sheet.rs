use serde::{Deserialize, Serialize};

/// A billing period as returned by the PSA server.
///
/// Dates use the server's `YYYY-MM-DD` convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePeriodRow {
    pub id: String,
    pub start_date: String,
    pub end_date: String,
}

/// A time sheet scoped to one user and one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSheetRow {
    pub id: String,
    pub user_id: String,
    pub period_id: String,
    pub approval_status: String,
}

/// Request body for the fetch-or-create time sheet endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSheetPayload {
    pub user_id: String,
    pub period_id: String,
}

impl TimeSheetPayload {
    pub fn new(user_id: impl Into<String>, period_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            period_id: period_id.into(),
        }
    }
}
