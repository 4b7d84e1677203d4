use reqwest::{RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::{
    domain::{
        AddCommentPayload, CommentRow, DeleteIntervalsPayload, IntervalRow, MergeIntervalsPayload,
        TicketDetailsRow, TimeEntryPayload, TimeEntryRow, TimePeriodRow, TimeSheetPayload,
        TimeSheetRow, UpdateCommentPayload,
    },
    Credentials, PsaUrl,
};

pub struct PsaClient {
    http: reqwest::Client,
    base_url: PsaUrl,
}

impl PsaClient {
    pub fn new(base_url: PsaUrl, credentials: Credentials) -> Result<Self, PsaFetchError> {
        let headers = credentials
            .as_headers()
            .map_err(|e| PsaFetchError::Other(e.to_string()))?;
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| PsaFetchError::Other(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, PsaFetchError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| PsaFetchError::ResponseError(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PsaFetchError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(PsaFetchError::NotFound);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PsaFetchError::ResponseError(format!(
                "{}: {}",
                status, body
            )));
        }

        resp.json::<T>().await.map_err(|e| {
            PsaFetchError::ParsingError(format!("Failed to parse response as JSON: {}", e))
        })
    }

    async fn send_no_content(&self, builder: RequestBuilder) -> Result<(), PsaFetchError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| PsaFetchError::ResponseError(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PsaFetchError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(PsaFetchError::NotFound);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PsaFetchError::ResponseError(format!(
                "{}: {}",
                status, body
            )));
        }

        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, url: PsaUrl) -> Result<T, PsaFetchError> {
        tracing::debug!("GET {}", url.as_ref());
        self.send(self.http.get(url.as_ref())).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: PsaUrl,
        body: &B,
    ) -> Result<T, PsaFetchError> {
        tracing::debug!("POST {}", url.as_ref());
        self.send(self.http.post(url.as_ref()).json(body)).await
    }

    // ========================================================================
    // Intervals
    // ========================================================================

    pub async fn fetch_ticket_intervals(
        &self,
        ticket_id: &str,
    ) -> Result<Vec<IntervalRow>, PsaFetchError> {
        let url = self
            .base_url
            .append_path("/api/time-tracking/intervals")
            .with_param("ticketId", ticket_id);

        self.get(url).await
    }

    pub async fn merge_intervals(
        &self,
        payload: &MergeIntervalsPayload,
    ) -> Result<IntervalRow, PsaFetchError> {
        let url = self.base_url.append_path("/api/time-tracking/intervals/merge");

        self.post(url, payload).await
    }

    pub async fn delete_intervals(
        &self,
        payload: &DeleteIntervalsPayload,
    ) -> Result<(), PsaFetchError> {
        let url = self
            .base_url
            .append_path("/api/time-tracking/intervals/delete");

        tracing::debug!("POST {}", url.as_ref());
        self.send_no_content(self.http.post(url.as_ref()).json(payload))
            .await
    }

    // ========================================================================
    // Time entries / time sheets
    // ========================================================================

    pub async fn create_time_entry(
        &self,
        payload: &TimeEntryPayload,
    ) -> Result<TimeEntryRow, PsaFetchError> {
        let url = self.base_url.append_path("/api/time-entries");

        self.post(url, payload).await
    }

    pub async fn fetch_or_create_time_sheet(
        &self,
        payload: &TimeSheetPayload,
    ) -> Result<TimeSheetRow, PsaFetchError> {
        let url = self.base_url.append_path("/api/time-sheets");

        self.post(url, payload).await
    }

    /// Returns the currently open billing period, or `None` when the tenant
    /// has no open period.
    pub async fn fetch_current_time_period(
        &self,
    ) -> Result<Option<TimePeriodRow>, PsaFetchError> {
        let url = self.base_url.append_path("/api/time-periods/current");

        match self.get(url).await {
            Ok(period) => Ok(Some(period)),
            Err(PsaFetchError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // Tickets / comments
    // ========================================================================

    pub async fn fetch_ticket_details(
        &self,
        ticket_id: &str,
    ) -> Result<TicketDetailsRow, PsaFetchError> {
        let url = self
            .base_url
            .append_path("/api/tickets")
            .append_path(ticket_id);

        self.get(url).await
    }

    pub async fn add_ticket_comment(
        &self,
        payload: &AddCommentPayload,
    ) -> Result<CommentRow, PsaFetchError> {
        let url = self
            .base_url
            .append_path("/api/tickets")
            .append_path(&payload.ticket_id)
            .append_path("comments");

        self.post(url, payload).await
    }

    pub async fn update_ticket_comment(
        &self,
        ticket_id: &str,
        comment_id: &str,
        payload: &UpdateCommentPayload,
    ) -> Result<CommentRow, PsaFetchError> {
        let url = self
            .base_url
            .append_path("/api/tickets")
            .append_path(ticket_id)
            .append_path("comments")
            .append_path(comment_id);

        tracing::debug!("PUT {}", url.as_ref());
        self.send(self.http.put(url.as_ref()).json(payload)).await
    }

    pub async fn delete_ticket_comment(
        &self,
        ticket_id: &str,
        comment_id: &str,
    ) -> Result<(), PsaFetchError> {
        let url = self
            .base_url
            .append_path("/api/tickets")
            .append_path(ticket_id)
            .append_path("comments")
            .append_path(comment_id);

        tracing::debug!("DELETE {}", url.as_ref());
        self.send_no_content(self.http.delete(url.as_ref())).await
    }
}

#[derive(Error, Debug)]
pub enum PsaFetchError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("NotFound")]
    NotFound,
    #[error("ResponseError: {0}")]
    ResponseError(String),
    #[error("ParsingError: {0}")]
    ParsingError(String),
    #[error("Other: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use crate::domain::{IntervalRow, MergeIntervalsPayload, TimeEntryPayload};
    use time::macros::datetime;

    #[test]
    fn interval_row_round_trips_rfc3339() {
        let json = r#"{
            "id": "iv-1",
            "ticketId": "t-1",
            "startTime": "2024-05-02T10:00:00Z",
            "endTime": null
        }"#;

        let row: IntervalRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.start_time, datetime!(2024-05-02 10:00 UTC));
        assert!(row.end_time.is_none());
    }

    #[test]
    fn merge_payload_uses_camel_case() {
        let payload = MergeIntervalsPayload::new("t-1", vec!["a".into(), "b".into()]);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["ticketId"], "t-1");
        assert_eq!(json["intervalIds"][1], "b");
    }

    #[test]
    fn time_entry_payload_serializes_minutes() {
        let payload = TimeEntryPayload::new(
            "t-1",
            "sheet-1",
            datetime!(2024-05-02 10:00 UTC),
            datetime!(2024-05-02 10:10 UTC),
            10,
            "Created from 2 interval(s)",
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["billableMinutes"], 10);
        assert_eq!(json["timeSheetId"], "sheet-1");
    }
}
