//! Outbound ports implemented over the PSA server HTTP client.

mod conversions;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use psa_client::{
    domain::{
        AddCommentPayload, DeleteIntervalsPayload, MergeIntervalsPayload, TimeSheetPayload,
        UpdateCommentPayload,
    },
    PsaClient, PsaFetchError,
};

use crate::domain::{
    models::{
        Comment, CommentId, Interval, IntervalId, TicketDetails, TicketId, TimeEntry,
        TimeEntryDraft, TimePeriod, TimePeriodId, TimeSheet, TimeSheetId, UserId,
    },
    ports::outbound::{IntervalStore, TicketStore, TimeEntryStore},
    RichText, StoreError,
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// All three outbound ports, backed by the PSA server.
///
/// Every call is bounded by a timeout: a hung connection surfaces as
/// `StoreError::Timeout` instead of leaving the session stuck in a
/// processing state.
pub struct PsaStore {
    client: Arc<PsaClient>,
    timeout: Duration,
}

impl PsaStore {
    pub fn new(client: Arc<PsaClient>) -> Self {
        Self {
            client,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, PsaFetchError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(StoreError::Timeout(self.timeout.as_secs())),
        }
    }
}

#[async_trait]
impl IntervalStore for PsaStore {
    async fn intervals_for_ticket(
        &self,
        ticket_id: &TicketId,
    ) -> Result<Vec<Interval>, StoreError> {
        let rows = self
            .bounded(self.client.fetch_ticket_intervals(ticket_id.as_str()))
            .await?;
        Ok(rows.into_iter().map(Interval::from).collect())
    }

    async fn delete_intervals(&self, ids: &[IntervalId]) -> Result<(), StoreError> {
        let payload =
            DeleteIntervalsPayload::new(ids.iter().map(|id| id.as_str().to_string()).collect());
        self.bounded(self.client.delete_intervals(&payload)).await
    }

    async fn merge_intervals(
        &self,
        ticket_id: &TicketId,
        ids: &[IntervalId],
    ) -> Result<Interval, StoreError> {
        let payload = MergeIntervalsPayload::new(
            ticket_id.as_str(),
            ids.iter().map(|id| id.as_str().to_string()).collect(),
        );
        let row = self.bounded(self.client.merge_intervals(&payload)).await?;
        Ok(row.into())
    }
}

#[async_trait]
impl TimeEntryStore for PsaStore {
    async fn save_time_entry(
        &self,
        draft: &TimeEntryDraft,
        time_sheet_id: &TimeSheetId,
    ) -> Result<TimeEntry, StoreError> {
        let payload = conversions::entry_payload(draft, time_sheet_id);
        let row = self.bounded(self.client.create_time_entry(&payload)).await?;
        Ok(row.into())
    }

    async fn fetch_or_create_time_sheet(
        &self,
        user_id: &UserId,
        period_id: &TimePeriodId,
    ) -> Result<TimeSheet, StoreError> {
        let payload = TimeSheetPayload::new(user_id.as_str(), period_id.as_str());
        let row = self
            .bounded(self.client.fetch_or_create_time_sheet(&payload))
            .await?;
        Ok(row.into())
    }

    async fn current_time_period(&self) -> Result<Option<TimePeriod>, StoreError> {
        let row = self
            .bounded(self.client.fetch_current_time_period())
            .await?;
        row.map(TimePeriod::try_from).transpose()
    }
}

#[async_trait]
impl TicketStore for PsaStore {
    async fn ticket_details(&self, ticket_id: &TicketId) -> Result<TicketDetails, StoreError> {
        let row = self
            .bounded(self.client.fetch_ticket_details(ticket_id.as_str()))
            .await?;
        Ok(row.into())
    }

    async fn add_comment(
        &self,
        ticket_id: &TicketId,
        note: &RichText,
    ) -> Result<Comment, StoreError> {
        let payload = AddCommentPayload::new(ticket_id.as_str(), note.as_value().clone());
        let row = self.bounded(self.client.add_ticket_comment(&payload)).await?;
        Ok(row.into())
    }

    async fn update_comment(
        &self,
        ticket_id: &TicketId,
        comment_id: &CommentId,
        note: &RichText,
    ) -> Result<Comment, StoreError> {
        let payload = UpdateCommentPayload::new(note.as_value().clone());
        let row = self
            .bounded(self.client.update_ticket_comment(
                ticket_id.as_str(),
                comment_id.as_str(),
                &payload,
            ))
            .await?;
        Ok(row.into())
    }

    async fn delete_comment(
        &self,
        ticket_id: &TicketId,
        comment_id: &CommentId,
    ) -> Result<(), StoreError> {
        self.bounded(
            self.client
                .delete_ticket_comment(ticket_id.as_str(), comment_id.as_str()),
        )
        .await
    }
}
