use async_trait::async_trait;

use crate::domain::{
    models::{Interval, IntervalId, TicketId},
    StoreError,
};

/// Outbound port for the interval store.
///
/// Intervals are created by the tracking mechanism on the server; the session
/// only reads, merges and deletes them.
#[async_trait]
pub trait IntervalStore: Send + Sync + 'static {
    /// All intervals recorded against a ticket, oldest first.
    async fn intervals_for_ticket(
        &self,
        ticket_id: &TicketId,
    ) -> Result<Vec<Interval>, StoreError>;

    /// Delete the given intervals. May fail part-way through; callers must
    /// reload from the store afterwards rather than patch their local list.
    async fn delete_intervals(&self, ids: &[IntervalId]) -> Result<(), StoreError>;

    /// Replace the given intervals with a single interval spanning their
    /// union. Returns the replacement.
    async fn merge_intervals(
        &self,
        ticket_id: &TicketId,
        ids: &[IntervalId],
    ) -> Result<Interval, StoreError>;
}
