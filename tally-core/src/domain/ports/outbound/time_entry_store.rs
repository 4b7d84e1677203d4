use async_trait::async_trait;

use crate::domain::{
    models::{TimeEntry, TimeEntryDraft, TimePeriod, TimePeriodId, TimeSheet, TimeSheetId, UserId},
    StoreError,
};

/// Outbound port for time-entry persistence.
#[async_trait]
pub trait TimeEntryStore: Send + Sync + 'static {
    /// Persist a draft onto the given sheet. Returns the stored entry.
    async fn save_time_entry(
        &self,
        draft: &TimeEntryDraft,
        time_sheet_id: &TimeSheetId,
    ) -> Result<TimeEntry, StoreError>;

    /// The user's time sheet for a period, created on first use.
    async fn fetch_or_create_time_sheet(
        &self,
        user_id: &UserId,
        period_id: &TimePeriodId,
    ) -> Result<TimeSheet, StoreError>;

    /// The currently open billing period, if any.
    async fn current_time_period(&self) -> Result<Option<TimePeriod>, StoreError>;
}
