use std::sync::Arc;

use itertools::Itertools;
use time::OffsetDateTime;

use crate::domain::{
    models::{Interval, TimeEntry, TimeEntryDraft, UserId},
    ports::outbound::{IntervalStore, TimeEntryStore},
    TimeTrackingError,
};

/// Collapse a set of intervals into a single proposed time entry.
///
/// The draft spans from the earliest start to the latest end (open intervals
/// end at `now`), with the billable duration rounded to whole minutes.
pub fn synthesize(
    intervals: &[Interval],
    now: OffsetDateTime,
) -> Result<TimeEntryDraft, TimeTrackingError> {
    let first = intervals.first().ok_or(TimeTrackingError::NoIntervals)?;

    let start_time = intervals
        .iter()
        .map(|i| i.start_time)
        .min()
        .unwrap_or(first.start_time);
    let end_time = intervals
        .iter()
        .map(|i| i.effective_end(now))
        .max()
        .unwrap_or_else(|| first.effective_end(now));

    let span = (end_time - start_time).max(time::Duration::ZERO);
    let billable_minutes = (span.whole_seconds() as f64 / 60.0).round() as i64;

    Ok(TimeEntryDraft {
        ticket_id: first.ticket_id.clone(),
        start_time,
        end_time,
        billable_minutes,
        notes: format!("Created from {} interval(s)", intervals.len()),
    })
}

/// Turns interval selections into persisted time entries.
///
/// The ordering invariant lives here: the entry is persisted before the
/// source intervals are deleted. Reversing that would risk losing the only
/// record of the tracked time.
pub struct TimeEntryService<I, T> {
    interval_store: Arc<I>,
    entry_store: Arc<T>,
}

impl<I: IntervalStore, T: TimeEntryStore> TimeEntryService<I, T> {
    pub fn new(interval_store: Arc<I>, entry_store: Arc<T>) -> Self {
        Self {
            interval_store,
            entry_store,
        }
    }

    /// Persist a draft built from `intervals` onto the user's sheet for the
    /// current period, then delete the source intervals.
    ///
    /// If the save fails the intervals are left untouched and the error is
    /// returned; the caller keeps the draft and may retry. If the delete
    /// fails after a successful save, the entry is kept and the failure is
    /// only logged; the intervals will be re-listed, but no time is lost.
    pub async fn record_from_intervals(
        &self,
        user_id: &UserId,
        intervals: &[Interval],
        now: OffsetDateTime,
    ) -> Result<TimeEntry, TimeTrackingError> {
        let draft = synthesize(intervals, now)?;
        self.record_draft(user_id, &draft, intervals).await
    }

    /// As [`record_from_intervals`](Self::record_from_intervals), but with a
    /// caller-adjusted draft (edited notes, trimmed span).
    pub async fn record_draft(
        &self,
        user_id: &UserId,
        draft: &TimeEntryDraft,
        source_intervals: &[Interval],
    ) -> Result<TimeEntry, TimeTrackingError> {
        let period = self
            .entry_store
            .current_time_period()
            .await?
            .ok_or(TimeTrackingError::NoOpenPeriod)?;

        let sheet = self
            .entry_store
            .fetch_or_create_time_sheet(user_id, &period.id)
            .await?;

        let entry = self.entry_store.save_time_entry(draft, &sheet.id).await?;

        let ids = source_intervals.iter().map(|i| i.id.clone()).collect_vec();
        if let Err(e) = self.interval_store.delete_intervals(&ids).await {
            tracing::error!(
                entry_id = %entry.id,
                "time entry saved but source intervals were not deleted: {:?}",
                e
            );
        }

        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::mock::{CallLog, MockIntervalStore, MockTimeEntryStore};
    use crate::domain::models::TimePeriod;
    use time::macros::{date, datetime};

    const NOW: OffsetDateTime = datetime!(2024-05-02 12:00 UTC);

    fn closed(id: &str, start: OffsetDateTime, end: OffsetDateTime) -> Interval {
        Interval::new(id, "t-1", start).with_end_time(end)
    }

    fn may_period() -> TimePeriod {
        TimePeriod::new("p-2024-05", date!(2024 - 05 - 01), date!(2024 - 05 - 31))
    }

    #[test]
    fn synthesize_spans_overlapping_intervals() {
        let intervals = vec![
            closed(
                "a",
                datetime!(2024-05-02 10:00 UTC),
                datetime!(2024-05-02 10:05 UTC),
            ),
            closed(
                "b",
                datetime!(2024-05-02 10:03 UTC),
                datetime!(2024-05-02 10:10 UTC),
            ),
        ];

        let draft = synthesize(&intervals, NOW).unwrap();
        assert_eq!(draft.start_time, datetime!(2024-05-02 10:00 UTC));
        assert_eq!(draft.end_time, datetime!(2024-05-02 10:10 UTC));
        assert_eq!(draft.billable_minutes, 10);
        assert_eq!(draft.notes, "Created from 2 interval(s)");
    }

    #[test]
    fn synthesize_uses_now_for_open_intervals() {
        let intervals = vec![Interval::new(
            "a",
            "t-1",
            datetime!(2024-05-02 11:30 UTC),
        )];

        let draft = synthesize(&intervals, NOW).unwrap();
        assert_eq!(draft.end_time, NOW);
        assert_eq!(draft.billable_minutes, 30);
    }

    #[test]
    fn synthesize_rounds_to_whole_minutes() {
        let intervals = vec![closed(
            "a",
            datetime!(2024-05-02 10:00 UTC),
            datetime!(2024-05-02 10:05:31 UTC),
        )];

        let draft = synthesize(&intervals, NOW).unwrap();
        assert_eq!(draft.billable_minutes, 6);
    }

    #[test]
    fn synthesize_requires_intervals() {
        let result = synthesize(&[], NOW);
        assert!(matches!(result, Err(TimeTrackingError::NoIntervals)));
    }

    #[tokio::test]
    async fn save_happens_before_interval_delete() {
        let log = CallLog::new();
        let intervals = vec![closed(
            "a",
            datetime!(2024-05-02 10:00 UTC),
            datetime!(2024-05-02 10:05 UTC),
        )];
        let interval_store = Arc::new(
            MockIntervalStore::new()
                .with_intervals(intervals.clone())
                .with_call_log(log.clone()),
        );
        let entry_store = Arc::new(
            MockTimeEntryStore::new()
                .with_open_period(may_period())
                .with_call_log(log.clone()),
        );
        let service = TimeEntryService::new(interval_store.clone(), entry_store.clone());

        let entry = service
            .record_from_intervals(&"u-1".into(), &intervals, NOW)
            .await
            .unwrap();

        assert_eq!(entry.billable_minutes, 5);
        assert!(interval_store.is_empty());
        assert_eq!(
            log.calls(),
            vec![
                "current_time_period",
                "fetch_or_create_time_sheet",
                "save_time_entry",
                "delete_intervals",
            ]
        );
    }

    #[tokio::test]
    async fn failed_save_never_deletes_intervals() {
        let log = CallLog::new();
        let intervals = vec![closed(
            "a",
            datetime!(2024-05-02 10:00 UTC),
            datetime!(2024-05-02 10:05 UTC),
        )];
        let interval_store = Arc::new(
            MockIntervalStore::new()
                .with_intervals(intervals.clone())
                .with_call_log(log.clone()),
        );
        let entry_store = Arc::new(
            MockTimeEntryStore::new()
                .with_open_period(may_period())
                .with_save_failure()
                .with_call_log(log.clone()),
        );
        let service = TimeEntryService::new(interval_store.clone(), entry_store);

        let result = service
            .record_from_intervals(&"u-1".into(), &intervals, NOW)
            .await;

        assert!(result.is_err());
        assert_eq!(interval_store.len(), 1);
        assert!(!log.calls().iter().any(|c| c == "delete_intervals"));
    }

    #[tokio::test]
    async fn missing_period_is_an_error() {
        let intervals = vec![closed(
            "a",
            datetime!(2024-05-02 10:00 UTC),
            datetime!(2024-05-02 10:05 UTC),
        )];
        let service = TimeEntryService::new(
            Arc::new(MockIntervalStore::new().with_intervals(intervals.clone())),
            Arc::new(MockTimeEntryStore::new()),
        );

        let result = service
            .record_from_intervals(&"u-1".into(), &intervals, NOW)
            .await;
        assert!(matches!(result, Err(TimeTrackingError::NoOpenPeriod)));
    }
}
