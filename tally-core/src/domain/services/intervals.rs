use std::collections::HashSet;
use std::sync::Arc;

use time::{Duration, OffsetDateTime};

use crate::domain::{
    models::{Interval, IntervalId, TicketId},
    ports::outbound::IntervalStore,
    TimeTrackingError,
};

/// Intervals shorter than this are treated as tracking noise (a start/stop
/// fumble) and hidden from the working set.
pub const MIN_INTERVAL_SECONDS: i64 = 60;

/// Drops intervals whose duration at `now` is below `threshold`.
///
/// Open intervals are measured against `now`, so a just-started interval is
/// filtered until it has been running for the threshold.
pub fn filter_short(
    intervals: &[Interval],
    threshold: Duration,
    now: OffsetDateTime,
) -> Vec<Interval> {
    intervals
        .iter()
        .filter(|i| i.duration(now) >= threshold)
        .cloned()
        .collect()
}

/// Total duration of the intervals at `now`.
pub fn total_duration(intervals: &[Interval], now: OffsetDateTime) -> Duration {
    intervals
        .iter()
        .fold(Duration::ZERO, |acc, i| acc + i.duration(now))
}

/// The working set of intervals for one ticket: the loaded list plus a
/// selection over it.
///
/// All mutations go through the store and are followed by a reload; the list
/// is never patched locally, so a partially-failed delete can not re-show
/// rows the store already dropped. Every reload clears the selection since
/// the previous ids may no longer exist.
pub struct IntervalWorkspace<S> {
    store: Arc<S>,
    ticket_id: TicketId,
    intervals: Vec<Interval>,
    selected: HashSet<IntervalId>,
}

impl<S: IntervalStore> IntervalWorkspace<S> {
    pub fn new(store: Arc<S>, ticket_id: impl Into<TicketId>) -> Self {
        Self {
            store,
            ticket_id: ticket_id.into(),
            intervals: Vec::new(),
            selected: HashSet::new(),
        }
    }

    pub fn ticket_id(&self) -> &TicketId {
        &self.ticket_id
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Intervals that pass the short-interval filter at `now`.
    pub fn visible_intervals(&self, now: OffsetDateTime) -> Vec<Interval> {
        filter_short(
            &self.intervals,
            Duration::seconds(MIN_INTERVAL_SECONDS),
            now,
        )
    }

    pub fn selected_ids(&self) -> Vec<IntervalId> {
        let mut ids: Vec<IntervalId> = self.selected.iter().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    pub fn selected_intervals(&self) -> Vec<Interval> {
        self.intervals
            .iter()
            .filter(|i| self.selected.contains(&i.id))
            .cloned()
            .collect()
    }

    /// Reload the list from the store. Clears the selection.
    pub async fn reload(&mut self) -> Result<(), TimeTrackingError> {
        self.intervals = self.store.intervals_for_ticket(&self.ticket_id).await?;
        self.selected.clear();
        Ok(())
    }

    /// Add an interval to the selection. Rejects ids not in the loaded list.
    pub fn select(&mut self, id: &IntervalId) -> Result<(), TimeTrackingError> {
        if !self.intervals.iter().any(|i| &i.id == id) {
            return Err(TimeTrackingError::UnknownInterval(id.clone()));
        }
        self.selected.insert(id.clone());
        Ok(())
    }

    pub fn deselect(&mut self, id: &IntervalId) {
        self.selected.remove(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Merge the selected intervals into one spanning their union.
    ///
    /// Requires at least two selected intervals; with fewer there is nothing
    /// to merge and the store is not called.
    pub async fn merge_selected(&mut self) -> Result<Interval, TimeTrackingError> {
        if self.selected.len() < 2 {
            return Err(TimeTrackingError::MergeSelectionTooSmall);
        }

        let ids = self.selected_ids();
        let merged = self.store.merge_intervals(&self.ticket_id, &ids).await?;
        self.reload().await?;
        Ok(merged)
    }

    /// Delete the selected intervals.
    ///
    /// The list is reloaded from the store even when the delete fails
    /// part-way through, so the view never re-shows already-deleted rows.
    pub async fn delete_selected(&mut self) -> Result<(), TimeTrackingError> {
        if self.selected.is_empty() {
            return Err(TimeTrackingError::EmptySelection);
        }

        let ids = self.selected_ids();
        let result = self.store.delete_intervals(&ids).await;
        if let Err(reload_err) = self.reload().await {
            if result.is_ok() {
                return Err(reload_err);
            }
            // The delete failure is the actionable error; log the secondary
            // reload failure instead of letting it shadow the first.
            tracing::warn!(
                ticket_id = %self.ticket_id,
                "reload after failed delete also failed: {:?}",
                reload_err
            );
        }
        result.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::mock::MockIntervalStore;
    use crate::domain::StoreError;
    use time::macros::datetime;

    fn closed(id: &str, start: OffsetDateTime, end: OffsetDateTime) -> Interval {
        Interval::new(id, "t-1", start).with_end_time(end)
    }

    fn open(id: &str, start: OffsetDateTime) -> Interval {
        Interval::new(id, "t-1", start)
    }

    const NOW: OffsetDateTime = datetime!(2024-05-02 12:00 UTC);

    #[test]
    fn filter_short_drops_sub_threshold_intervals() {
        let intervals = vec![
            closed(
                "long",
                datetime!(2024-05-02 10:00 UTC),
                datetime!(2024-05-02 10:05 UTC),
            ),
            closed(
                "short",
                datetime!(2024-05-02 10:10 UTC),
                datetime!(2024-05-02 10:10:30 UTC),
            ),
            // Open since 11:59:30, 30 s old at NOW.
            open("young-open", datetime!(2024-05-02 11:59:30 UTC)),
            // Open since 11:00, well past the threshold at NOW.
            open("old-open", datetime!(2024-05-02 11:00 UTC)),
        ];

        let kept = filter_short(&intervals, Duration::seconds(60), NOW);
        let ids: Vec<&str> = kept.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["long", "old-open"]);
    }

    #[test]
    fn filter_short_keeps_exact_threshold() {
        let intervals = vec![closed(
            "exact",
            datetime!(2024-05-02 10:00 UTC),
            datetime!(2024-05-02 10:01 UTC),
        )];
        let kept = filter_short(&intervals, Duration::seconds(60), NOW);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn total_duration_uses_now_for_open_intervals() {
        let intervals = vec![
            closed(
                "a",
                datetime!(2024-05-02 10:00 UTC),
                datetime!(2024-05-02 10:05 UTC),
            ),
            open("b", datetime!(2024-05-02 11:50 UTC)),
        ];
        assert_eq!(total_duration(&intervals, NOW), Duration::minutes(15));
    }

    #[test]
    fn total_duration_is_additive_over_partitions() {
        let a = vec![
            closed(
                "a1",
                datetime!(2024-05-02 09:00 UTC),
                datetime!(2024-05-02 09:12 UTC),
            ),
            open("a2", datetime!(2024-05-02 11:30 UTC)),
        ];
        let b = vec![closed(
            "b1",
            datetime!(2024-05-02 10:00 UTC),
            datetime!(2024-05-02 10:45 UTC),
        )];

        let combined: Vec<Interval> = a.iter().chain(b.iter()).cloned().collect();
        assert_eq!(
            total_duration(&combined, NOW),
            total_duration(&a, NOW) + total_duration(&b, NOW)
        );
    }

    #[tokio::test]
    async fn reload_clears_selection() {
        let store = Arc::new(MockIntervalStore::new().with_intervals(vec![closed(
            "a",
            datetime!(2024-05-02 10:00 UTC),
            datetime!(2024-05-02 10:05 UTC),
        )]));
        let mut workspace = IntervalWorkspace::new(store, "t-1");

        workspace.reload().await.unwrap();
        workspace.select(&"a".into()).unwrap();
        assert_eq!(workspace.selected_ids().len(), 1);

        workspace.reload().await.unwrap();
        assert!(workspace.selected_ids().is_empty());
    }

    #[tokio::test]
    async fn select_rejects_unknown_id() {
        let store = Arc::new(MockIntervalStore::new());
        let mut workspace = IntervalWorkspace::new(store, "t-1");
        workspace.reload().await.unwrap();

        let result = workspace.select(&"ghost".into());
        assert!(matches!(
            result,
            Err(TimeTrackingError::UnknownInterval(_))
        ));
    }

    #[tokio::test]
    async fn merge_requires_two_selected() {
        let store = Arc::new(MockIntervalStore::new().with_intervals(vec![closed(
            "a",
            datetime!(2024-05-02 10:00 UTC),
            datetime!(2024-05-02 10:05 UTC),
        )]));
        let mut workspace = IntervalWorkspace::new(store.clone(), "t-1");
        workspace.reload().await.unwrap();
        workspace.select(&"a".into()).unwrap();

        let result = workspace.merge_selected().await;
        assert!(matches!(
            result,
            Err(TimeTrackingError::MergeSelectionTooSmall)
        ));
        // The store was never asked to merge.
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn merge_replaces_selection_with_spanning_interval() {
        let store = Arc::new(MockIntervalStore::new().with_intervals(vec![
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
        ]));
        let mut workspace = IntervalWorkspace::new(store, "t-1");
        workspace.reload().await.unwrap();
        workspace.select(&"a".into()).unwrap();
        workspace.select(&"b".into()).unwrap();

        let merged = workspace.merge_selected().await.unwrap();
        assert_eq!(merged.start_time, datetime!(2024-05-02 10:00 UTC));
        assert_eq!(merged.end_time, Some(datetime!(2024-05-02 10:10 UTC)));

        assert_eq!(workspace.intervals().len(), 1);
        assert!(workspace.selected_ids().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_still_reloads_from_store() {
        let store = Arc::new(
            MockIntervalStore::new()
                .with_intervals(vec![
                    closed(
                        "a",
                        datetime!(2024-05-02 10:00 UTC),
                        datetime!(2024-05-02 10:05 UTC),
                    ),
                    closed(
                        "b",
                        datetime!(2024-05-02 11:00 UTC),
                        datetime!(2024-05-02 11:05 UTC),
                    ),
                ])
                .with_partial_delete_failure(),
        );
        let mut workspace = IntervalWorkspace::new(store, "t-1");
        workspace.reload().await.unwrap();
        workspace.select(&"a".into()).unwrap();
        workspace.select(&"b".into()).unwrap();

        let result = workspace.delete_selected().await;
        assert!(result.is_err());

        // "a" was deleted before the failure; the reload must not re-show it.
        let ids: Vec<&str> = workspace.intervals().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
        assert!(workspace.selected_ids().is_empty());
    }

    #[tokio::test]
    async fn delete_failure_survives_a_failed_reload() {
        let store = Arc::new(
            MockIntervalStore::new()
                .with_intervals(vec![
                    closed(
                        "a",
                        datetime!(2024-05-02 10:00 UTC),
                        datetime!(2024-05-02 10:05 UTC),
                    ),
                    closed(
                        "b",
                        datetime!(2024-05-02 11:00 UTC),
                        datetime!(2024-05-02 11:05 UTC),
                    ),
                ])
                .with_partial_delete_failure(),
        );
        let mut workspace = IntervalWorkspace::new(store.clone(), "t-1");
        workspace.reload().await.unwrap();
        workspace.select(&"a".into()).unwrap();
        workspace.select(&"b".into()).unwrap();

        store.set_list_failure(true);
        let result = workspace.delete_selected().await;

        // The delete error is reported, not the secondary reload error.
        match result {
            Err(TimeTrackingError::Store(StoreError::Network(msg))) => {
                assert!(msg.contains("delete"), "unexpected error: {}", msg);
            }
            other => panic!("expected delete failure, got {:?}", other),
        }
    }
}
