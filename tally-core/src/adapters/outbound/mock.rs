//! In-memory store implementations.
//!
//! Used by the service tests and as the backend for the CLI's dev mode.
//! All three stores can share a [`CallLog`] so tests can assert the order
//! of calls across stores.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::domain::{
    models::{
        Comment, CommentId, Interval, IntervalId, TicketDetails, TicketId, TimeEntry,
        TimeEntryDraft, TimePeriod, TimePeriodId, TimeSheet, TimeSheetId, UserId,
    },
    ports::outbound::{IntervalStore, TicketStore, TimeEntryStore},
    RichText, StoreError,
};

/// Append-only record of store calls, shared between mocks.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: &str) {
        self.0.lock().unwrap().push(name.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

fn injected_failure(what: &str) -> StoreError {
    StoreError::Network(format!("injected {} failure", what))
}

/// Mock interval store backed by an in-memory list.
#[derive(Clone, Default)]
pub struct MockIntervalStore {
    intervals: Arc<RwLock<Vec<Interval>>>,
    fail_delete: Arc<AtomicBool>,
    fail_list: Arc<AtomicBool>,
    next_id: Arc<AtomicUsize>,
    log: CallLog,
}

impl MockIntervalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_intervals(self, intervals: Vec<Interval>) -> Self {
        *self.intervals.write().unwrap() = intervals;
        self
    }

    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    /// Make `delete_intervals` fail after removing the first id, leaving the
    /// store in a partially-deleted state.
    pub fn with_partial_delete_failure(self) -> Self {
        self.fail_delete.store(true, Ordering::SeqCst);
        self
    }

    /// Toggle list failures after construction (e.g. after an initial load).
    pub fn set_list_failure(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.intervals.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.read().unwrap().is_empty()
    }
}

#[async_trait]
impl IntervalStore for MockIntervalStore {
    async fn intervals_for_ticket(
        &self,
        ticket_id: &TicketId,
    ) -> Result<Vec<Interval>, StoreError> {
        self.log.record("intervals_for_ticket");

        if self.fail_list.load(Ordering::SeqCst) {
            return Err(injected_failure("list"));
        }

        let mut intervals: Vec<Interval> = self
            .intervals
            .read()
            .unwrap()
            .iter()
            .filter(|i| &i.ticket_id == ticket_id)
            .cloned()
            .collect();
        intervals.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(intervals)
    }

    async fn delete_intervals(&self, ids: &[IntervalId]) -> Result<(), StoreError> {
        self.log.record("delete_intervals");
        let mut intervals = self.intervals.write().unwrap();

        if self.fail_delete.load(Ordering::SeqCst) {
            // Remove only the first id, then report failure.
            if let Some(first) = ids.first() {
                intervals.retain(|i| &i.id != first);
            }
            return Err(injected_failure("delete"));
        }

        intervals.retain(|i| !ids.contains(&i.id));
        Ok(())
    }

    async fn merge_intervals(
        &self,
        ticket_id: &TicketId,
        ids: &[IntervalId],
    ) -> Result<Interval, StoreError> {
        self.log.record("merge_intervals");
        let mut intervals = self.intervals.write().unwrap();

        let selected: Vec<Interval> = intervals
            .iter()
            .filter(|i| ids.contains(&i.id))
            .cloned()
            .collect();
        if selected.len() != ids.len() {
            return Err(StoreError::not_found("interval"));
        }

        let start = selected.iter().map(|i| i.start_time).min().unwrap();
        let end = if selected.iter().any(Interval::is_open) {
            None
        } else {
            selected.iter().filter_map(|i| i.end_time).max()
        };

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut merged = Interval::new(format!("merged-{}", id), ticket_id.clone(), start);
        merged.end_time = end;

        intervals.retain(|i| !ids.contains(&i.id));
        intervals.push(merged.clone());

        Ok(merged)
    }
}

/// Mock time-entry store with injectable save failure.
#[derive(Clone, Default)]
pub struct MockTimeEntryStore {
    entries: Arc<RwLock<Vec<TimeEntry>>>,
    sheets: Arc<RwLock<HashMap<(UserId, TimePeriodId), TimeSheet>>>,
    period: Arc<RwLock<Option<TimePeriod>>>,
    fail_save: Arc<AtomicBool>,
    next_id: Arc<AtomicUsize>,
    log: CallLog,
}

impl MockTimeEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_open_period(self, period: TimePeriod) -> Self {
        *self.period.write().unwrap() = Some(period);
        self
    }

    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn with_save_failure(self) -> Self {
        self.fail_save.store(true, Ordering::SeqCst);
        self
    }

    pub fn entries(&self) -> Vec<TimeEntry> {
        self.entries.read().unwrap().clone()
    }
}

#[async_trait]
impl TimeEntryStore for MockTimeEntryStore {
    async fn save_time_entry(
        &self,
        draft: &TimeEntryDraft,
        time_sheet_id: &TimeSheetId,
    ) -> Result<TimeEntry, StoreError> {
        self.log.record("save_time_entry");

        if self.fail_save.load(Ordering::SeqCst) {
            return Err(injected_failure("save"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let entry = TimeEntry {
            id: format!("entry-{}", id),
            ticket_id: draft.ticket_id.clone(),
            time_sheet_id: time_sheet_id.clone(),
            start_time: draft.start_time,
            end_time: draft.end_time,
            billable_minutes: draft.billable_minutes,
            notes: Some(draft.notes.clone()),
        };
        self.entries.write().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn fetch_or_create_time_sheet(
        &self,
        user_id: &UserId,
        period_id: &TimePeriodId,
    ) -> Result<TimeSheet, StoreError> {
        self.log.record("fetch_or_create_time_sheet");
        let mut sheets = self.sheets.write().unwrap();
        let key = (user_id.clone(), period_id.clone());
        let sheet = sheets.entry(key).or_insert_with(|| {
            TimeSheet::new(
                format!("sheet-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
                user_id.clone(),
                period_id.clone(),
            )
        });
        Ok(sheet.clone())
    }

    async fn current_time_period(&self) -> Result<Option<TimePeriod>, StoreError> {
        self.log.record("current_time_period");
        Ok(self.period.read().unwrap().clone())
    }
}

/// Mock ticket store. The re-fetch response can be pinned independently of
/// the stored state to simulate a stale or concurrently-edited server copy.
#[derive(Clone, Default)]
pub struct MockTicketStore {
    tickets: Arc<RwLock<HashMap<TicketId, TicketDetails>>>,
    fetch_response: Arc<RwLock<Option<TicketDetails>>>,
    fail_update: Arc<AtomicBool>,
    fail_fetch: Arc<AtomicBool>,
    next_id: Arc<AtomicUsize>,
    log: CallLog,
}

impl MockTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ticket(self, details: TicketDetails) -> Self {
        self.tickets
            .write()
            .unwrap()
            .insert(details.id.clone(), details);
        self
    }

    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    /// Pin the response of `ticket_details`, regardless of stored state.
    pub fn with_fetch_response(self, details: TicketDetails) -> Self {
        *self.fetch_response.write().unwrap() = Some(details);
        self
    }

    pub fn with_update_failure(self) -> Self {
        self.fail_update.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_fetch_failure(self) -> Self {
        self.fail_fetch.store(true, Ordering::SeqCst);
        self
    }

    /// Toggle fetch failures after construction (e.g. after an initial load).
    pub fn set_fetch_failure(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn stored_comment(&self, ticket_id: &TicketId, comment_id: &CommentId) -> Option<Comment> {
        self.tickets
            .read()
            .unwrap()
            .get(ticket_id)
            .and_then(|t| t.comments.iter().find(|c| &c.id == comment_id).cloned())
    }
}

#[async_trait]
impl TicketStore for MockTicketStore {
    async fn ticket_details(&self, ticket_id: &TicketId) -> Result<TicketDetails, StoreError> {
        self.log.record("ticket_details");

        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(injected_failure("fetch"));
        }

        if let Some(pinned) = self.fetch_response.read().unwrap().as_ref() {
            return Ok(pinned.clone());
        }

        self.tickets
            .read()
            .unwrap()
            .get(ticket_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("ticket {}", ticket_id)))
    }

    async fn add_comment(
        &self,
        ticket_id: &TicketId,
        note: &RichText,
    ) -> Result<Comment, StoreError> {
        self.log.record("add_comment");
        let mut tickets = self.tickets.write().unwrap();
        let ticket = tickets
            .get_mut(ticket_id)
            .ok_or_else(|| StoreError::not_found(format!("ticket {}", ticket_id)))?;

        let comment = Comment::new(
            format!("comment-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
            ticket_id.clone(),
            "mock-user",
            note.clone(),
            OffsetDateTime::now_utc(),
        );
        ticket.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        ticket_id: &TicketId,
        comment_id: &CommentId,
        note: &RichText,
    ) -> Result<Comment, StoreError> {
        self.log.record("update_comment");

        if self.fail_update.load(Ordering::SeqCst) {
            return Err(injected_failure("update"));
        }

        let mut tickets = self.tickets.write().unwrap();
        let ticket = tickets
            .get_mut(ticket_id)
            .ok_or_else(|| StoreError::not_found(format!("ticket {}", ticket_id)))?;
        let comment = ticket
            .comments
            .iter_mut()
            .find(|c| &c.id == comment_id)
            .ok_or_else(|| StoreError::not_found(format!("comment {}", comment_id)))?;

        comment.note = note.clone();
        comment.updated_at = OffsetDateTime::now_utc();
        Ok(comment.clone())
    }

    async fn delete_comment(
        &self,
        ticket_id: &TicketId,
        comment_id: &CommentId,
    ) -> Result<(), StoreError> {
        self.log.record("delete_comment");
        let mut tickets = self.tickets.write().unwrap();
        let ticket = tickets
            .get_mut(ticket_id)
            .ok_or_else(|| StoreError::not_found(format!("ticket {}", ticket_id)))?;

        let before = ticket.comments.len();
        ticket.comments.retain(|c| &c.id != comment_id);
        if ticket.comments.len() == before {
            return Err(StoreError::not_found(format!("comment {}", comment_id)));
        }
        Ok(())
    }
}
