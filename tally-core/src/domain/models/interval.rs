use time::{Duration, OffsetDateTime};

use super::{IntervalId, TicketId, TimeSheetId};

/// A contiguous start/stop span of tracked work time on a ticket.
///
/// An interval with no `end_time` is still being tracked; its duration grows
/// with the wall clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub id: IntervalId,
    pub ticket_id: TicketId,
    pub start_time: OffsetDateTime,
    pub end_time: Option<OffsetDateTime>,
}

impl Interval {
    pub fn new(
        id: impl Into<IntervalId>,
        ticket_id: impl Into<TicketId>,
        start_time: OffsetDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            ticket_id: ticket_id.into(),
            start_time,
            end_time: None,
        }
    }

    pub fn with_end_time(mut self, end_time: OffsetDateTime) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// The effective end of the interval: `end_time` for closed intervals,
    /// `now` for open ones.
    pub fn effective_end(&self, now: OffsetDateTime) -> OffsetDateTime {
        self.end_time.unwrap_or(now)
    }

    /// Duration of the interval at `now`. Negative spans (clock skew between
    /// client and server) clamp to zero.
    pub fn duration(&self, now: OffsetDateTime) -> Duration {
        let span = self.effective_end(now) - self.start_time;
        span.max(Duration::ZERO)
    }
}

/// A proposed time entry derived from one or more intervals.
///
/// Not persisted until explicitly saved; owned by the session that built it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntryDraft {
    pub ticket_id: TicketId,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
    pub billable_minutes: i64,
    pub notes: String,
}

impl TimeEntryDraft {
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// A persisted time entry as confirmed by the time-entry store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntry {
    pub id: String,
    pub ticket_id: TicketId,
    pub time_sheet_id: TimeSheetId,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
    pub billable_minutes: i64,
    pub notes: Option<String>,
}
