//! Mapping between PSA wire rows and domain models.

use std::str::FromStr;

use psa_client::{
    domain::{CommentRow, IntervalRow, TicketDetailsRow, TimeEntryPayload, TimeEntryRow,
        TimePeriodRow, TimeSheetRow},
    PsaFetchError,
};
use time::{format_description::BorrowedFormatItem, macros::format_description, Date};

use crate::domain::{
    models::{
        ApprovalStatus, Comment, Interval, TicketDetails, TimeEntry, TimeEntryDraft, TimePeriod,
        TimeSheet, TimeSheetId,
    },
    RichText, StoreError,
};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

impl From<PsaFetchError> for StoreError {
    fn from(error: PsaFetchError) -> Self {
        match error {
            PsaFetchError::Unauthorized => StoreError::Unauthorized,
            PsaFetchError::NotFound => StoreError::not_found("resource"),
            PsaFetchError::ResponseError(msg) | PsaFetchError::Other(msg) => {
                StoreError::network(msg)
            }
            PsaFetchError::ParsingError(msg) => StoreError::Invalid(msg),
        }
    }
}

impl From<IntervalRow> for Interval {
    fn from(row: IntervalRow) -> Self {
        Self {
            id: row.id.into(),
            ticket_id: row.ticket_id.into(),
            start_time: row.start_time,
            end_time: row.end_time,
        }
    }
}

impl From<TimeEntryRow> for TimeEntry {
    fn from(row: TimeEntryRow) -> Self {
        Self {
            id: row.id,
            ticket_id: row.ticket_id.into(),
            time_sheet_id: row.time_sheet_id.into(),
            start_time: row.start_time,
            end_time: row.end_time,
            billable_minutes: row.billable_minutes,
            notes: row.notes,
        }
    }
}

impl TryFrom<TimePeriodRow> for TimePeriod {
    type Error = StoreError;

    fn try_from(row: TimePeriodRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            start_date: parse_date(&row.start_date)?,
            end_date: parse_date(&row.end_date)?,
        })
    }
}

impl From<TimeSheetRow> for TimeSheet {
    fn from(row: TimeSheetRow) -> Self {
        // Unknown statuses are treated as Draft rather than failing the
        // whole fetch; the session never writes the status back.
        let status = ApprovalStatus::from_str(&row.approval_status).unwrap_or_default();
        TimeSheet::new(row.id, row.user_id, row.period_id).with_approval_status(status)
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id.into(),
            ticket_id: row.ticket_id.into(),
            author_id: row.author_id.into(),
            note: RichText::from_value(row.note),
            updated_at: row.updated_at,
        }
    }
}

impl From<TicketDetailsRow> for TicketDetails {
    fn from(row: TicketDetailsRow) -> Self {
        Self {
            id: row.id.into(),
            subject: row.subject,
            comments: row.comments.into_iter().map(Comment::from).collect(),
        }
    }
}

pub fn entry_payload(draft: &TimeEntryDraft, time_sheet_id: &TimeSheetId) -> TimeEntryPayload {
    TimeEntryPayload::new(
        draft.ticket_id.as_str(),
        time_sheet_id.as_str(),
        draft.start_time,
        draft.end_time,
        draft.billable_minutes,
        draft.notes.clone(),
    )
}

fn parse_date(s: &str) -> Result<Date, StoreError> {
    Date::parse(s, DATE_FORMAT)
        .map_err(|e| StoreError::Invalid(format!("invalid date '{}': {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn period_row_parses_dates() {
        let row = TimePeriodRow {
            id: "p-1".to_string(),
            start_date: "2024-05-01".to_string(),
            end_date: "2024-05-31".to_string(),
        };

        let period = TimePeriod::try_from(row).unwrap();
        assert_eq!(period.start_date, date!(2024 - 05 - 01));
        assert_eq!(period.end_date, date!(2024 - 05 - 31));
    }

    #[test]
    fn period_row_with_bad_date_is_invalid() {
        let row = TimePeriodRow {
            id: "p-1".to_string(),
            start_date: "05/01/2024".to_string(),
            end_date: "2024-05-31".to_string(),
        };

        assert!(matches!(
            TimePeriod::try_from(row),
            Err(StoreError::Invalid(_))
        ));
    }

    #[test]
    fn sheet_row_with_unknown_status_falls_back_to_draft() {
        let row = TimeSheetRow {
            id: "ts-1".to_string(),
            user_id: "u-1".to_string(),
            period_id: "p-1".to_string(),
            approval_status: "Archived".to_string(),
        };

        let sheet = TimeSheet::from(row);
        assert_eq!(sheet.approval_status, ApprovalStatus::Draft);
    }

    #[test]
    fn comment_row_wraps_note_as_rich_text() {
        let row = CommentRow {
            id: "c-1".to_string(),
            ticket_id: "t-1".to_string(),
            author_id: "u-1".to_string(),
            note: serde_json::json!({
                "type": "doc",
                "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "hello"}]}
                ]
            }),
            updated_at: datetime!(2024-05-02 10:00 UTC),
        };

        let comment = Comment::from(row);
        assert!(!comment.note.is_empty());
        assert_eq!(comment.note.text(), "hello");
    }
}
