//! Seeded in-memory stores for running without a PSA server.

use std::sync::Arc;

use tally_core::adapters::outbound::mock::{
    MockIntervalStore, MockTicketStore, MockTimeEntryStore,
};
use tally_core::domain::models::{Comment, Interval, TicketDetails, TimePeriod};
use tally_core::domain::RichText;
use time::{Duration, OffsetDateTime};

pub const DEV_TICKET: &str = "TCK-1001";
pub const DEV_USER: &str = "dev-user";

pub fn seeded_stores() -> (
    Arc<MockIntervalStore>,
    Arc<MockTimeEntryStore>,
    Arc<MockTicketStore>,
) {
    let now = OffsetDateTime::now_utc();

    let intervals = vec![
        Interval::new("iv-1", DEV_TICKET, now - Duration::hours(3))
            .with_end_time(now - Duration::hours(2)),
        Interval::new(
            "iv-2",
            DEV_TICKET,
            now - Duration::hours(2) + Duration::minutes(5),
        )
        .with_end_time(now - Duration::minutes(90)),
        // Accidental double-click, below the noise threshold
        Interval::new("iv-3", DEV_TICKET, now - Duration::minutes(80))
            .with_end_time(now - Duration::minutes(80) + Duration::seconds(12)),
        // Still running
        Interval::new("iv-4", DEV_TICKET, now - Duration::minutes(20)),
    ];

    let comments = vec![
        Comment::new(
            "cm-1",
            DEV_TICKET,
            "alice",
            RichText::from_plain_text("Reproduced on the staging tenant."),
            now - Duration::hours(26),
        ),
        Comment::new(
            "cm-2",
            DEV_TICKET,
            DEV_USER,
            RichText::from_plain_text("Root cause is the sync job, fix in review."),
            now - Duration::hours(1),
        ),
    ];
    let ticket = TicketDetails {
        id: DEV_TICKET.into(),
        subject: "Imported contacts missing their billing address".to_string(),
        comments,
    };

    let interval_store = Arc::new(MockIntervalStore::new().with_intervals(intervals));
    let entry_store = Arc::new(MockTimeEntryStore::new().with_open_period(current_period(now)));
    let ticket_store = Arc::new(MockTicketStore::new().with_ticket(ticket));

    (interval_store, entry_store, ticket_store)
}

/// A period spanning the current calendar month.
fn current_period(now: OffsetDateTime) -> TimePeriod {
    let today = now.date();
    let start = today.replace_day(1).unwrap_or(today);
    let end = today
        .replace_day(time::util::days_in_month(today.month(), today.year()))
        .unwrap_or(today);

    TimePeriod::new(format!("p-{}-{}", today.year(), u8::from(today.month())), start, end)
}
