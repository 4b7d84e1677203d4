use time::OffsetDateTime;

use super::{CommentId, TicketId, UserId};
use crate::domain::RichText;

/// A ticket comment. The canonical copy lives on the PSA server; the session
/// holds a local shadow that may temporarily diverge while an edit is in
/// flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub ticket_id: TicketId,
    pub author_id: UserId,
    pub note: RichText,
    pub updated_at: OffsetDateTime,
}

impl Comment {
    pub fn new(
        id: impl Into<CommentId>,
        ticket_id: impl Into<TicketId>,
        author_id: impl Into<UserId>,
        note: RichText,
        updated_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            ticket_id: ticket_id.into(),
            author_id: author_id.into(),
            note,
            updated_at,
        }
    }
}

/// A ticket with its comment thread. All other ticket fields are opaque to
/// the session and stay on the server.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketDetails {
    pub id: TicketId,
    pub subject: String,
    pub comments: Vec<Comment>,
}
