use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// A ticket comment row. The note is the rich-text document as stored,
/// passed through without interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRow {
    pub id: String,
    pub ticket_id: String,
    pub author_id: String,
    pub note: Value,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A ticket with its comment thread, as returned by the details endpoint.
///
/// Tally only reads the subject and the comments; everything else the
/// server includes is dropped during deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetailsRow {
    pub id: String,
    pub subject: String,
    #[serde(default)]
    pub comments: Vec<CommentRow>,
}

/// Request body for adding a comment to a ticket.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentPayload {
    pub ticket_id: String,
    pub note: Value,
}

impl AddCommentPayload {
    pub fn new(ticket_id: impl Into<String>, note: Value) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            note,
        }
    }
}

/// Request body for replacing a comment's note.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentPayload {
    pub note: Value,
}

impl UpdateCommentPayload {
    pub fn new(note: Value) -> Self {
        Self { note }
    }
}
