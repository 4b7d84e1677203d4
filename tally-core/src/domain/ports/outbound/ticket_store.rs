use async_trait::async_trait;

use crate::domain::{
    models::{Comment, CommentId, TicketDetails, TicketId},
    RichText, StoreError,
};

/// Outbound port for tickets and their comment threads.
#[async_trait]
pub trait TicketStore: Send + Sync + 'static {
    async fn ticket_details(&self, ticket_id: &TicketId) -> Result<TicketDetails, StoreError>;

    /// Append a comment. Returns the stored comment with its server id and
    /// authoritative `updated_at`.
    async fn add_comment(
        &self,
        ticket_id: &TicketId,
        note: &RichText,
    ) -> Result<Comment, StoreError>;

    /// Replace a comment's note. Returns the stored comment.
    async fn update_comment(
        &self,
        ticket_id: &TicketId,
        comment_id: &CommentId,
        note: &RichText,
    ) -> Result<Comment, StoreError>;

    async fn delete_comment(
        &self,
        ticket_id: &TicketId,
        comment_id: &CommentId,
    ) -> Result<(), StoreError>;
}
