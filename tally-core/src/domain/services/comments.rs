use std::collections::HashMap;
use std::sync::Arc;

use time::OffsetDateTime;

use crate::domain::{
    models::{Comment, CommentId, TicketId},
    ports::outbound::TicketStore,
    CommentError, RichText,
};

/// Lifecycle of one in-flight comment edit.
///
/// `Idle -> Optimistic -> Reconciling -> Idle`. The optimistic copy is shown
/// as soon as the save resolves; the phase returns to idle once the
/// authoritative re-fetch has been reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditPhase {
    #[default]
    Idle,
    Optimistic,
    Reconciling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEvent {
    SaveResolved,
    SaveFailed,
    RefetchResolved,
    Reconciled,
}

/// Pure transition function for the edit lifecycle. Unexpected events leave
/// the phase unchanged.
pub fn step(phase: EditPhase, event: EditEvent) -> EditPhase {
    match (phase, event) {
        (EditPhase::Idle, EditEvent::SaveResolved) => EditPhase::Optimistic,
        (EditPhase::Idle, EditEvent::SaveFailed) => EditPhase::Idle,
        (EditPhase::Optimistic, EditEvent::RefetchResolved) => EditPhase::Reconciling,
        (EditPhase::Reconciling, EditEvent::Reconciled) => EditPhase::Idle,
        (phase, _) => phase,
    }
}

/// Newest-timestamp-wins comparator for reconciliation.
///
/// The optimistic copy survives only when it is strictly newer; on a tie the
/// fetched copy is authoritative. This keeps a slow re-fetch from clobbering
/// a just-applied edit, and keeps a stale optimistic value from outliving a
/// legitimate newer server-side change.
pub fn pick_newer<'a>(optimistic: &'a Comment, fetched: &'a Comment) -> &'a Comment {
    if optimistic.updated_at > fetched.updated_at {
        optimistic
    } else {
        fetched
    }
}

/// The comment thread of one ticket, with optimistic edit overrides.
///
/// Overrides are keyed by comment id, so edits to distinct comments may be
/// in flight at the same time without coordination.
pub struct CommentEditor<S> {
    store: Arc<S>,
    ticket_id: TicketId,
    subject: String,
    comments: Vec<Comment>,
    overrides: HashMap<CommentId, Comment>,
    phases: HashMap<CommentId, EditPhase>,
}

impl<S: TicketStore> CommentEditor<S> {
    pub fn new(store: Arc<S>, ticket_id: impl Into<TicketId>) -> Self {
        Self {
            store,
            ticket_id: ticket_id.into(),
            subject: String::new(),
            comments: Vec::new(),
            overrides: HashMap::new(),
            phases: HashMap::new(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn phase(&self, comment_id: &CommentId) -> EditPhase {
        self.phases.get(comment_id).copied().unwrap_or_default()
    }

    /// The thread as it should be displayed: the loaded comments with any
    /// in-flight optimistic overrides applied.
    pub fn comments(&self) -> Vec<Comment> {
        self.comments
            .iter()
            .map(|c| self.overrides.get(&c.id).unwrap_or(c).clone())
            .collect()
    }

    /// Fetch the authoritative thread, dropping any overrides.
    pub async fn reload(&mut self) -> Result<(), CommentError> {
        let details = self.store.ticket_details(&self.ticket_id).await?;
        self.subject = details.subject;
        self.comments = details.comments;
        self.overrides.clear();
        self.phases.clear();
        Ok(())
    }

    pub async fn add_comment(&mut self, note: RichText) -> Result<(), CommentError> {
        if note.is_empty() {
            return Err(CommentError::EmptyNote);
        }
        self.store.add_comment(&self.ticket_id, &note).await?;
        self.reload().await
    }

    pub async fn delete_comment(&mut self, comment_id: &CommentId) -> Result<(), CommentError> {
        self.store
            .delete_comment(&self.ticket_id, comment_id)
            .await?;
        self.reload().await
    }

    /// Save an edit to one comment.
    ///
    /// The note is validated before any network call. The save is issued
    /// first; only once it resolves is the optimistic copy applied and the
    /// re-fetch started, so the two calls are sequential per comment. A save
    /// failure leaves all local state untouched, making a retry idempotent.
    pub async fn save_edit(
        &mut self,
        comment_id: &CommentId,
        note: RichText,
        now: OffsetDateTime,
    ) -> Result<(), CommentError> {
        if note.is_empty() {
            return Err(CommentError::EmptyNote);
        }

        let current = self
            .comments
            .iter()
            .find(|c| &c.id == comment_id)
            .cloned()
            .ok_or_else(|| CommentError::CommentNotFound(comment_id.clone()))?;

        if let Err(e) = self
            .store
            .update_comment(&self.ticket_id, comment_id, &note)
            .await
        {
            self.phases
                .insert(comment_id.clone(), step(self.phase(comment_id), EditEvent::SaveFailed));
            return Err(e.into());
        }

        let optimistic = Comment {
            note,
            updated_at: now,
            ..current
        };
        self.overrides.insert(comment_id.clone(), optimistic);
        self.phases.insert(
            comment_id.clone(),
            step(self.phase(comment_id), EditEvent::SaveResolved),
        );

        self.reconcile(comment_id).await;
        Ok(())
    }

    /// Re-fetch the thread and resolve the override for `comment_id` using
    /// [`pick_newer`]. Issued strictly after the save has resolved.
    async fn reconcile(&mut self, comment_id: &CommentId) {
        let details = match self.store.ticket_details(&self.ticket_id).await {
            Ok(details) => details,
            Err(e) => {
                // The save itself succeeded; keep showing the optimistic
                // copy rather than failing the whole edit.
                tracing::warn!(
                    ticket_id = %self.ticket_id,
                    "re-fetch after comment save failed: {:?}",
                    e
                );
                if let Some(optimistic) = self.overrides.remove(comment_id) {
                    if let Some(local) =
                        self.comments.iter_mut().find(|c| &c.id == comment_id)
                    {
                        *local = optimistic;
                    }
                }
                self.phases.remove(comment_id);
                return;
            }
        };

        self.phases.insert(
            comment_id.clone(),
            step(self.phase(comment_id), EditEvent::RefetchResolved),
        );

        self.subject = details.subject;
        let optimistic = self.overrides.remove(comment_id);
        self.comments = details
            .comments
            .into_iter()
            .map(|fetched| match &optimistic {
                Some(opt) if fetched.id == opt.id => pick_newer(opt, &fetched).clone(),
                _ => fetched,
            })
            .collect();

        match step(self.phase(comment_id), EditEvent::Reconciled) {
            EditPhase::Idle => {
                self.phases.remove(comment_id);
            }
            phase => {
                self.phases.insert(comment_id.clone(), phase);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::mock::{CallLog, MockTicketStore};
    use crate::domain::models::TicketDetails;
    use time::macros::datetime;

    const T0: OffsetDateTime = datetime!(2024-05-02 12:00 UTC);
    const T1: OffsetDateTime = datetime!(2024-05-02 12:00:01 UTC);
    const T2: OffsetDateTime = datetime!(2024-05-02 12:00:02 UTC);

    fn comment(id: &str, text: &str, updated_at: OffsetDateTime) -> Comment {
        Comment::new(
            id,
            "t-1",
            "u-1",
            RichText::from_plain_text(text),
            updated_at,
        )
    }

    fn ticket(comments: Vec<Comment>) -> TicketDetails {
        TicketDetails {
            id: "t-1".into(),
            subject: "Printer on fire".to_string(),
            comments,
        }
    }

    #[test]
    fn step_walks_the_edit_lifecycle() {
        let p = step(EditPhase::Idle, EditEvent::SaveResolved);
        assert_eq!(p, EditPhase::Optimistic);
        let p = step(p, EditEvent::RefetchResolved);
        assert_eq!(p, EditPhase::Reconciling);
        let p = step(p, EditEvent::Reconciled);
        assert_eq!(p, EditPhase::Idle);
    }

    #[test]
    fn step_ignores_unexpected_events() {
        assert_eq!(
            step(EditPhase::Optimistic, EditEvent::SaveResolved),
            EditPhase::Optimistic
        );
        assert_eq!(step(EditPhase::Idle, EditEvent::SaveFailed), EditPhase::Idle);
    }

    #[test]
    fn pick_newer_prefers_strictly_newer_optimistic() {
        let optimistic = comment("c-1", "local", T1);
        let fetched = comment("c-1", "server", T0);
        assert_eq!(pick_newer(&optimistic, &fetched).note.text(), "local");
    }

    #[test]
    fn pick_newer_adopts_fetched_on_tie() {
        let optimistic = comment("c-1", "local", T1);
        let fetched = comment("c-1", "server", T1);
        assert_eq!(pick_newer(&optimistic, &fetched).note.text(), "server");
    }

    #[tokio::test]
    async fn optimistic_edit_survives_stale_refetch() {
        // The re-fetch returns a stale snapshot from before the save.
        let store = Arc::new(
            MockTicketStore::new()
                .with_ticket(ticket(vec![comment("c-1", "old", T0)]))
                .with_fetch_response(ticket(vec![comment("c-1", "old", T0)])),
        );
        let mut editor = CommentEditor::new(store, "t-1");
        editor.reload().await.unwrap();

        editor
            .save_edit(&"c-1".into(), RichText::from_plain_text("edited"), T1)
            .await
            .unwrap();

        let comments = editor.comments();
        assert_eq!(comments[0].note.text(), "edited");
        assert_eq!(comments[0].updated_at, T1);
        assert_eq!(editor.phase(&"c-1".into()), EditPhase::Idle);
    }

    #[tokio::test]
    async fn newer_server_copy_wins_over_optimistic() {
        // A concurrent edit landed on the server after ours.
        let store = Arc::new(
            MockTicketStore::new()
                .with_ticket(ticket(vec![comment("c-1", "old", T0)]))
                .with_fetch_response(ticket(vec![comment("c-1", "concurrent", T2)])),
        );
        let mut editor = CommentEditor::new(store, "t-1");
        editor.reload().await.unwrap();

        editor
            .save_edit(&"c-1".into(), RichText::from_plain_text("edited"), T1)
            .await
            .unwrap();

        let comments = editor.comments();
        assert_eq!(comments[0].note.text(), "concurrent");
        assert_eq!(comments[0].updated_at, T2);
    }

    #[tokio::test]
    async fn empty_note_is_rejected_before_any_network_call() {
        let log = CallLog::new();
        let store = Arc::new(
            MockTicketStore::new()
                .with_ticket(ticket(vec![comment("c-1", "old", T0)]))
                .with_call_log(log.clone()),
        );
        let mut editor = CommentEditor::new(store, "t-1");
        editor.reload().await.unwrap();

        let empty = RichText::from_value(serde_json::json!([
            { "type": "paragraph", "content": [] }
        ]));
        let result = editor.save_edit(&"c-1".into(), empty, T1).await;

        assert!(matches!(result, Err(CommentError::EmptyNote)));
        // Only the initial load hit the store.
        assert_eq!(log.calls(), vec!["ticket_details"]);
    }

    #[tokio::test]
    async fn failed_save_applies_no_optimistic_state() {
        let log = CallLog::new();
        let store = Arc::new(
            MockTicketStore::new()
                .with_ticket(ticket(vec![comment("c-1", "old", T0)]))
                .with_call_log(log.clone())
                .with_update_failure(),
        );
        let mut editor = CommentEditor::new(store, "t-1");
        editor.reload().await.unwrap();

        let result = editor
            .save_edit(&"c-1".into(), RichText::from_plain_text("edited"), T1)
            .await;

        assert!(matches!(result, Err(CommentError::Store(_))));
        assert_eq!(editor.comments()[0].note.text(), "old");
        assert_eq!(editor.phase(&"c-1".into()), EditPhase::Idle);
        // No re-fetch was issued after the failed save.
        assert_eq!(log.calls(), vec!["ticket_details", "update_comment"]);
    }

    #[tokio::test]
    async fn refetch_is_issued_strictly_after_save() {
        let log = CallLog::new();
        let store = Arc::new(
            MockTicketStore::new()
                .with_ticket(ticket(vec![comment("c-1", "old", T0)]))
                .with_call_log(log.clone()),
        );
        let mut editor = CommentEditor::new(store, "t-1");
        editor.reload().await.unwrap();

        editor
            .save_edit(&"c-1".into(), RichText::from_plain_text("edited"), T1)
            .await
            .unwrap();

        assert_eq!(
            log.calls(),
            vec!["ticket_details", "update_comment", "ticket_details"]
        );
    }

    #[tokio::test]
    async fn failed_refetch_keeps_optimistic_copy() {
        let store = Arc::new(
            MockTicketStore::new().with_ticket(ticket(vec![comment("c-1", "old", T0)])),
        );
        let mut editor = CommentEditor::new(store.clone(), "t-1");
        editor.reload().await.unwrap();

        store.set_fetch_failure(true);
        editor
            .save_edit(&"c-1".into(), RichText::from_plain_text("edited"), T1)
            .await
            .unwrap();

        assert_eq!(editor.comments()[0].note.text(), "edited");
        assert_eq!(editor.phase(&"c-1".into()), EditPhase::Idle);
    }

    #[tokio::test]
    async fn add_comment_rejects_empty_and_reloads_on_success() {
        let store = Arc::new(MockTicketStore::new().with_ticket(ticket(vec![])));
        let mut editor = CommentEditor::new(store, "t-1");
        editor.reload().await.unwrap();

        let empty = RichText::from_value(serde_json::json!([{ "type": "paragraph" }]));
        assert!(matches!(
            editor.add_comment(empty).await,
            Err(CommentError::EmptyNote)
        ));

        editor
            .add_comment(RichText::from_plain_text("first"))
            .await
            .unwrap();
        assert_eq!(editor.comments().len(), 1);
    }

    #[tokio::test]
    async fn delete_comment_removes_from_thread() {
        let store = Arc::new(
            MockTicketStore::new().with_ticket(ticket(vec![
                comment("c-1", "keep", T0),
                comment("c-2", "drop", T0),
            ])),
        );
        let mut editor = CommentEditor::new(store, "t-1");
        editor.reload().await.unwrap();

        editor.delete_comment(&"c-2".into()).await.unwrap();

        let comments = editor.comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].note.text(), "keep");
    }
}
