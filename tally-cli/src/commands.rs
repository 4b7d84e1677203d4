use std::sync::Arc;

use anyhow::Context;
use tally_core::domain::ports::outbound::{IntervalStore, TicketStore, TimeEntryStore};
use tally_core::domain::services::{
    synthesize, total_duration, CommentEditor, IntervalWorkspace, TimeEntryService,
};
use tally_core::domain::RichText;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::cli::{Commands, CommentsCommand, EntryCommand, IntervalsCommand};

pub async fn dispatch<I, T, K>(
    command: Commands,
    interval_store: Arc<I>,
    entry_store: Arc<T>,
    ticket_store: Arc<K>,
) -> anyhow::Result<()>
where
    I: IntervalStore,
    T: TimeEntryStore,
    K: TicketStore,
{
    match command {
        Commands::Intervals { command } => intervals(command, interval_store).await,
        Commands::Entry { command } => entry(command, interval_store, entry_store).await,
        Commands::Comments { command } => comments(command, ticket_store).await,
    }
}

async fn intervals<I: IntervalStore>(
    command: IntervalsCommand,
    store: Arc<I>,
) -> anyhow::Result<()> {
    let now = OffsetDateTime::now_utc();

    match command {
        IntervalsCommand::List { ticket_id, all } => {
            let mut workspace = IntervalWorkspace::new(store, ticket_id);
            workspace.reload().await?;

            let intervals = if all {
                workspace.intervals().to_vec()
            } else {
                workspace.visible_intervals(now)
            };
            for interval in &intervals {
                let end = match interval.end_time {
                    Some(end) => end.format(&Rfc3339)?,
                    None => "(running)".to_string(),
                };
                println!(
                    "{}  {}  {}  {}m",
                    interval.id,
                    interval.start_time.format(&Rfc3339)?,
                    end,
                    interval.duration(now).whole_minutes(),
                );
            }
            println!(
                "total: {}m across {} interval(s)",
                total_duration(&intervals, now).whole_minutes(),
                intervals.len(),
            );
        }
        IntervalsCommand::Merge {
            ticket_id,
            interval_ids,
        } => {
            let mut workspace = IntervalWorkspace::new(store, ticket_id);
            workspace.reload().await?;
            for id in &interval_ids {
                workspace.select(&id.as_str().into())?;
            }

            let merged = workspace.merge_selected().await?;
            println!(
                "merged {} intervals into {} ({}m)",
                interval_ids.len(),
                merged.id,
                merged.duration(now).whole_minutes(),
            );
        }
        IntervalsCommand::Delete {
            ticket_id,
            interval_ids,
        } => {
            let mut workspace = IntervalWorkspace::new(store, ticket_id);
            workspace.reload().await?;
            for id in &interval_ids {
                workspace.select(&id.as_str().into())?;
            }

            workspace.delete_selected().await?;
            println!("deleted {} interval(s)", interval_ids.len());
        }
    }

    Ok(())
}

async fn entry<I: IntervalStore, T: TimeEntryStore>(
    command: EntryCommand,
    interval_store: Arc<I>,
    entry_store: Arc<T>,
) -> anyhow::Result<()> {
    match command {
        EntryCommand::Create {
            ticket_id,
            user,
            notes,
        } => {
            let now = OffsetDateTime::now_utc();
            let mut workspace = IntervalWorkspace::new(interval_store.clone(), ticket_id);
            workspace.reload().await?;
            let intervals = workspace.intervals().to_vec();

            let mut draft = synthesize(&intervals, now)
                .context("no intervals to create an entry from")?;
            if let Some(notes) = notes {
                draft = draft.with_notes(notes);
            }

            let service = TimeEntryService::new(interval_store, entry_store);
            let saved = service
                .record_draft(&user.as_str().into(), &draft, &intervals)
                .await?;
            println!(
                "created entry {} on sheet {}: {}m, \"{}\"",
                saved.id,
                saved.time_sheet_id,
                saved.billable_minutes,
                saved.notes.as_deref().unwrap_or(""),
            );
        }
    }

    Ok(())
}

async fn comments<K: TicketStore>(command: CommentsCommand, store: Arc<K>) -> anyhow::Result<()> {
    match command {
        CommentsCommand::List { ticket_id } => {
            let mut editor = CommentEditor::new(store, ticket_id);
            editor.reload().await?;

            println!("{}", editor.subject());
            for comment in editor.comments() {
                println!(
                    "{}  {}  [{}]\n    {}",
                    comment.id,
                    comment.author_id,
                    comment.updated_at.format(&Rfc3339)?,
                    comment.note.text().replace('\n', "\n    "),
                );
            }
        }
        CommentsCommand::Add { ticket_id, text } => {
            let mut editor = CommentEditor::new(store, ticket_id);
            editor.reload().await?;
            editor.add_comment(RichText::from_plain_text(&text)).await?;
            println!("comment added ({} total)", editor.comments().len());
        }
        CommentsCommand::Edit {
            ticket_id,
            comment_id,
            text,
        } => {
            let mut editor = CommentEditor::new(store, ticket_id);
            editor.reload().await?;
            editor
                .save_edit(
                    &comment_id.as_str().into(),
                    RichText::from_plain_text(&text),
                    OffsetDateTime::now_utc(),
                )
                .await?;
            println!("comment {} updated", comment_id);
        }
        CommentsCommand::Delete {
            ticket_id,
            comment_id,
        } => {
            let mut editor = CommentEditor::new(store, ticket_id);
            editor.reload().await?;
            editor.delete_comment(&comment_id.as_str().into()).await?;
            println!("comment {} deleted", comment_id);
        }
    }

    Ok(())
}
