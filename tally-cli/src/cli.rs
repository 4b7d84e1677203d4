use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tally")]
#[command(about = "Ticket time tracking against a PSA server")]
pub struct Cli {
    /// Run against seeded in-memory stores instead of a real server
    #[arg(long, global = true)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Inspect and edit the tracked intervals of a ticket
    Intervals {
        #[command(subcommand)]
        command: IntervalsCommand,
    },
    /// Turn tracked intervals into time entries
    Entry {
        #[command(subcommand)]
        command: EntryCommand,
    },
    /// Read and edit ticket comments
    Comments {
        #[command(subcommand)]
        command: CommentsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum IntervalsCommand {
    /// List the intervals tracked on a ticket
    List {
        ticket_id: String,
        /// Include intervals shorter than the noise threshold
        #[arg(long)]
        all: bool,
    },
    /// Merge two or more intervals into one spanning their union
    Merge {
        ticket_id: String,
        /// Ids of the intervals to merge
        #[arg(required = true, num_args = 2..)]
        interval_ids: Vec<String>,
    },
    /// Delete intervals from a ticket
    Delete {
        ticket_id: String,
        #[arg(required = true)]
        interval_ids: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum EntryCommand {
    /// Collapse a ticket's intervals into a time entry on the current sheet
    Create {
        ticket_id: String,
        /// User the time sheet belongs to
        #[arg(long)]
        user: String,
        /// Replace the generated notes
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum CommentsCommand {
    /// List the comments on a ticket
    List { ticket_id: String },
    /// Add a comment to a ticket
    Add {
        ticket_id: String,
        /// Comment text
        text: String,
    },
    /// Replace the text of an existing comment
    Edit {
        ticket_id: String,
        comment_id: String,
        text: String,
    },
    /// Delete a comment from a ticket
    Delete {
        ticket_id: String,
        comment_id: String,
    },
}
