mod comments;
mod intervals;
mod time_entries;

pub use comments::{pick_newer, step, CommentEditor, EditEvent, EditPhase};
pub use intervals::{filter_short, total_duration, IntervalWorkspace, MIN_INTERVAL_SECONDS};
pub use time_entries::{synthesize, TimeEntryService};
