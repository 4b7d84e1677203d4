mod interval;
mod ticket;
mod time_entry;
mod time_sheet;

pub use interval::*;
pub use ticket::*;
pub use time_entry::*;
pub use time_sheet::*;
