mod comment;
mod ids;
mod interval;
mod time_sheet;

pub use comment::*;
pub use ids::*;
pub use interval::*;
pub use time_sheet::*;
