mod interval_store;
mod ticket_store;
mod time_entry_store;

pub use interval_store::IntervalStore;
pub use ticket_store::TicketStore;
pub use time_entry_store::TimeEntryStore;
