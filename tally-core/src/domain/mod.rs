mod error;
pub mod models;
pub mod ports;
mod rich_text;
pub mod services;

pub use error::{CommentError, StoreError, TimeTrackingError};
pub use rich_text::RichText;
