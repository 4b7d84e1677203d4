mod auth;
mod client;
pub mod domain;
mod psa_url;

pub use auth::Credentials;
pub use client::{PsaClient, PsaFetchError};
pub use psa_url::PsaUrl;
