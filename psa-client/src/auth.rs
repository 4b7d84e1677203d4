use std::env;

use reqwest::header::{HeaderMap, HeaderValue};
use thiserror::Error;

/// Credentials for the PSA server.
///
/// The server scopes every request to a tenant, so both the API key and the
/// tenant id are required on each call.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub tenant: String,
}

#[derive(Error, Debug)]
pub enum IntoCredentialsError {
    #[error("Missing API key")]
    MissingApiKey,
    #[error("Missing tenant id")]
    MissingTenant,
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(String),
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, tenant: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            tenant: tenant.into(),
        }
    }

    /// Read credentials from `PSA_API_KEY` and `PSA_TENANT`.
    pub fn from_env() -> Result<Self, IntoCredentialsError> {
        let api_key = env::var("PSA_API_KEY").map_err(|_| IntoCredentialsError::MissingApiKey)?;
        let tenant = env::var("PSA_TENANT").map_err(|_| IntoCredentialsError::MissingTenant)?;
        Ok(Self::new(api_key, tenant))
    }

    pub fn as_headers(&self) -> Result<HeaderMap, IntoCredentialsError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| IntoCredentialsError::InvalidHeaderValue(e.to_string()))?,
        );
        headers.insert(
            "x-tenant-id",
            HeaderValue::from_str(&self.tenant)
                .map_err(|e| IntoCredentialsError::InvalidHeaderValue(e.to_string()))?,
        );
        Ok(headers)
    }
}
