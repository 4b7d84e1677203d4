use std::env;

#[derive(Debug, Clone)]
pub struct PsaUrl(String);

impl AsRef<str> for PsaUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PsaUrl {
    pub fn new(base: impl Into<String>) -> Self {
        Self(base.into())
    }

    /// Creates a new PsaUrl from the environment variable `PSA_URL`.
    pub fn from_env() -> Self {
        Self(env::var("PSA_URL").expect("PSA_URL must be set in env"))
    }

    /// Append the given path to the URL.
    pub fn append_path(&self, path: &str) -> Self {
        let trimmed_url = self.0.trim_end_matches('/');
        let trimmed_path = path.trim_start_matches('/');
        Self(format!("{}/{}", trimmed_url, trimmed_path))
    }

    /// Append a query parameter, URL-encoding the value.
    pub fn with_param(&self, key: &str, value: &str) -> Self {
        let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
        if self.0.contains('?') {
            Self(format!("{}&{}={}", self.0, key, encoded))
        } else {
            Self(format!("{}?{}={}", self.0, key, encoded))
        }
    }
}
