//! Shared HTTP client configuration.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::FetchError;

/// Default timeout for HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the optional API token.
pub const API_TOKEN_HEADER: &str = "X-Api-Token";

const USER_AGENT: &str = concat!("vigil/", env!("CARGO_PKG_VERSION"));

/// Builder for the `reqwest::Client` used by the remote services.
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    timeout: Duration,
    api_token: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClientBuilder {
    /// Creates a builder with default values.
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            api_token: None,
        }
    }

    /// Set timeout for HTTP requests.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the API token sent with every request.
    pub fn api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.is_empty());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<reqwest::Client, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.api_token {
            let value = HeaderValue::from_str(token)
                .map_err(|e| FetchError::ClientBuildError(format!("Invalid API token: {e}")))?;
            headers.insert(API_TOKEN_HEADER, value);
        }

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::ClientBuildError(e.to_string()))
    }
}

/// POSTs a JSON body and decodes a JSON response.
///
/// Non-2xx statuses are reported as [`FetchError::HttpError`]; bodies that do
/// not decode as `R` as [`FetchError::InvalidResponse`].
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    url: &str,
    body: &B,
) -> Result<R, FetchError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client.post(url).json(body).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpError(status));
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Joins a base URL and a path without doubling the separator.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_default_values() {
        let builder = HttpClientBuilder::new();

        assert_eq!(builder.timeout, Duration::from_secs(10));
        assert!(builder.api_token.is_none());
    }

    #[test]
    fn empty_token_is_dropped() {
        let builder = HttpClientBuilder::new().api_token(Some(String::new()));
        assert!(builder.api_token.is_none());
    }

    #[test]
    fn token_with_newline_fails_to_build() {
        let result = HttpClientBuilder::new()
            .api_token(Some("bad\ntoken".to_string()))
            .build();

        assert!(matches!(result, Err(FetchError::ClientBuildError(_))));
    }

    #[test]
    fn join_url_handles_slashes() {
        assert_eq!(join_url("http://a/", "/b"), "http://a/b");
        assert_eq!(join_url("http://a", "b"), "http://a/b");
    }
}
