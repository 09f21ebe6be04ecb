use std::time::Duration;

use mediaq_core::error::AppError;
use mediaq_core::traits::Fetcher;
use reqwest::Client;
use url::Url;

/// HTTP fetcher using reqwest.
///
/// Downloads directory listings and video pages with a configurable
/// timeout. Only http/https links are fetched; anything else is rejected
/// before a request is made.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let timeout_secs = timeout.as_secs();
        let client = Client::builder()
            .user_agent("mediaq/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        validate_scheme(url)?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))
    }
}

/// Only allow `http` and `https` links to be fetched.
fn validate_scheme(url: &str) -> Result<(), AppError> {
    let parsed = Url::parse(url).map_err(|e| AppError::HttpError(format!("Invalid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(AppError::HttpError(format!(
            "URL scheme '{scheme}' is not allowed (only http/https)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_scheme_accepts_http() {
        assert!(validate_scheme("http://example.com/podcasts/").is_ok());
        assert!(validate_scheme("https://www.youtube.com/watch?v=x").is_ok());
    }

    #[test]
    fn test_validate_scheme_rejects_others() {
        let err = validate_scheme("file:///etc/passwd").unwrap_err();
        assert!(err.to_string().contains("not allowed"));
        assert!(validate_scheme("ftp://example.com/").is_err());
    }

    #[test]
    fn test_validate_scheme_rejects_garbage() {
        assert!(validate_scheme("not a url").is_err());
    }
}
