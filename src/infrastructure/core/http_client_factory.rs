use anyhow::{Context, Result};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = concat!("trendcast/", env!("CARGO_PKG_VERSION"));

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// HTTP client retrying transient failures with exponential backoff
    pub fn create_client(user_agent: &str, max_retries: u32) -> Result<ClientWithMiddleware> {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

        let client = Client::builder()
            .user_agent(user_agent)
            .pool_max_idle_per_host(5)
            .timeout(Duration::from_secs(20))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build())
    }
}

/// `base` joined with `path`, with `params` appended as an encoded query string.
///
/// The middleware request builder has no `.query()`, so the URL is built up front.
pub fn build_url(base: &str, path: &str, params: &[(&str, &str)]) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse_with_params(&joined, params).with_context(|| format!("Invalid URL: {}", joined))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_encodes_params() {
        let url = build_url(
            "https://query1.finance.yahoo.com/",
            "/v8/finance/chart/BRK-B",
            &[("range", "2y"), ("interval", "1d"), ("q", "a b")],
        )
        .unwrap();

        assert_eq!(url.path(), "/v8/finance/chart/BRK-B");
        assert_eq!(url.query(), Some("range=2y&interval=1d&q=a+b"));
    }

    #[test]
    fn test_build_url_rejects_garbage() {
        assert!(build_url("not a url", "x", &[]).is_err());
    }

    #[test]
    fn test_client_builds() {
        assert!(HttpClientFactory::create_client(DEFAULT_USER_AGENT, 2).is_ok());
    }
}
