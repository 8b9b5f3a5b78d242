use crate::error::ExtractError;
use log::debug;
use reqwest::Client;
use std::time::Duration;

/// Desktop Chrome identity; many recipe sites reject unknown clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Issues exactly one GET per call. No retries, no caching.
#[derive(Clone)]
pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    /// `timeout` of `None` leaves the request unbounded; deadlines are the caller's call.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, ExtractError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client })
    }

    /// Fetch the page body, turning a non-2xx status into an error.
    pub async fn fetch(&self, url: &str) -> Result<String, ExtractError> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let html = response.text().await?;
        debug!("Fetched {} bytes from {}", html.len(), url);
        Ok(html)
    }
}
