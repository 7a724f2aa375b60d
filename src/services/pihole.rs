use reqwest::Client;

use crate::modules::pihole::StatusSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum PiHoleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned status: {0}")]
    Status(reqwest::StatusCode),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Pi-hole API client
/// Issues one GET per call; timeouts are left to reqwest's defaults
#[derive(Clone)]
pub struct PiHoleClient {
    client: Client,
    url: String,
}

impl PiHoleClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Fetch the current summary counters
    pub async fn fetch_summary(&self) -> Result<StatusSnapshot, PiHoleError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(PiHoleError::Status(response.status()));
        }

        let body = response.bytes().await?;
        let snapshot = serde_json::from_slice(&body)?;

        Ok(snapshot)
    }
}
