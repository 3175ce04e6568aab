use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};

use crate::protocol::{SaveOutcome, SaveParams, SaveRequest};

/// Carries one save call to the server. Failures are folded into the
/// outcome; the agent never sees an error type.
#[async_trait]
pub trait DraftTransport: Send + Sync {
    async fn save(&self, request: SaveRequest) -> SaveOutcome;
}

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    bearer: Secret<String>,
}

impl HttpTransport {
    /// `base_url` is the server root, e.g. `http://localhost:8000`.
    pub fn new(base_url: &str, bearer: Secret<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, bearer)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, bearer: Secret<String>) -> Self {
        Self {
            client,
            endpoint: format!("{}/drafts/save", base_url.trim_end_matches('/')),
            bearer,
        }
    }
}

#[async_trait]
impl DraftTransport for HttpTransport {
    async fn save(&self, request: SaveRequest) -> SaveOutcome {
        let response = match self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.bearer.expose_secret())
            .form(&SaveParams::from(&request))
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(?error, "draft save request failed");
                return SaveOutcome::TransportError(error.to_string());
            }
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => SaveOutcome::from_response(status, &body),
            Err(error) => {
                tracing::warn!(?error, status, "could not read draft save response");
                SaveOutcome::TransportError(error.to_string())
            }
        }
    }
}
