use derive_more::derive::{Display, Error};
use infrastructure::HttpClientConfig;
use reqwest_middleware::ClientWithMiddleware;

use crate::{core::time::Duration, poller::StateSource};

use super::EntityState;

#[derive(Debug, Display, Error)]
pub enum FetchError {
    #[display("Error requesting states from hub")]
    Request { source: reqwest_middleware::Error },

    #[display("Hub responded with status {status}")]
    Status { status: reqwest::StatusCode },

    #[display("Error decoding states from hub")]
    Decode { source: reqwest::Error },
}

#[derive(Debug, Clone)]
pub struct HaHttpClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl HaHttpClient {
    pub fn new(url: &str, token: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = HttpClientConfig::new(Some(token.to_owned()))
            .with_timeout(timeout.into())
            .new_tracing_client()?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_owned(),
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_current_state(&self) -> Result<Vec<EntityState>, FetchError> {
        let response = self
            .client
            .get(format!("{}/api/states", self.base_url))
            .send()
            .await
            .map_err(|source| FetchError::Request { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        response
            .json::<Vec<EntityState>>()
            .await
            .map_err(|source| FetchError::Decode { source })
    }
}

impl StateSource for HaHttpClient {
    async fn fetch_states(&self) -> Result<Vec<EntityState>, FetchError> {
        self.get_current_state().await
    }
}
