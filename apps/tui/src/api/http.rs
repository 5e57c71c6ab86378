use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use std::time::Duration;

use super::{wire, ApiError, HealthStatus, RealtimeOutcome, SentimentApi};
use crate::domain::{Round, Session, Visualization, VisualizationType};

/// `SentimentApi` over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: Url,
}

impl HttpApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::Url(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Url(format!("{base_url} cannot be used as a base")));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self { client, base_url })
    }

    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base URL.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_body(response: Response) -> Result<String, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                code: status.as_u16(),
                text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        Ok(response.text().await?)
    }

    async fn get(&self, url: Url) -> Result<String, ApiError> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        Self::read_body(response).await
    }
}

#[async_trait]
impl SentimentApi for HttpApiClient {
    async fn fetch_races(&self) -> Result<Vec<Round>, ApiError> {
        let body = self.get(self.endpoint(&["races"])?).await?;
        wire::parse_races(&body)
    }

    async fn fetch_sessions(&self, round: &str) -> Result<Vec<Session>, ApiError> {
        let body = self.get(self.endpoint(&["sessions", round])?).await?;
        wire::parse_sessions(&body)
    }

    async fn fetch_visualizations(
        &self,
        round: &str,
        session: &Session,
        kind: VisualizationType,
    ) -> Result<Vec<Visualization>, ApiError> {
        let mut url = self.endpoint(&["visualizations", round, session.as_str()])?;
        url.query_pairs_mut().append_pair("type", kind.as_str());
        let body = self.get(url).await?;
        wire::parse_visualizations(&body)
    }

    async fn trigger_realtime_analysis(
        &self,
        round: &str,
        session: &Session,
    ) -> Result<RealtimeOutcome, ApiError> {
        let url = self.endpoint(&["realtime-analysis", round, session.as_str()])?;
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        wire::parse_realtime(&body)
    }

    async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        let body = self.get(self.endpoint(&["health"])?).await?;
        wire::parse_health(&body)
    }
}
