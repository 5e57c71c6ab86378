//! Client for the race sentiment HTTP API.

mod error;
mod http;
pub mod wire;

pub use error::{ApiError, UNKNOWN_ERROR};
pub use http::HttpApiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{RealtimeBatch, RealtimeStats, Round, Session, Visualization, VisualizationType};

/// What a realtime analysis request came back with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeOutcome {
    /// The run finished inside the request.
    Ready {
        batch: RealtimeBatch,
        stats: Option<RealtimeStats>,
        message: Option<String>,
    },
    /// The server accepted the job but has nothing to show yet.
    Processing { warning: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

#[async_trait]
pub trait SentimentApi: Send + Sync {
    async fn fetch_races(&self) -> Result<Vec<Round>, ApiError>;

    async fn fetch_sessions(&self, round: &str) -> Result<Vec<Session>, ApiError>;

    /// `Ok` with an empty list means "not available yet", not a failure.
    async fn fetch_visualizations(
        &self,
        round: &str,
        session: &Session,
        kind: VisualizationType,
    ) -> Result<Vec<Visualization>, ApiError>;

    async fn trigger_realtime_analysis(
        &self,
        round: &str,
        session: &Session,
    ) -> Result<RealtimeOutcome, ApiError>;

    async fn health_check(&self) -> Result<HealthStatus, ApiError>;
}
