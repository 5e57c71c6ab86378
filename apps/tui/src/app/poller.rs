use async_trait::async_trait;
use std::time::Duration;

use crate::api::SentimentApi;
use crate::domain::{BatchPick, Session, Visualization, VisualizationType};

/// Delay primitive used between poll attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_attempts: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Found {
        visualization: Visualization,
        attempts: u32,
    },
    /// Every attempt came back empty or failed. Not an error.
    NotFound { attempts: u32 },
}

/// Asks for `kind` until the server has it or the attempts run out.
///
/// Always makes at least one attempt. Transport and server failures on an
/// attempt are logged and treated like an empty answer; the loop sleeps
/// `interval` between attempts either way.
pub async fn poll(
    api: &dyn SentimentApi,
    sleeper: &dyn Sleeper,
    round: &str,
    session: &Session,
    kind: VisualizationType,
    settings: PollSettings,
) -> PollOutcome {
    let max_attempts = settings.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match api.fetch_visualizations(round, session, kind).await {
            Ok(visualizations) => {
                if let Some(BatchPick { visualization, .. }) =
                    BatchPick::from_list(&visualizations, kind)
                {
                    tracing::info!(round, %session, %kind, attempt, "visualization ready");
                    return PollOutcome::Found {
                        visualization,
                        attempts: attempt,
                    };
                }
                tracing::debug!(round, %session, %kind, attempt, "visualization not ready");
            }
            Err(error) if error.is_transport() => {
                tracing::warn!(round, %session, %kind, attempt, %error, "server unreachable while polling");
            }
            Err(error) => {
                tracing::warn!(round, %session, %kind, attempt, %error, "poll attempt failed");
            }
        }

        if attempt < max_attempts {
            sleeper.sleep(settings.interval).await;
        }
    }

    tracing::info!(round, %session, %kind, attempts = max_attempts, "gave up polling");
    PollOutcome::NotFound {
        attempts: max_attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{RecordingSleeper, ScriptedApi, VizReply};

    fn session() -> Session {
        Session::new("Race")
    }

    #[tokio::test]
    async fn always_empty_exhausts_exactly_max_attempts() {
        let api = ScriptedApi::new();
        let sleeper = RecordingSleeper::default();
        let settings = PollSettings {
            interval: Duration::ZERO,
            max_attempts: 3,
        };

        let outcome = poll(&api, &sleeper, "5", &session(), VisualizationType::Timeline, settings).await;

        assert_eq!(outcome, PollOutcome::NotFound { attempts: 3 });
        assert_eq!(api.visualization_calls().len(), 3);
        assert_eq!(sleeper.sleeps(), vec![Duration::ZERO; 2]);
    }

    #[tokio::test]
    async fn stops_on_first_non_empty_answer() {
        let api = ScriptedApi::new().with_visualization_replies(vec![
            VizReply::Empty,
            VizReply::Found(vec![Visualization::new(VisualizationType::Wordcloud, "wc")]),
            VizReply::Found(vec![Visualization::new(VisualizationType::Wordcloud, "later")]),
        ]);
        let sleeper = RecordingSleeper::default();

        let outcome = poll(
            &api,
            &sleeper,
            "5",
            &session(),
            VisualizationType::Wordcloud,
            PollSettings::default(),
        )
        .await;

        assert_eq!(
            outcome,
            PollOutcome::Found {
                visualization: Visualization::new(VisualizationType::Wordcloud, "wc"),
                attempts: 2,
            }
        );
        assert_eq!(sleeper.sleeps(), vec![Duration::from_millis(2000)]);
    }

    #[tokio::test]
    async fn transport_failures_do_not_abort_the_loop() {
        let api = ScriptedApi::new().with_visualization_replies(vec![
            VizReply::Unreachable,
            VizReply::ServerError(502),
            VizReply::Found(vec![Visualization::new(VisualizationType::Timeline, "tl")]),
        ]);
        let sleeper = RecordingSleeper::default();
        let settings = PollSettings {
            interval: Duration::from_millis(10),
            max_attempts: 5,
        };

        let outcome = poll(&api, &sleeper, "5", &session(), VisualizationType::Timeline, settings).await;

        assert!(matches!(outcome, PollOutcome::Found { attempts: 3, .. }));
        assert_eq!(sleeper.sleeps().len(), 2);
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let api = ScriptedApi::new();
        let sleeper = RecordingSleeper::default();
        let settings = PollSettings {
            interval: Duration::ZERO,
            max_attempts: 0,
        };

        let outcome = poll(&api, &sleeper, "1", &session(), VisualizationType::Heatmap, settings).await;

        assert_eq!(outcome, PollOutcome::NotFound { attempts: 1 });
        assert_eq!(api.visualization_calls().len(), 1);
        assert!(sleeper.sleeps().is_empty());
    }
}
