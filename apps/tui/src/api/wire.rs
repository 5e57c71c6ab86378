//! JSON envelopes served by the sentiment API and their conversion into domain types.

use indexmap::IndexMap;
use serde::Deserialize;

use super::{ApiError, HealthStatus, RealtimeOutcome};
use crate::domain::{RealtimeBatch, RealtimeStats, Round, Session, Visualization, VisualizationType};

pub const PROCESSING_FALLBACK: &str = "Analysis is still processing";

#[derive(Debug, Deserialize)]
struct RacesEnvelope {
    #[serde(default)]
    success: bool,
    races: Option<Vec<Round>>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionsEnvelope {
    #[serde(default)]
    success: bool,
    sessions: Option<Vec<Session>>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VisualizationsEnvelope {
    #[serde(default)]
    success: bool,
    visualizations: Option<Vec<WireVisualization>>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RealtimeEnvelope {
    #[serde(default)]
    success: bool,
    visualizations: Option<IndexMap<String, WireVisualization>>,
    warning: Option<String>,
    message: Option<String>,
    stats: Option<RealtimeStats>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireVisualization {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    data: String,
}

fn to_visualization(tag: &str, data: String) -> Option<Visualization> {
    match VisualizationType::parse(tag) {
        Some(kind) => Some(Visualization::new(kind, data)),
        None => {
            tracing::warn!(tag, "skipping visualization of unknown type");
            None
        }
    }
}

pub fn parse_races(body: &str) -> Result<Vec<Round>, ApiError> {
    let envelope: RacesEnvelope = serde_json::from_str(body)?;
    match (envelope.success, envelope.races) {
        (true, Some(races)) => Ok(races),
        (_, _) => Err(ApiError::application(envelope.error)),
    }
}

pub fn parse_sessions(body: &str) -> Result<Vec<Session>, ApiError> {
    let envelope: SessionsEnvelope = serde_json::from_str(body)?;
    match (envelope.success, envelope.sessions) {
        (true, Some(sessions)) => Ok(sessions),
        (_, _) => Err(ApiError::application(envelope.error)),
    }
}

/// An empty `Ok` means the server has nothing for this type yet.
pub fn parse_visualizations(body: &str) -> Result<Vec<Visualization>, ApiError> {
    let envelope: VisualizationsEnvelope = serde_json::from_str(body)?;
    if !envelope.success {
        return Err(ApiError::application(envelope.error));
    }

    Ok(envelope
        .visualizations
        .unwrap_or_default()
        .into_iter()
        .filter_map(|wire| {
            let tag = wire.kind.unwrap_or_default();
            to_visualization(&tag, wire.data)
        })
        .collect())
}

pub fn parse_realtime(body: &str) -> Result<RealtimeOutcome, ApiError> {
    let envelope: RealtimeEnvelope = serde_json::from_str(body)?;
    if !envelope.success {
        return Err(ApiError::application(envelope.error));
    }

    let batch: RealtimeBatch = envelope
        .visualizations
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, wire)| {
            let tag = if VisualizationType::parse(&key).is_some() {
                key
            } else {
                wire.kind.unwrap_or(key)
            };
            to_visualization(&tag, wire.data)
        })
        .collect();

    if batch.is_empty() {
        let warning = envelope
            .warning
            .or(envelope.message)
            .unwrap_or_else(|| PROCESSING_FALLBACK.to_string());
        return Ok(RealtimeOutcome::Processing { warning });
    }

    Ok(RealtimeOutcome::Ready {
        batch,
        stats: envelope.stats,
        message: envelope.message,
    })
}

pub fn parse_health(body: &str) -> Result<HealthStatus, ApiError> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn races_require_success_and_payload() -> Result<(), Box<dyn std::error::Error>> {
        let races = parse_races(
            r#"{"success": true, "races": [{"round": "1", "name": "Bahrain"}, {"round": 2, "name": "Saudi Arabia"}]}"#,
        )?;
        assert_eq!(races.len(), 2);
        assert_eq!(races[1].id, "2");

        let missing = parse_races(r#"{"success": true}"#).unwrap_err();
        assert_eq!(missing.user_message(), "Unknown error");

        let failed = parse_races(r#"{"success": false, "error": "database locked"}"#).unwrap_err();
        assert_eq!(failed.user_message(), "database locked");
        Ok(())
    }

    #[test]
    fn sessions_parse_plain_strings() -> Result<(), Box<dyn std::error::Error>> {
        let sessions = parse_sessions(r#"{"success": true, "sessions": ["FP1", "Sprint Qualifying"]}"#)?;
        assert_eq!(sessions, vec![Session::new("FP1"), Session::new("Sprint Qualifying")]);
        Ok(())
    }

    #[test]
    fn empty_visualization_list_is_not_an_error() -> Result<(), Box<dyn std::error::Error>> {
        assert!(parse_visualizations(r#"{"success": true, "visualizations": []}"#)?.is_empty());
        assert!(parse_visualizations(r#"{"success": true}"#)?.is_empty());

        let found = parse_visualizations(
            r#"{"success": true, "visualizations": [{"type": "wordcloud", "data": "abc"}, {"type": "sparkline", "data": "zzz"}]}"#,
        )?;
        assert_eq!(found, vec![Visualization::new(VisualizationType::Wordcloud, "abc")]);
        Ok(())
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let error = parse_visualizations("<html>502</html>").unwrap_err();
        assert!(matches!(error, ApiError::Decode(_)));
    }

    #[test]
    fn realtime_ready_keeps_server_order() -> Result<(), Box<dyn std::error::Error>> {
        let outcome = parse_realtime(
            r#"{
                "success": true,
                "visualizations": {
                    "wordcloud": {"type": "wordcloud", "data": "v2"},
                    "timeline": {"type": "timeline", "data": "v1"}
                },
                "stats": {"post_limit": 50, "comment_limit": 10, "visualizations_generated": 2}
            }"#,
        )?;

        let RealtimeOutcome::Ready { batch, stats, .. } = outcome else {
            panic!("expected a ready batch");
        };
        let kinds: Vec<_> = batch.kinds().collect();
        assert_eq!(kinds, vec![VisualizationType::Wordcloud, VisualizationType::Timeline]);
        assert_eq!(stats.map(|s| s.visualizations_generated), Some(2));
        Ok(())
    }

    #[test]
    fn realtime_without_visualizations_is_processing() -> Result<(), Box<dyn std::error::Error>> {
        let outcome = parse_realtime(r#"{"success": true, "warning": "still processing"}"#)?;
        assert_eq!(
            outcome,
            RealtimeOutcome::Processing {
                warning: "still processing".to_string()
            }
        );

        let outcome = parse_realtime(r#"{"success": true, "visualizations": {}}"#)?;
        assert_eq!(
            outcome,
            RealtimeOutcome::Processing {
                warning: PROCESSING_FALLBACK.to_string()
            }
        );
        Ok(())
    }

    #[test]
    fn realtime_failure_carries_server_message() {
        let error = parse_realtime(r#"{"success": false, "error": "scraper timed out"}"#).unwrap_err();
        assert!(matches!(&error, ApiError::Application(message) if message == "scraper timed out"));
    }
}
