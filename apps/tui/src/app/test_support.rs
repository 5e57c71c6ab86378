//! Scripted collaborators for exercising the app without a server.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::api::{ApiError, HealthStatus, RealtimeOutcome, SentimentApi};
use crate::app::poller::Sleeper;
use crate::domain::{Round, Session, Visualization, VisualizationType};

/// A reqwest error of the same family a refused connection produces.
fn transport_error() -> ApiError {
    let error = reqwest::Client::new()
        .get("not a url")
        .build()
        .expect_err("an invalid URL never builds");
    ApiError::Transport(error)
}

fn status_error(code: u16) -> ApiError {
    ApiError::HttpStatus {
        code,
        text: "Bad Gateway".to_string(),
    }
}

#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Unreachable,
    ServerError(u16),
    Failure(String),
}

impl<T: Clone> Reply<T> {
    fn to_result(&self) -> Result<T, ApiError> {
        match self {
            Self::Ok(value) => Ok(value.clone()),
            Self::Unreachable => Err(transport_error()),
            Self::ServerError(code) => Err(status_error(*code)),
            Self::Failure(message) => Err(ApiError::Application(message.clone())),
        }
    }
}

#[derive(Debug, Clone)]
pub enum VizReply {
    Empty,
    Found(Vec<Visualization>),
    Unreachable,
    ServerError(u16),
    Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualizationCall {
    pub round: String,
    pub session: Session,
    pub kind: VisualizationType,
}

/// `SentimentApi` that answers from scripts and records what it was asked.
pub struct ScriptedApi {
    races: Reply<Vec<Round>>,
    sessions: HashMap<String, Reply<Vec<Session>>>,
    visualization_replies: Mutex<VecDeque<VizReply>>,
    realtime_replies: Mutex<VecDeque<Reply<RealtimeOutcome>>>,
    visualization_calls: Mutex<Vec<VisualizationCall>>,
    realtime_calls: Mutex<Vec<(String, Session)>>,
    session_calls: Mutex<Vec<String>>,
}

impl Default for ScriptedApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            races: Reply::Ok(vec![
                Round::new("1", "Bahrain Grand Prix"),
                Round::new("2", "Saudi Arabian Grand Prix"),
            ]),
            sessions: HashMap::new(),
            visualization_replies: Mutex::new(VecDeque::new()),
            realtime_replies: Mutex::new(VecDeque::new()),
            visualization_calls: Mutex::new(Vec::new()),
            realtime_calls: Mutex::new(Vec::new()),
            session_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_races(mut self, races: Reply<Vec<Round>>) -> Self {
        self.races = races;
        self
    }

    pub fn with_sessions(mut self, round: &str, sessions: Reply<Vec<Session>>) -> Self {
        self.sessions.insert(round.to_string(), sessions);
        self
    }

    pub fn with_visualization_replies(self, replies: Vec<VizReply>) -> Self {
        *self.visualization_replies.lock().unwrap() = replies.into();
        self
    }

    pub fn with_realtime_replies(self, replies: Vec<Reply<RealtimeOutcome>>) -> Self {
        *self.realtime_replies.lock().unwrap() = replies.into();
        self
    }

    pub fn visualization_calls(&self) -> Vec<VisualizationCall> {
        self.visualization_calls.lock().unwrap().clone()
    }

    pub fn realtime_calls(&self) -> Vec<(String, Session)> {
        self.realtime_calls.lock().unwrap().clone()
    }

    pub fn session_calls(&self) -> Vec<String> {
        self.session_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SentimentApi for ScriptedApi {
    async fn fetch_races(&self) -> Result<Vec<Round>, ApiError> {
        self.races.to_result()
    }

    async fn fetch_sessions(&self, round: &str) -> Result<Vec<Session>, ApiError> {
        self.session_calls.lock().unwrap().push(round.to_string());
        self.sessions.get(round).map_or_else(
            || Ok(vec![Session::new("FP1"), Session::new("Race")]),
            Reply::to_result,
        )
    }

    async fn fetch_visualizations(
        &self,
        round: &str,
        session: &Session,
        kind: VisualizationType,
    ) -> Result<Vec<Visualization>, ApiError> {
        self.visualization_calls
            .lock()
            .unwrap()
            .push(VisualizationCall {
                round: round.to_string(),
                session: session.clone(),
                kind,
            });

        let reply = self
            .visualization_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(VizReply::Empty);

        match reply {
            VizReply::Empty => Ok(Vec::new()),
            VizReply::Found(found) => Ok(found),
            VizReply::Unreachable => Err(transport_error()),
            VizReply::ServerError(code) => Err(status_error(code)),
            VizReply::Failure(message) => Err(ApiError::Application(message)),
        }
    }

    async fn trigger_realtime_analysis(
        &self,
        round: &str,
        session: &Session,
    ) -> Result<RealtimeOutcome, ApiError> {
        self.realtime_calls
            .lock()
            .unwrap()
            .push((round.to_string(), session.clone()));

        self.realtime_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Failure("no realtime reply scripted".to_string()))
            .to_result()
    }

    async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        Ok(HealthStatus {
            status: "healthy".to_string(),
            message: "api is running smoothly!".to_string(),
        })
    }
}

/// Returns immediately and remembers every requested delay.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Base64 of a minimal 2x1 PNG header, enough for dimension sniffing.
pub fn tiny_png_base64() -> String {
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&13_u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&2_u32.to_be_bytes());
    bytes.extend_from_slice(&1_u32.to_be_bytes());
    bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
    STANDARD.encode(bytes)
}
