use crate::api::ApiError;
use crate::app::analysis::{AnalysisReport, AnalysisRequest, AnalysisUpdate};
use crate::app::selection::RoundTag;
use crate::domain::{Round, Session};

/// Network work the UI asks the event loop to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadRaces,
    FetchSessions(RoundTag),
    Analyze(AnalysisRequest),
}

/// Results flowing back from spawned network work.
#[derive(Debug)]
pub enum AppEvent {
    RacesLoaded(Result<Vec<Round>, ApiError>),
    SessionsLoaded {
        tag: RoundTag,
        result: Result<Vec<Session>, ApiError>,
    },
    Analysis(AnalysisUpdate),
    AnalysisFinished(AnalysisReport),
}
