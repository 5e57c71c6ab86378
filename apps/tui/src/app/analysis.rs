//! The analyze action: phase machine and the request/poll sequence behind it.

use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::{ApiError, RealtimeOutcome, SentimentApi};
use crate::app::notifier::NotificationKind;
use crate::app::poller::{poll, PollOutcome, PollSettings, Sleeper};
use crate::domain::{BatchPick, RealtimeBatch, RealtimeStats, Session, Visualization, VisualizationType};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AnalysisPhase {
    Idle,
    Validating,
    Submitting,
    Processing,
    ImmediateResult,
    Failed,
    Polling,
    Found,
    NotFound,
}

impl fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Validating => "Validating",
            Self::Submitting => "Submitting",
            Self::Processing => "Processing",
            Self::ImmediateResult => "ImmediateResult",
            Self::Failed => "Failed",
            Self::Polling => "Polling",
            Self::Found => "Found",
            Self::NotFound => "NotFound",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AnalysisEvent {
    Start,
    Validated,
    Rejected,
    ResultReady,
    StillProcessing,
    Failed,
    PollStarted,
    PollFound,
    PollExhausted,
    Unavailable,
    Reset,
}

impl fmt::Display for AnalysisEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid transition from {from} with event {event}")]
pub struct PhaseTransitionError {
    pub from: AnalysisPhase,
    pub event: AnalysisEvent,
}

/// Tracks where the current analyze action is.
#[derive(Debug)]
pub struct AnalysisMachine {
    phase: AnalysisPhase,
}

impl Default for AnalysisMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisMachine {
    pub const fn new() -> Self {
        Self {
            phase: AnalysisPhase::Idle,
        }
    }

    pub const fn phase(&self) -> AnalysisPhase {
        self.phase
    }

    pub fn process(&mut self, event: AnalysisEvent) -> Result<AnalysisPhase, PhaseTransitionError> {
        let next = Self::next_phase(self.phase, event)?;
        tracing::debug!(from = %self.phase, %event, to = %next, "analysis phase");
        self.phase = next;
        Ok(next)
    }

    /// Returns to idle from wherever the machine is.
    pub fn force_idle(&mut self) {
        self.phase = AnalysisPhase::Idle;
    }

    const fn next_phase(
        current: AnalysisPhase,
        event: AnalysisEvent,
    ) -> Result<AnalysisPhase, PhaseTransitionError> {
        use AnalysisEvent as E;
        use AnalysisPhase as P;

        match (current, event) {
            (P::Idle, E::Start) => Ok(P::Validating),
            (P::Validating, E::Validated) => Ok(P::Submitting),
            (P::Validating, E::Rejected) => Ok(P::Idle),
            (P::Submitting, E::ResultReady) => Ok(P::ImmediateResult),
            (P::Submitting, E::StillProcessing) => Ok(P::Processing),
            (P::Submitting, E::Failed) => Ok(P::Failed),
            (P::Submitting, E::Unavailable) => Ok(P::NotFound),
            (P::Processing, E::PollStarted) => Ok(P::Polling),
            (P::Polling, E::PollFound) => Ok(P::Found),
            (P::Polling, E::PollExhausted) => Ok(P::NotFound),
            (P::ImmediateResult | P::Failed | P::Found | P::NotFound, E::Reset) => Ok(P::Idle),
            _ => Err(PhaseTransitionError {
                from: current,
                event,
            }),
        }
    }
}

/// Realtime runs a fresh scrape-and-analyze job; precomputed reads what the server already has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    #[default]
    Realtime,
    Precomputed,
}

impl AnalysisMode {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Realtime => Self::Precomputed,
            Self::Precomputed => Self::Realtime,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Realtime => "realtime",
            Self::Precomputed => "precomputed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub round: String,
    pub session: Session,
    pub kind: VisualizationType,
    pub mode: AnalysisMode,
}

/// A visualization chosen for display, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedVisualization {
    pub round: String,
    pub session: Session,
    pub visualization: Visualization,
    pub requested: VisualizationType,
    pub stats: Option<RealtimeStats>,
}

impl DisplayedVisualization {
    pub fn was_substituted(&self) -> bool {
        self.visualization.kind != self.requested
    }
}

/// Progress reported while an analysis runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisUpdate {
    Notice {
        kind: NotificationKind,
        message: String,
    },
    Phase(AnalysisEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    pub request: AnalysisRequest,
    pub batch: Option<RealtimeBatch>,
    pub displayed: Option<DisplayedVisualization>,
}

impl AnalysisReport {
    const fn empty(request: AnalysisRequest) -> Self {
        Self {
            request,
            batch: None,
            displayed: None,
        }
    }

    /// Report for a run that died before producing anything.
    pub const fn aborted(request: AnalysisRequest) -> Self {
        Self::empty(request)
    }
}

#[derive(Clone)]
pub struct AnalysisContext {
    pub api: Arc<dyn SentimentApi>,
    pub sleeper: Arc<dyn Sleeper>,
    pub poll: PollSettings,
}

struct Reporter<'a> {
    updates: &'a UnboundedSender<AnalysisUpdate>,
}

impl Reporter<'_> {
    fn send(&self, update: AnalysisUpdate) {
        if self.updates.send(update).is_err() {
            tracing::debug!("analysis update dropped, receiver closed");
        }
    }

    fn phase(&self, event: AnalysisEvent) {
        self.send(AnalysisUpdate::Phase(event));
    }

    fn notice(&self, kind: NotificationKind, message: impl Into<String>) {
        self.send(AnalysisUpdate::Notice {
            kind,
            message: message.into(),
        });
    }

    fn failed(&self, error: &ApiError) {
        tracing::error!(%error, "analysis failed");
        self.phase(AnalysisEvent::Failed);
        self.notice(NotificationKind::Error, error.user_message());
    }
}

/// Runs one analyze action. Never fails: every outcome, including server
/// errors, is reported through `updates` and summarised in the report.
pub async fn run_analysis(
    context: &AnalysisContext,
    request: AnalysisRequest,
    updates: &UnboundedSender<AnalysisUpdate>,
) -> AnalysisReport {
    let reporter = Reporter { updates };
    tracing::info!(
        round = %request.round,
        session = %request.session,
        kind = %request.kind,
        mode = request.mode.label(),
        "starting analysis"
    );

    match request.mode {
        AnalysisMode::Realtime => run_realtime(context, request, &reporter).await,
        AnalysisMode::Precomputed => run_precomputed(context, request, &reporter).await,
    }
}

async fn run_realtime(
    context: &AnalysisContext,
    request: AnalysisRequest,
    reporter: &Reporter<'_>,
) -> AnalysisReport {
    let outcome = context
        .api
        .trigger_realtime_analysis(&request.round, &request.session)
        .await;

    match outcome {
        Ok(RealtimeOutcome::Ready {
            batch,
            stats,
            message,
        }) => {
            reporter.phase(AnalysisEvent::ResultReady);
            let displayed = batch
                .pick(request.kind)
                .map(|pick| display_pick(&request, pick, stats, reporter));

            reporter.notice(NotificationKind::Success, success_message(&batch, stats, message));

            AnalysisReport {
                request,
                batch: Some(batch),
                displayed,
            }
        }
        Ok(RealtimeOutcome::Processing { warning }) => {
            reporter.phase(AnalysisEvent::StillProcessing);
            reporter.notice(
                NotificationKind::Info,
                format!("{warning}. Waiting for the {} visualization...", request.kind),
            );

            reporter.phase(AnalysisEvent::PollStarted);
            let polled = poll(
                context.api.as_ref(),
                context.sleeper.as_ref(),
                &request.round,
                &request.session,
                request.kind,
                context.poll,
            )
            .await;

            match polled {
                PollOutcome::Found { visualization, .. } => {
                    reporter.phase(AnalysisEvent::PollFound);
                    reporter.notice(
                        NotificationKind::Success,
                        format!("{} visualization ready", visualization.kind.label()),
                    );
                    let displayed = DisplayedVisualization {
                        round: request.round.clone(),
                        session: request.session.clone(),
                        requested: request.kind,
                        visualization,
                        stats: None,
                    };
                    AnalysisReport {
                        request,
                        batch: None,
                        displayed: Some(displayed),
                    }
                }
                PollOutcome::NotFound { attempts } => {
                    reporter.phase(AnalysisEvent::PollExhausted);
                    reporter.notice(
                        NotificationKind::Info,
                        format!(
                            "Visualization still not ready after {attempts} checks. Please try again later."
                        ),
                    );
                    AnalysisReport::empty(request)
                }
            }
        }
        Err(error) => {
            reporter.failed(&error);
            AnalysisReport::empty(request)
        }
    }
}

async fn run_precomputed(
    context: &AnalysisContext,
    request: AnalysisRequest,
    reporter: &Reporter<'_>,
) -> AnalysisReport {
    let fetched = context
        .api
        .fetch_visualizations(&request.round, &request.session, request.kind)
        .await;

    match fetched {
        Ok(found) if found.is_empty() => {
            reporter.phase(AnalysisEvent::Unavailable);
            reporter.notice(
                NotificationKind::Info,
                format!(
                    "No {} visualization available yet for round {} {}",
                    request.kind.label(),
                    request.round,
                    request.session
                ),
            );
            AnalysisReport::empty(request)
        }
        Ok(found) => {
            reporter.phase(AnalysisEvent::ResultReady);
            let displayed = BatchPick::from_list(&found, request.kind)
                .map(|pick| display_pick(&request, pick, None, reporter));
            reporter.notice(NotificationKind::Success, "Visualization loaded");
            AnalysisReport {
                request,
                batch: None,
                displayed,
            }
        }
        Err(error) => {
            reporter.failed(&error);
            AnalysisReport::empty(request)
        }
    }
}

fn display_pick(
    request: &AnalysisRequest,
    pick: BatchPick,
    stats: Option<RealtimeStats>,
    reporter: &Reporter<'_>,
) -> DisplayedVisualization {
    if let Some(requested) = pick.substituted_for {
        reporter.notice(
            NotificationKind::Info,
            format!(
                "{requested} is not available; showing {} instead",
                pick.visualization.kind
            ),
        );
    }

    DisplayedVisualization {
        round: request.round.clone(),
        session: request.session.clone(),
        visualization: pick.visualization,
        requested: request.kind,
        stats,
    }
}

fn success_message(
    batch: &RealtimeBatch,
    stats: Option<RealtimeStats>,
    message: Option<String>,
) -> String {
    let base = message.unwrap_or_else(|| "Realtime analysis complete".to_string());
    match stats {
        Some(stats) => format!(
            "{base}: {} visualizations generated from up to {} posts",
            stats.visualizations_generated, stats.post_limit
        ),
        None => format!("{base}: {} visualizations", batch.len()),
    }
}
