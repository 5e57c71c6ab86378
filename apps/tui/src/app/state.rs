use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::api::{ApiError, SentimentApi};
use crate::app::analysis::{
    run_analysis, AnalysisContext, AnalysisEvent, AnalysisMachine, AnalysisMode, AnalysisPhase,
    AnalysisReport, AnalysisRequest, AnalysisUpdate, DisplayedVisualization,
};
use crate::app::events::AppEvent;
use crate::app::notifier::Notifier;
use crate::app::poller::{PollSettings, Sleeper, TokioSleeper};
use crate::app::selection::{RoundTag, SelectionState};
use crate::app::trigger::TriggerControl;
use crate::app::wizard::{Wizard, WizardStep};
use crate::config::AppConfig;
use crate::domain::{Round, Session, VisualizationType};
use crate::export::{export_png, inspect, ImageInfo};

pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub animation_counter: f64,
    pub last_frame: Instant,
    pub config: AppConfig,
    pub selection: SelectionState,
    pub wizard: Wizard,
    pub notifier: Notifier,
    pub trigger: TriggerControl,
    pub analysis: AnalysisMachine,
    pub mode: AnalysisMode,
    pub rounds: Vec<Round>,
    pub sessions: Vec<Session>,
    pub displayed: Option<DisplayedVisualization>,
    pub image_info: Option<ImageInfo>,
    pub focus: WizardStep,
    pub round_cursor: usize,
    pub session_cursor: usize,
    pub viz_cursor: usize,
    pub round_filter: String,
    pub filtering: bool,
    pub loading_races: bool,
    pub loading_sessions: bool,
    pub last_export: Option<PathBuf>,
    context: AnalysisContext,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("step", &self.wizard.step())
            .field("round", &self.selection.current_round())
            .field("session", &self.selection.selected_session())
            .field("phase", &self.analysis.phase())
            .finish_non_exhaustive()
    }
}

impl App {
    pub fn new(config: AppConfig, api: Arc<dyn SentimentApi>) -> Self {
        Self::with_sleeper(config, api, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(
        config: AppConfig,
        api: Arc<dyn SentimentApi>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let context = AnalysisContext {
            api,
            sleeper,
            poll: PollSettings {
                interval: config.poll_interval,
                max_attempts: config.poll_attempts,
            },
        };

        Self {
            running: true,
            show_help: false,
            animation_counter: 0.0,
            last_frame: Instant::now(),
            config,
            selection: SelectionState::new(),
            wizard: Wizard::new(),
            notifier: Notifier::new(),
            trigger: TriggerControl::default(),
            analysis: AnalysisMachine::new(),
            mode: AnalysisMode::default(),
            rounds: Vec::new(),
            sessions: Vec::new(),
            displayed: None,
            image_info: None,
            focus: WizardStep::RoundSelect,
            round_cursor: 0,
            session_cursor: 0,
            viz_cursor: 0,
            round_filter: String::new(),
            filtering: false,
            loading_races: false,
            loading_sessions: false,
            last_export: None,
            context,
        }
    }

    pub fn api(&self) -> Arc<dyn SentimentApi> {
        Arc::clone(&self.context.api)
    }

    pub fn analysis_context(&self) -> AnalysisContext {
        self.context.clone()
    }

    /// Advances the animation clock and expires old notifications.
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;

        self.animation_counter += delta.as_secs_f64() * 2.0;
        if self.animation_counter > 2.0 * std::f64::consts::PI {
            self.animation_counter -= 2.0 * std::f64::consts::PI;
        }

        self.notifier.prune(now);
    }

    pub fn is_loading(&self) -> bool {
        self.loading_races || self.loading_sessions || self.trigger.is_in_flight()
    }

    // ---- races ----

    pub fn begin_load_races(&mut self) {
        self.loading_races = true;
    }

    pub fn finish_load_races(&mut self, result: Result<Vec<Round>, ApiError>) {
        self.loading_races = false;
        match result {
            Ok(rounds) => {
                tracing::info!(count = rounds.len(), "races loaded");
                if rounds.is_empty() {
                    self.notifier.info("No races available yet");
                }
                self.rounds = rounds;
                self.round_cursor = 0;
            }
            Err(error) => {
                tracing::error!(%error, "failed to load races");
                self.notifier
                    .error(format!("Failed to load races: {}", error.user_message()));
            }
        }
    }

    pub async fn load_races(&mut self) {
        self.begin_load_races();
        let result = self.context.api.fetch_races().await;
        self.finish_load_races(result);
    }

    /// Rounds matching the filter, best match first. All rounds when the filter is empty.
    pub fn filtered_rounds(&self) -> Vec<&Round> {
        let pattern = self.round_filter.trim();
        if pattern.is_empty() {
            return self.rounds.iter().collect();
        }

        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &Round)> = self
            .rounds
            .iter()
            .filter_map(|round| {
                matcher
                    .fuzzy_match(&round.label(), pattern)
                    .map(|score| (score, round))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, round)| round).collect()
    }

    // ---- sessions ----

    /// Stores the new round, clearing the session and cached batch first.
    /// Returns the tag the session fetch must carry.
    pub fn select_round(&mut self, round: Option<String>) -> Option<RoundTag> {
        let tag = self.selection.set_round(round);
        self.sessions.clear();
        self.session_cursor = 0;
        self.clear_display();
        self.wizard.on_round_selected(tag.is_some());
        self.trigger.refresh(self.mode, &self.selection);
        self.loading_sessions = tag.is_some();

        if let Some(tag) = &tag {
            tracing::info!(round = %tag.round, generation = tag.generation, "round selected");
        }
        tag
    }

    pub fn finish_load_sessions(&mut self, tag: &RoundTag, result: Result<Vec<Session>, ApiError>) {
        if !self.selection.accepts_sessions(tag) {
            tracing::debug!(round = %tag.round, generation = tag.generation, "discarding stale sessions");
            return;
        }

        self.loading_sessions = false;
        match result {
            Ok(sessions) => {
                if sessions.is_empty() {
                    self.notifier
                        .info(format!("No sessions available for round {}", tag.round));
                }
                self.sessions = sessions;
                self.session_cursor = 0;
                self.focus = WizardStep::SessionSelect;
            }
            Err(error) => {
                tracing::error!(round = %tag.round, %error, "failed to load sessions");
                self.notifier
                    .error(format!("Failed to load sessions: {}", error.user_message()));
            }
        }
    }

    pub async fn choose_round(&mut self, round: Option<String>) {
        if let Some(tag) = self.select_round(round) {
            let result = self.context.api.fetch_sessions(&tag.round).await;
            self.finish_load_sessions(&tag, result);
        }
    }

    pub fn select_session(&mut self, session: Option<Session>) {
        let has_session = session.is_some();
        self.selection.set_session(session);
        self.clear_display();
        self.wizard.on_session_selected(has_session);
        self.trigger.refresh(self.mode, &self.selection);
        if has_session {
            self.focus = WizardStep::VisualizationSelect;
        }
    }

    /// Picks the chart type. A cached realtime result of that type is shown right away.
    pub fn select_visualization_type(&mut self, kind: VisualizationType) {
        self.selection.set_visualization_type(kind);
        self.viz_cursor = kind.index();
        self.trigger.refresh(self.mode, &self.selection);

        let cached = self.selection.last_realtime_batch().and_then(|batch| batch.get(kind)).cloned();
        let target = self.selection.analysis_target();
        if let (Some(visualization), Some((round, session))) = (cached, target) {
            self.show(DisplayedVisualization {
                round,
                session,
                visualization,
                requested: kind,
                stats: None,
            });
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.trigger.refresh(self.mode, &self.selection);
        self.notifier
            .info(format!("Switched to {} mode", self.mode.label()));
    }

    // ---- analysis ----

    /// Validates the selection and disables the trigger. `None` means nothing
    /// should run: either an action is in flight or the selection is incomplete.
    pub fn begin_analysis(&mut self) -> Option<AnalysisRequest> {
        if self.trigger.is_in_flight() {
            tracing::debug!("analyze ignored, an action is already running");
            return None;
        }

        self.advance(AnalysisEvent::Start);
        let Some((round, session)) = self.selection.analysis_target() else {
            self.advance(AnalysisEvent::Rejected);
            self.notifier.error("Please select a round and a session first");
            return None;
        };

        self.trigger.begin();
        self.selection.clear_realtime_cache();
        self.advance(AnalysisEvent::Validated);

        Some(AnalysisRequest {
            round,
            session,
            kind: self.selection.visualization_type(),
            mode: self.mode,
        })
    }

    pub fn apply_analysis_update(&mut self, update: AnalysisUpdate) {
        match update {
            AnalysisUpdate::Notice { kind, message } => {
                self.notifier.notify(message, kind);
            }
            AnalysisUpdate::Phase(event) => self.advance(event),
        }
    }

    /// Stores the outcome and always re-enables the trigger.
    /// Results for a round or session the user has since left are dropped.
    pub fn finish_analysis(&mut self, report: AnalysisReport) {
        let target = (report.request.round.clone(), report.request.session.clone());
        if self.selection.analysis_target().as_ref() == Some(&target) {
            if let Some(batch) = report.batch {
                self.selection.cache_realtime_batch(batch);
            }
            if let Some(displayed) = report.displayed {
                self.show(displayed);
            }
        } else {
            tracing::debug!(
                round = %report.request.round,
                session = %report.request.session,
                "discarding analysis result for a superseded selection"
            );
        }

        if self.analysis.phase() != AnalysisPhase::Idle
            && self.analysis.process(AnalysisEvent::Reset).is_err()
        {
            self.analysis.force_idle();
        }
        self.trigger.finish(self.mode, &self.selection);
    }

    /// Runs the whole analyze action in place.
    pub async fn analyze(&mut self) {
        let Some(request) = self.begin_analysis() else {
            return;
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let context = self.analysis_context();
        let report = run_analysis(&context, request, &tx).await;
        drop(tx);

        while let Some(update) = rx.recv().await {
            self.apply_analysis_update(update);
        }
        self.finish_analysis(report);
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::RacesLoaded(result) => self.finish_load_races(result),
            AppEvent::SessionsLoaded { tag, result } => self.finish_load_sessions(&tag, result),
            AppEvent::Analysis(update) => self.apply_analysis_update(update),
            AppEvent::AnalysisFinished(report) => self.finish_analysis(report),
        }
    }

    fn advance(&mut self, event: AnalysisEvent) {
        if let Err(error) = self.analysis.process(event) {
            tracing::warn!(%error, "ignored analysis transition");
        }
    }

    // ---- display ----

    fn show(&mut self, displayed: DisplayedVisualization) {
        self.image_info = match inspect(&displayed.visualization) {
            Ok(info) => Some(info),
            Err(error) => {
                tracing::warn!(%error, kind = %displayed.visualization.kind, "could not read image header");
                None
            }
        };
        self.displayed = Some(displayed);
        self.last_export = None;
        self.wizard.on_analysis_succeeded();
        self.focus = WizardStep::Results;
    }

    fn clear_display(&mut self) {
        self.displayed = None;
        self.image_info = None;
        self.last_export = None;
        if self.focus == WizardStep::Results {
            self.focus = self.wizard.step();
        }
    }

    pub fn export_displayed(&mut self) -> Option<PathBuf> {
        let Some(displayed) = &self.displayed else {
            self.notifier.info("Nothing to export yet");
            return None;
        };

        match export_png(
            &self.config.export_dir,
            &displayed.round,
            &displayed.session,
            &displayed.visualization,
        ) {
            Ok(path) => {
                self.notifier.success(format!("Saved {}", path.display()));
                self.last_export = Some(path.clone());
                Some(path)
            }
            Err(error) => {
                tracing::error!(%error, "export failed");
                self.notifier.error(format!("Export failed: {error}"));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RealtimeOutcome;
    use crate::app::notifier::NotificationKind;
    use crate::app::test_support::{
        tiny_png_base64, RecordingSleeper, Reply, ScriptedApi, VizReply,
    };
    use crate::domain::{RealtimeBatch, RealtimeStats, Visualization};
    use std::time::Duration;

    fn test_config() -> AppConfig {
        AppConfig {
            poll_interval: Duration::ZERO,
            poll_attempts: 3,
            ..AppConfig::default()
        }
    }

    fn app_with(api: ScriptedApi) -> (App, Arc<ScriptedApi>) {
        let api = Arc::new(api);
        let app = App::with_sleeper(
            test_config(),
            api.clone(),
            Arc::new(RecordingSleeper::default()),
        );
        (app, api)
    }

    async fn ready_app(api: ScriptedApi, kind: VisualizationType) -> (App, Arc<ScriptedApi>) {
        let (mut app, api) = app_with(api);
        app.load_races().await;
        app.choose_round(Some("1".to_string())).await;
        app.select_session(Some(Session::new("Race")));
        app.select_visualization_type(kind);
        (app, api)
    }

    fn timeline_and_wordcloud() -> RealtimeOutcome {
        let batch: RealtimeBatch = [
            Visualization::new(VisualizationType::Timeline, tiny_png_base64()),
            Visualization::new(VisualizationType::Wordcloud, "V2"),
        ]
        .into_iter()
        .collect();
        RealtimeOutcome::Ready {
            batch,
            stats: Some(RealtimeStats {
                post_limit: 50,
                comment_limit: None,
                visualizations_generated: 2,
            }),
            message: None,
        }
    }

    fn messages(app: &App, kind: NotificationKind) -> Vec<String> {
        app.notifier
            .active()
            .iter()
            .filter(|n| n.kind == kind)
            .map(|n| n.message.clone())
            .collect()
    }

    #[tokio::test]
    async fn selecting_a_round_clears_state_before_fetching_sessions() {
        let (mut app, _api) = ready_app(
            ScriptedApi::new().with_realtime_replies(vec![Reply::Ok(timeline_and_wordcloud())]),
            VisualizationType::Timeline,
        )
        .await;
        app.analyze().await;
        assert!(app.selection.last_realtime_batch().is_some());

        let tag = app.select_round(Some("2".to_string())).unwrap();

        // Checked between selection and the session response.
        assert!(app.selection.selected_session().is_none());
        assert!(app.selection.last_realtime_batch().is_none());
        assert!(app.sessions.is_empty());
        assert!(app.displayed.is_none());
        assert_eq!(app.wizard.step(), WizardStep::SessionSelect);
        assert!(app.loading_sessions);

        app.finish_load_sessions(&tag, Ok(vec![Session::new("FP1")]));
        assert_eq!(app.sessions, vec![Session::new("FP1")]);
        assert!(!app.loading_sessions);
    }

    #[tokio::test]
    async fn stale_session_responses_are_discarded() {
        let (mut app, _api) = app_with(ScriptedApi::new());
        let stale = app.select_round(Some("1".to_string())).unwrap();
        let current = app.select_round(Some("2".to_string())).unwrap();

        app.finish_load_sessions(&stale, Ok(vec![Session::new("Stale")]));
        assert!(app.sessions.is_empty());
        assert!(app.loading_sessions);

        app.finish_load_sessions(&current, Ok(vec![Session::new("Race")]));
        assert_eq!(app.sessions, vec![Session::new("Race")]);
    }

    #[tokio::test]
    async fn session_fetch_failure_is_reported_once() {
        let (mut app, api) = app_with(
            ScriptedApi::new().with_sessions("9", Reply::Failure("Round 9 not found".to_string())),
        );
        app.choose_round(Some("9".to_string())).await;

        assert_eq!(api.session_calls(), vec!["9".to_string()]);
        assert_eq!(
            messages(&app, NotificationKind::Error),
            vec!["Failed to load sessions: Round 9 not found".to_string()]
        );
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn races_transport_failure_says_cannot_connect() {
        let (mut app, _api) = app_with(ScriptedApi::new().with_races(Reply::Unreachable));
        app.load_races().await;
        assert_eq!(
            messages(&app, NotificationKind::Error),
            vec!["Failed to load races: Cannot connect to server".to_string()]
        );
    }

    #[tokio::test]
    async fn realtime_result_shows_requested_type_without_substitution() {
        let (mut app, api) = ready_app(
            ScriptedApi::new().with_realtime_replies(vec![Reply::Ok(timeline_and_wordcloud())]),
            VisualizationType::Wordcloud,
        )
        .await;

        app.analyze().await;

        let displayed = app.displayed.as_ref().unwrap();
        assert_eq!(displayed.visualization.data, "V2");
        assert!(!displayed.was_substituted());
        assert!(app
            .notifier
            .active()
            .iter()
            .all(|n| !n.message.contains("not available")));
        assert_eq!(
            messages(&app, NotificationKind::Success),
            vec!["Realtime analysis complete: 2 visualizations generated from up to 50 posts".to_string()]
        );
        assert_eq!(app.wizard.step(), WizardStep::Results);
        assert_eq!(api.realtime_calls(), vec![("1".to_string(), Session::new("Race"))]);
    }

    #[tokio::test]
    async fn missing_type_is_substituted_with_exactly_one_notice() {
        let (mut app, _api) = ready_app(
            ScriptedApi::new().with_realtime_replies(vec![Reply::Ok(timeline_and_wordcloud())]),
            VisualizationType::Heatmap,
        )
        .await;

        app.analyze().await;

        let displayed = app.displayed.as_ref().unwrap();
        assert_eq!(displayed.visualization.kind, VisualizationType::Timeline);
        let notices: Vec<_> = app
            .notifier
            .active()
            .iter()
            .filter(|n| n.message.contains("not available"))
            .collect();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.contains("heatmap"));
        assert!(notices[0].message.contains("timeline"));
        assert_eq!(app.image_info.map(|info| info.width), Some(2));
    }

    #[tokio::test]
    async fn still_processing_polls_once_with_selected_type() {
        let (mut app, api) = ready_app(
            ScriptedApi::new()
                .with_realtime_replies(vec![Reply::Ok(RealtimeOutcome::Processing {
                    warning: "still processing".to_string(),
                })])
                .with_visualization_replies(vec![
                    VizReply::Empty,
                    VizReply::Found(vec![Visualization::new(VisualizationType::Heatmap, "hm")]),
                ]),
            VisualizationType::Heatmap,
        )
        .await;

        app.analyze().await;

        let calls = api.visualization_calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|call| call.kind == VisualizationType::Heatmap));
        assert_eq!(app.displayed.as_ref().map(|d| d.visualization.data.as_str()), Some("hm"));
        assert_eq!(app.analysis.phase(), AnalysisPhase::Idle);
        assert!(app.trigger.is_enabled());
    }

    #[tokio::test]
    async fn exhausted_poll_tells_user_to_retry() {
        let (mut app, api) = ready_app(
            ScriptedApi::new().with_realtime_replies(vec![Reply::Ok(RealtimeOutcome::Processing {
                warning: "still processing".to_string(),
            })]),
            VisualizationType::Timeline,
        )
        .await;

        app.analyze().await;

        assert_eq!(api.visualization_calls().len(), 3);
        assert!(app.displayed.is_none());
        assert!(messages(&app, NotificationKind::Error).is_empty());
        assert!(messages(&app, NotificationKind::Info)
            .iter()
            .any(|m| m.contains("try again later")));
        assert_eq!(app.trigger.completed_runs(), 1);
        assert!(app.trigger.is_enabled());
    }

    #[tokio::test]
    async fn precomputed_empty_is_soft_unavailable() {
        let (mut app, api) = ready_app(ScriptedApi::new(), VisualizationType::Wordcloud).await;
        app.toggle_mode();

        app.analyze().await;

        assert_eq!(api.visualization_calls().len(), 1);
        assert!(api.realtime_calls().is_empty());
        assert!(messages(&app, NotificationKind::Error).is_empty());
        assert!(messages(&app, NotificationKind::Info)
            .iter()
            .any(|m| m.starts_with("No Word Cloud visualization available yet")));
        assert_eq!(app.trigger.completed_runs(), 1);
    }

    #[tokio::test]
    async fn hard_failures_notify_and_release_the_trigger() {
        for reply in [
            Reply::Failure("scraper crashed".to_string()),
            Reply::ServerError(500),
            Reply::Unreachable,
        ] {
            let (mut app, _api) = ready_app(
                ScriptedApi::new().with_realtime_replies(vec![reply]),
                VisualizationType::Timeline,
            )
            .await;

            app.analyze().await;

            assert_eq!(messages(&app, NotificationKind::Error).len(), 1);
            assert!(app.displayed.is_none());
            assert!(app.trigger.is_enabled());
            assert_eq!(app.trigger.completed_runs(), 1);
        }
    }

    #[tokio::test]
    async fn trigger_is_disabled_while_an_action_runs() {
        let (mut app, api) = ready_app(ScriptedApi::new(), VisualizationType::Timeline).await;

        let request = app.begin_analysis().unwrap();
        assert!(!app.trigger.is_enabled());
        assert_eq!(app.trigger.label(), "Analyzing...");
        assert!(app.begin_analysis().is_none(), "re-entry is a no-op");

        app.finish_analysis(AnalysisReport::aborted(request));
        assert!(app.trigger.is_enabled());
        assert_eq!(app.trigger.completed_runs(), 1);
        assert!(api.realtime_calls().is_empty());
    }

    #[tokio::test]
    async fn analyze_without_session_only_notifies() {
        let (mut app, api) = app_with(ScriptedApi::new());
        app.choose_round(Some("1".to_string())).await;
        let step = app.wizard.step();

        app.analyze().await;

        assert_eq!(
            messages(&app, NotificationKind::Error),
            vec!["Please select a round and a session first".to_string()]
        );
        assert_eq!(app.wizard.step(), step);
        assert_eq!(app.trigger.completed_runs(), 0);
        assert!(api.realtime_calls().is_empty());
    }

    #[tokio::test]
    async fn switching_type_reuses_cached_batch() {
        let (mut app, api) = ready_app(
            ScriptedApi::new().with_realtime_replies(vec![Reply::Ok(timeline_and_wordcloud())]),
            VisualizationType::Timeline,
        )
        .await;
        app.analyze().await;

        app.select_visualization_type(VisualizationType::Wordcloud);

        assert_eq!(app.displayed.as_ref().map(|d| d.visualization.data.as_str()), Some("V2"));
        assert_eq!(api.realtime_calls().len(), 1);
    }

    #[tokio::test]
    async fn changing_session_drops_the_cached_batch() {
        let (mut app, api) = ready_app(
            ScriptedApi::new().with_realtime_replies(vec![Reply::Ok(timeline_and_wordcloud())]),
            VisualizationType::Timeline,
        )
        .await;
        app.analyze().await;
        assert!(app.selection.last_realtime_batch().is_some());

        app.select_session(Some(Session::new("FP1")));
        app.select_visualization_type(VisualizationType::Wordcloud);

        assert!(app.selection.last_realtime_batch().is_none());
        assert!(app.displayed.is_none());
        assert_eq!(app.wizard.step(), WizardStep::VisualizationSelect);
        assert_eq!(api.realtime_calls().len(), 1);
    }

    #[tokio::test]
    async fn reselecting_the_same_session_keeps_the_cached_batch() {
        let (mut app, _api) = ready_app(
            ScriptedApi::new().with_realtime_replies(vec![Reply::Ok(timeline_and_wordcloud())]),
            VisualizationType::Timeline,
        )
        .await;
        app.analyze().await;

        app.select_session(Some(Session::new("Race")));
        app.select_visualization_type(VisualizationType::Wordcloud);

        assert_eq!(app.displayed.as_ref().map(|d| d.visualization.data.as_str()), Some("V2"));
    }

    fn finished_report(request: AnalysisRequest) -> AnalysisReport {
        let RealtimeOutcome::Ready { batch, .. } = timeline_and_wordcloud() else {
            unreachable!("fixture is always ready");
        };
        let displayed = DisplayedVisualization {
            round: request.round.clone(),
            session: request.session.clone(),
            visualization: Visualization::new(VisualizationType::Timeline, tiny_png_base64()),
            requested: request.kind,
            stats: None,
        };
        AnalysisReport {
            request,
            batch: Some(batch),
            displayed: Some(displayed),
        }
    }

    #[tokio::test]
    async fn late_result_for_an_abandoned_round_is_dropped() {
        let (mut app, _api) = ready_app(ScriptedApi::new(), VisualizationType::Timeline).await;
        let request = app.begin_analysis().unwrap();

        app.select_round(Some("2".to_string()));
        app.finish_analysis(finished_report(request));

        assert_eq!(app.selection.current_round(), Some("2"));
        assert!(app.selection.last_realtime_batch().is_none());
        assert!(app.displayed.is_none());
        assert_eq!(app.wizard.step(), WizardStep::SessionSelect);
        assert!(!app.trigger.is_in_flight());
        assert_eq!(app.trigger.completed_runs(), 1);
    }

    #[tokio::test]
    async fn late_result_for_an_abandoned_session_is_dropped() {
        let (mut app, _api) = ready_app(ScriptedApi::new(), VisualizationType::Timeline).await;
        let request = app.begin_analysis().unwrap();

        app.select_session(Some(Session::new("FP1")));
        app.finish_analysis(finished_report(request));

        assert!(app.selection.last_realtime_batch().is_none());
        assert!(app.displayed.is_none());
        assert_eq!(app.wizard.step(), WizardStep::VisualizationSelect);
        assert!(app.trigger.is_enabled());
    }

    #[tokio::test]
    async fn result_for_the_current_selection_is_shown() {
        let (mut app, _api) = ready_app(ScriptedApi::new(), VisualizationType::Timeline).await;
        let request = app.begin_analysis().unwrap();

        app.finish_analysis(finished_report(request));

        assert!(app.selection.last_realtime_batch().is_some());
        assert_eq!(app.wizard.step(), WizardStep::Results);
    }

    #[tokio::test]
    async fn precomputed_missing_type_falls_back_with_one_notice() {
        let (mut app, _api) = ready_app(
            ScriptedApi::new().with_visualization_replies(vec![VizReply::Found(vec![
                Visualization::new(VisualizationType::Timeline, tiny_png_base64()),
            ])]),
            VisualizationType::Heatmap,
        )
        .await;
        app.toggle_mode();

        app.analyze().await;

        let displayed = app.displayed.as_ref().unwrap();
        assert_eq!(displayed.visualization.kind, VisualizationType::Timeline);
        assert!(displayed.was_substituted());
        assert_eq!(
            app.notifier
                .active()
                .iter()
                .filter(|n| n.message.contains("not available"))
                .count(),
            1
        );
        assert!(app.selection.last_realtime_batch().is_none());
    }

    #[tokio::test]
    async fn fuzzy_filter_ranks_rounds() {
        let (mut app, _api) = app_with(ScriptedApi::new());
        app.load_races().await;

        app.round_filter = "saudi".to_string();
        let filtered = app.filtered_rounds();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "2");

        app.round_filter.clear();
        assert_eq!(app.filtered_rounds().len(), 2);
    }

    #[tokio::test]
    async fn export_writes_displayed_image() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let (mut app, _api) = ready_app(
            ScriptedApi::new().with_realtime_replies(vec![Reply::Ok(timeline_and_wordcloud())]),
            VisualizationType::Timeline,
        )
        .await;
        app.config.export_dir = dir.path().to_path_buf();

        assert!(app.export_displayed().is_none(), "nothing displayed yet");
        app.analyze().await;
        let path = app.export_displayed().ok_or("export failed")?;

        assert!(path.ends_with("round-1-race-timeline.png"));
        assert!(path.exists());
        Ok(())
    }
}
