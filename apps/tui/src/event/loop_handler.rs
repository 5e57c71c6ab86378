use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::Stdout;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::app::analysis::{run_analysis, AnalysisReport};
use crate::app::{handle_input, App, AppEvent, Command};
use crate::ui;

fn send(tx: &UnboundedSender<AppEvent>, event: AppEvent) {
    if tx.send(event).is_err() {
        tracing::debug!("event loop closed before a background result arrived");
    }
}

/// Starts the network work behind `command` on the runtime. Results come back
/// through `tx` as `AppEvent`s and are applied on the UI task.
pub fn spawn_command(app: &App, command: Command, tx: &UnboundedSender<AppEvent>) {
    let tx = tx.clone();
    match command {
        Command::LoadRaces => {
            let api = app.api();
            tokio::spawn(async move {
                let result = api.fetch_races().await;
                send(&tx, AppEvent::RacesLoaded(result));
            });
        }
        Command::FetchSessions(tag) => {
            let api = app.api();
            tokio::spawn(async move {
                let result = api.fetch_sessions(&tag.round).await;
                send(&tx, AppEvent::SessionsLoaded { tag, result });
            });
        }
        Command::Analyze(request) => {
            let context = app.analysis_context();
            tokio::spawn(async move {
                let (updates_tx, mut updates_rx) = mpsc::unbounded_channel();

                let forward_tx = tx.clone();
                let forward = tokio::spawn(async move {
                    while let Some(update) = updates_rx.recv().await {
                        send(&forward_tx, AppEvent::Analysis(update));
                    }
                });

                let fallback = request.clone();
                let worker =
                    tokio::spawn(async move { run_analysis(&context, request, &updates_tx).await });

                // The trigger must be released even if the worker dies.
                let report = match worker.await {
                    Ok(report) => report,
                    Err(error) => {
                        tracing::error!(%error, "analysis task failed");
                        AnalysisReport::aborted(fallback)
                    }
                };

                if let Err(error) = forward.await {
                    tracing::warn!(%error, "analysis update forwarder failed");
                }
                send(&tx, AppEvent::AnalysisFinished(report));
            });
        }
    }
}

/// Run the main application event loop
pub async fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    let (tx, mut rx) = mpsc::unbounded_channel();

    app.begin_load_races();
    spawn_command(app, Command::LoadRaces, &tx);

    while app.running {
        // Update animations and expire notifications
        app.update();

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        if matches!(
            event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if let Some(command) = handle_input(app, key.code) {
                        spawn_command(app, command, &tx);
                    }
                }
                Ok(Event::Resize(_, _)) => {
                    // Force a redraw after resize
                    if terminal.draw(|f| ui::ui(app, f)).is_err() {
                        tracing::debug!("redraw after resize failed");
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "failed to read terminal event"),
            }
        }

        while let Ok(event) = rx.try_recv() {
            app.handle_event(event);
        }
    }

    tracing::info!("leaving event loop");
    Ok(())
}
