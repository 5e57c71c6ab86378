use color_eyre::eyre::{bail, eyre};
use color_eyre::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::app::analysis::AnalysisMode;
use crate::app::notifier::NotificationKind;
use crate::app::App;
use crate::cli::CliArgs;
use crate::domain::{Session, VisualizationType};

/// Run the application in headless mode (no UI)
pub async fn run_headless(app: &mut App, args: &CliArgs) -> Result<()> {
    if args.health {
        return render_health(app, args.json).await;
    }

    let Some(round) = args.round.clone() else {
        return render_races(app, args.json).await;
    };

    let sessions = load_sessions(app, &round).await?;
    let Some(session) = args.session.as_deref() else {
        return render_sessions(&round, &sessions, args.json);
    };

    let kind = VisualizationType::parse(&args.viz_type)
        .ok_or_else(|| eyre!("Unknown visualization type: {}", args.viz_type))?;
    let session = sessions
        .iter()
        .find(|candidate| candidate.as_str().eq_ignore_ascii_case(session))
        .cloned()
        .ok_or_else(|| {
            let known: Vec<&str> = sessions.iter().map(Session::as_str).collect();
            eyre!(
                "Session {session} not found for round {round}. Available: {}",
                known.join(", ")
            )
        })?;

    if args.precomputed {
        app.mode = AnalysisMode::Precomputed;
    }
    app.select_session(Some(session));
    app.select_visualization_type(kind);
    app.analyze().await;

    let exported = if app.displayed.is_some() {
        app.export_displayed()
    } else {
        None
    };
    let summary = build_analysis_summary(app, exported);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        render_analysis_text(&summary);
    }

    if summary.shown.is_none() {
        bail!("No visualization was produced");
    }
    Ok(())
}

async fn render_health(app: &App, json: bool) -> Result<()> {
    let health = app.api().health_check().await.map_err(|error| {
        tracing::error!(%error, "health check failed");
        eyre!("Health check failed: {}", error.user_message())
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        println!("{}: {}", health.status, health.message);
    }

    if !health.is_healthy() {
        bail!("API reported status {}", health.status);
    }
    Ok(())
}

async fn render_races(app: &mut App, json: bool) -> Result<()> {
    app.load_races().await;
    fail_on_errors(app)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&app.rounds)?);
        return Ok(());
    }

    println!("\nRace Rounds");
    println!("===========");
    if app.rounds.is_empty() {
        println!("(none)");
    }
    for round in &app.rounds {
        println!("- {}", round.label());
    }
    Ok(())
}

async fn load_sessions(app: &mut App, round: &str) -> Result<Vec<Session>> {
    app.choose_round(Some(round.to_string())).await;
    fail_on_errors(app)?;
    Ok(app.sessions.clone())
}

fn render_sessions(round: &str, sessions: &[Session], json: bool) -> Result<()> {
    if json {
        let listing = HeadlessSessions {
            round: round.to_string(),
            sessions: sessions.to_vec(),
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("\nSessions for round {round}");
    println!("=======================");
    if sessions.is_empty() {
        println!("(none)");
    }
    for session in sessions {
        println!("- {session}");
    }
    Ok(())
}

/// Surfaces error notifications raised by the last step as a failed run.
fn fail_on_errors(app: &App) -> Result<()> {
    let errors: Vec<&str> = app
        .notifier
        .active()
        .iter()
        .filter(|n| n.kind == NotificationKind::Error)
        .map(|n| n.message.as_str())
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(eyre!(errors.join("; ")))
    }
}

fn build_analysis_summary(app: &App, exported: Option<PathBuf>) -> HeadlessAnalysis {
    let notifications = app
        .notifier
        .active()
        .iter()
        .map(|n| HeadlessNotification {
            kind: n.kind.label().to_string(),
            message: n.message.clone(),
        })
        .collect();

    let displayed = app.displayed.as_ref();

    HeadlessAnalysis {
        round: app.selection.current_round().unwrap_or_default().to_string(),
        session: app
            .selection
            .selected_session()
            .map(ToString::to_string)
            .unwrap_or_default(),
        mode: app.mode.label().to_string(),
        requested: app.selection.visualization_type().as_str().to_string(),
        shown: displayed.map(|d| d.visualization.kind.as_str().to_string()),
        substituted: displayed.is_some_and(|d| d.was_substituted()),
        width: app.image_info.map(|info| info.width),
        height: app.image_info.map(|info| info.height),
        bytes: app.image_info.map(|info| info.bytes),
        exported: exported.map(|path| path.display().to_string()),
        notifications,
    }
}

fn render_analysis_text(summary: &HeadlessAnalysis) {
    println!("\nSentiment Analysis");
    println!("==================");
    println!("Round: {}", summary.round);
    println!("Session: {}", summary.session);
    println!("Mode: {}", summary.mode);
    println!("Requested: {}", summary.requested);

    match &summary.shown {
        Some(shown) => {
            println!("Shown: {shown}");
            if let (Some(width), Some(height), Some(bytes)) =
                (summary.width, summary.height, summary.bytes)
            {
                println!("Image: {width}x{height} PNG, {bytes} bytes");
            }
        }
        None => println!("Shown: (nothing)"),
    }
    if let Some(path) = &summary.exported {
        println!("Saved: {path}");
    }

    if !summary.notifications.is_empty() {
        println!("\nMessages:");
        for notification in &summary.notifications {
            println!("- [{}] {}", notification.kind, notification.message);
        }
    }
}

#[derive(Serialize)]
struct HeadlessSessions {
    round: String,
    sessions: Vec<Session>,
}

#[derive(Serialize)]
struct HeadlessAnalysis {
    round: String,
    session: String,
    mode: String,
    requested: String,
    shown: Option<String>,
    substituted: bool,
    width: Option<u32>,
    height: Option<u32>,
    bytes: Option<usize>,
    exported: Option<String>,
    notifications: Vec<HeadlessNotification>,
}

#[derive(Serialize)]
struct HeadlessNotification {
    kind: String,
    message: String,
}
