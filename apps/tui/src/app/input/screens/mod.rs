use crate::app::events::Command;
use crate::app::state::App;
use crate::app::wizard::WizardStep;
use crossterm::event::KeyCode;

mod help;
mod results;
mod rounds;
mod sessions;
mod visualizations;

pub fn dispatch_input(app: &mut App, key: KeyCode) -> Option<Command> {
    if help::handle_help_toggle(app, key) {
        return None;
    }

    // While typing a filter every printable key belongs to the filter.
    if app.filtering {
        rounds::handle_filter_input(app, key);
        return None;
    }

    if let Some(command) = handle_global_input(app, key) {
        return command;
    }

    match app.focus {
        WizardStep::RoundSelect => rounds::handle_rounds_input(app, key),
        WizardStep::SessionSelect => sessions::handle_sessions_input(app, key),
        WizardStep::VisualizationSelect => visualizations::handle_visualizations_input(app, key),
        WizardStep::Results => results::handle_results_input(app, key),
    }
}

/// Keys that work on every panel. `Some` means the key was consumed.
fn handle_global_input(app: &mut App, key: KeyCode) -> Option<Option<Command>> {
    match key {
        KeyCode::Char('q') => {
            app.running = false;
            Some(None)
        }
        KeyCode::Tab => {
            app.focus = next_focus(app, true);
            Some(None)
        }
        KeyCode::BackTab => {
            app.focus = next_focus(app, false);
            Some(None)
        }
        KeyCode::Char('m') => {
            app.toggle_mode();
            Some(None)
        }
        KeyCode::Char('r') => {
            app.begin_load_races();
            Some(Some(Command::LoadRaces))
        }
        KeyCode::Char('e') => {
            app.export_displayed();
            Some(None)
        }
        KeyCode::Char('x') => {
            app.notifier.dismiss_latest();
            Some(None)
        }
        _ => None,
    }
}

fn next_focus(app: &App, forward: bool) -> WizardStep {
    let visible: Vec<WizardStep> = app.wizard.visible_panels().collect();
    let current = visible.iter().position(|step| *step == app.focus).unwrap_or(0);
    let len = visible.len();
    let next = if forward {
        (current + 1) % len
    } else {
        (current + len - 1) % len
    };
    visible[next]
}

/// Starts an analysis from the current selection, if one can run.
fn start_analysis(app: &mut App) -> Option<Command> {
    app.begin_analysis().map(Command::Analyze)
}
