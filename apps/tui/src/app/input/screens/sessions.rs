use crate::app::events::Command;
use crate::app::input::helpers::{step_cursor, Move};
use crate::app::state::App;
use crate::app::wizard::WizardStep;
use crossterm::event::KeyCode;

pub fn handle_sessions_input(app: &mut App, key: KeyCode) -> Option<Command> {
    match key {
        KeyCode::Up => {
            app.session_cursor = step_cursor(app.session_cursor, app.sessions.len(), Move::Up);
        }
        KeyCode::Down => {
            app.session_cursor = step_cursor(app.session_cursor, app.sessions.len(), Move::Down);
        }
        KeyCode::Enter => {
            if let Some(session) = app.sessions.get(app.session_cursor).cloned() {
                app.select_session(Some(session));
            }
        }
        KeyCode::Delete => {
            app.select_session(None);
        }
        KeyCode::Esc => {
            app.focus = WizardStep::RoundSelect;
        }
        _ => {}
    }
    None
}
