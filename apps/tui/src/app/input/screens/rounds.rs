use crate::app::events::Command;
use crate::app::input::helpers::{step_cursor, Move};
use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_rounds_input(app: &mut App, key: KeyCode) -> Option<Command> {
    let visible = app.filtered_rounds().len();
    match key {
        KeyCode::Up => {
            app.round_cursor = step_cursor(app.round_cursor, visible, Move::Up);
        }
        KeyCode::Down => {
            app.round_cursor = step_cursor(app.round_cursor, visible, Move::Down);
        }
        KeyCode::Char('/') => {
            app.filtering = true;
        }
        KeyCode::Enter => {
            let round = app
                .filtered_rounds()
                .get(app.round_cursor)
                .map(|round| round.id.clone())?;
            return app.select_round(Some(round)).map(Command::FetchSessions);
        }
        KeyCode::Esc | KeyCode::Delete => {
            app.select_round(None);
        }
        _ => {}
    }
    None
}

pub fn handle_filter_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char(c) => {
            app.round_filter.push(c);
            app.round_cursor = 0;
        }
        KeyCode::Backspace => {
            app.round_filter.pop();
            app.round_cursor = 0;
        }
        KeyCode::Enter => {
            app.filtering = false;
        }
        KeyCode::Esc => {
            app.filtering = false;
            app.round_filter.clear();
            app.round_cursor = 0;
        }
        _ => {}
    }
}
