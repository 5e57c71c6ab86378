use crate::app::events::Command;
use crate::app::input::helpers::{step_cursor, Move};
use crate::app::state::App;
use crate::app::wizard::WizardStep;
use crate::domain::VisualizationType;
use crossterm::event::KeyCode;

use super::start_analysis;

pub fn handle_visualizations_input(app: &mut App, key: KeyCode) -> Option<Command> {
    match key {
        KeyCode::Up => select_relative(app, Move::Up),
        KeyCode::Down => select_relative(app, Move::Down),
        KeyCode::Enter | KeyCode::Char('a') => return start_analysis(app),
        KeyCode::Esc => {
            app.focus = WizardStep::SessionSelect;
        }
        _ => {}
    }
    None
}

/// Radio-style: moving the cursor changes the selected type.
pub fn select_relative(app: &mut App, direction: Move) {
    let index = step_cursor(app.viz_cursor, VisualizationType::ALL.len(), direction);
    if let Some(kind) = VisualizationType::from_index(index) {
        app.select_visualization_type(kind);
    }
}
