use crate::app::events::Command;
use crate::app::input::helpers::Move;
use crate::app::state::App;
use crate::app::wizard::WizardStep;
use crossterm::event::KeyCode;

use super::start_analysis;
use super::visualizations::select_relative;

pub fn handle_results_input(app: &mut App, key: KeyCode) -> Option<Command> {
    match key {
        KeyCode::Left | KeyCode::Up => select_relative(app, Move::Up),
        KeyCode::Right | KeyCode::Down => select_relative(app, Move::Down),
        KeyCode::Char('a') => return start_analysis(app),
        KeyCode::Esc => {
            app.focus = WizardStep::VisualizationSelect;
        }
        _ => {}
    }
    None
}
