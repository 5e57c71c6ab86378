mod helpers;
pub mod screens;

use crate::app::events::Command;
use crate::app::state::App;
use crossterm::event::KeyCode;

/// Applies one key press. Returns network work the caller should start.
pub fn handle_input(app: &mut App, key: KeyCode) -> Option<Command> {
    screens::dispatch_input(app, key)
}
