// App module for race_sentiment
// Holds application state and the analyze orchestration

pub mod analysis;
pub mod events;
pub mod input;
pub mod notifier;
pub mod poller;
pub mod selection;
pub mod state;
pub mod trigger;
pub mod wizard;

#[cfg(test)]
pub mod test_support;

pub use events::{AppEvent, Command};
pub use input::handle_input;
pub use state::App;
