use clap::Parser;
use color_eyre::Result;
use std::sync::Arc;

use race_sentiment::api::HttpApiClient;
use race_sentiment::app::App;
use race_sentiment::cli::CliArgs;
use race_sentiment::config::AppConfig;
use race_sentiment::{event, logging, terminal};

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();

    let config = AppConfig::load()?;
    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Logging disabled: {e}");
    }
    tracing::info!(api = %config.api_base_url, "starting race-sentiment");

    let api = HttpApiClient::new(&config.api_base_url, config.request_timeout)?;
    let mut app = App::new(config, Arc::new(api));

    // Check if we're running in a terminal
    if args.wants_headless() || !is_terminal() {
        return event::run_headless(&mut app, &args).await;
    }

    terminal::install_panic_hook();
    let mut terminal = terminal::setup()?;

    let result = event::run(&mut terminal, &mut app).await;

    // Restore terminal
    terminal::cleanup(true, true);

    result
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
