use clap::{CommandFactory, Parser};

#[derive(Debug, Parser)]
#[command(name = "race-sentiment", version, about = "Race weekend sentiment viewer")]
pub struct CliArgs {
    /// Run without the terminal UI
    #[arg(long)]
    pub headless: bool,

    /// Print headless output as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override the sentiment API base URL
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,

    /// Override the directory exported images are written to
    #[arg(long = "export-dir", value_name = "PATH")]
    pub export_dir: Option<String>,

    /// Round to analyze (headless)
    #[arg(long, value_name = "ROUND")]
    pub round: Option<String>,

    /// Session to analyze (headless)
    #[arg(long, value_name = "SESSION", requires = "round")]
    pub session: Option<String>,

    /// Visualization type to request (headless)
    #[arg(long = "type", value_name = "TYPE", default_value = "timeline")]
    pub viz_type: String,

    /// Fetch a precomputed visualization instead of running a realtime analysis
    #[arg(long)]
    pub precomputed: bool,

    /// Check API health and exit
    #[arg(long)]
    pub health: bool,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(url) = &self.api_url {
            std::env::set_var("SENTIMENT_API_URL", url);
        }
        if let Some(dir) = &self.export_dir {
            std::env::set_var("SENTIMENT_EXPORT_DIR", dir);
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }

    /// True when any flag only meaningful outside the UI was given.
    pub const fn wants_headless(&self) -> bool {
        self.headless || self.health || self.round.is_some()
    }

    pub fn help_text() -> String {
        let mut command = Self::command();
        let mut buffer = Vec::new();
        command.write_help(&mut buffer).ok();
        String::from_utf8_lossy(&buffer).to_string()
    }
}
