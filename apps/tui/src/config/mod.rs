mod settings;

pub use settings::{AppConfig, ConfigError, DEFAULT_API_URL};
