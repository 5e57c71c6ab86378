use thiserror::Error;

pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Failures from the sentiment API, split by where they happened.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced an HTTP response (refused, reset, timed out).
    #[error("Cannot connect to server: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("Server error: {code} {text}")]
    HttpStatus { code: u16, text: String },

    /// The server answered 2xx with `success: false`.
    #[error("{0}")]
    Application(String),

    /// A 2xx body that does not match the documented shape.
    #[error("Unexpected response from server: {0}")]
    Decode(String),

    #[error("Invalid request URL: {0}")]
    Url(String),
}

impl ApiError {
    pub fn application(message: Option<String>) -> Self {
        let message = message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        Self::Application(message)
    }

    /// Short text suitable for a notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => "Cannot connect to server".to_string(),
            Self::HttpStatus { code, text } if text.is_empty() => format!("Server error: {code}"),
            Self::HttpStatus { code, text } => format!("Server error: {code} {text}"),
            Self::Application(message) => message.clone(),
            Self::Decode(_) => "Unexpected response from server".to_string(),
            Self::Url(detail) => format!("Invalid API address: {detail}"),
        }
    }

    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else if let Some(status) = error.status() {
            Self::HttpStatus {
                code: status.as_u16(),
                text: status.canonical_reason().unwrap_or_default().to_string(),
            }
        } else {
            Self::Transport(error)
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}
