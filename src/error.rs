use thiserror::Error;

/// Main error type for the roster engine
#[derive(Error, Debug)]
pub enum RosterError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP request errors
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// External player source errors
    #[error("Player source '{name}' error: {message}")]
    Source { name: String, message: String },

    /// Description backend errors
    #[error("Description backend error: {0}")]
    Describe(String),

    /// Unknown player id
    #[error("Player not found: {0}")]
    NotFound(i64),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<String> for RosterError {
    fn from(s: String) -> Self {
        RosterError::Other(s)
    }
}

impl From<&str> for RosterError {
    fn from(s: &str) -> Self {
        RosterError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RosterError>;
