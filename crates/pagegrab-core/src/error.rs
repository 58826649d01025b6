use thiserror::Error;

/// Application-wide error types for pagegrab.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or empty target URL.
    #[error("Usage error: {0}")]
    Usage(String),

    /// Invalid configuration (bad config file, empty selector list, ...).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The browser process could not be launched or a tab could not be opened.
    #[error("Browser error: {0}")]
    BrowserError(String),

    /// Navigating to the target (or archive) URL failed.
    #[error("Navigation error: {0}")]
    NavigationError(String),

    /// Every candidate selector failed to produce text.
    #[error("Could not find page content (tried: {})", tried.join(", "))]
    ContentNotFound { tried: Vec<String> },

    /// Extracted text is shorter than the configured minimum and the
    /// quality policy rejects it.
    #[error("Content too short: {chars} characters (minimum {minimum})")]
    LowQualityContent { chars: usize, minimum: usize },

    /// Operation timed out.
    #[error("Timed out after {0} seconds")]
    Timeout(u64),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Process exit status for this error.
    ///
    /// Usage and configuration problems exit with `2` (like clap's own
    /// argument errors); every runtime failure exits with `1`.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Usage(_) | AppError::ConfigError(_) => 2,
            _ => 1,
        }
    }
}
