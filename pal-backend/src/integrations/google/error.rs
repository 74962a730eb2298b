//! Calendar and OAuth error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Google Calendar is not configured. Set GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_REDIRECT_URI.")]
    NotConfigured,

    #[error("Google Calendar is not connected. Visit /auth/google to authorize.")]
    NotAuthenticated,

    #[error("Token storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Google API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode Google response: {0}")]
    Decode(String),
}

impl CalendarError {
    /// Stable machine-readable code for JSON error payloads
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::NotAuthenticated => "not_authenticated",
            Self::Storage(_) => "storage",
            Self::Api { .. } | Self::Network(_) => "upstream",
            Self::Decode(_) => "decode",
        }
    }
}
