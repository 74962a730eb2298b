use std::env;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_SEARCH_API_URL: &str = "https://api.duckduckgo.com/";

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub public_dir: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_image_model: String,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_redirect_uri: Option<String>,
    pub google_calendar_id: String,
    pub google_auth_url: String,
    pub google_token_url: String,
    pub google_calendar_api_url: String,
    pub default_timezone: String,
    pub search_api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: "./.db/pal.db".to_string(),
            public_dir: "./public".to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_image_model: "dall-e-3".to_string(),
            google_client_id: None,
            google_client_secret: None,
            google_redirect_uri: None,
            google_calendar_id: "primary".to_string(),
            google_auth_url: DEFAULT_GOOGLE_AUTH_URL.to_string(),
            google_token_url: DEFAULT_GOOGLE_TOKEN_URL.to_string(),
            google_calendar_api_url: DEFAULT_CALENDAR_API_URL.to_string(),
            default_timezone: "UTC".to_string(),
            search_api_url: DEFAULT_SEARCH_API_URL.to_string(),
        }
    }
}

/// Read an optional variable, treating blank values as unset
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = match optional_var("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("PORT '{}' is not a valid port number, using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        Self {
            port,
            database_url: optional_var("DATABASE_URL").unwrap_or(defaults.database_url),
            public_dir: optional_var("PUBLIC_DIR").unwrap_or(defaults.public_dir),
            openai_api_key: optional_var("OPENAI_API_KEY"),
            openai_base_url: optional_var("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            openai_model: optional_var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_image_model: optional_var("OPENAI_IMAGE_MODEL").unwrap_or(defaults.openai_image_model),
            google_client_id: optional_var("GOOGLE_CLIENT_ID"),
            google_client_secret: optional_var("GOOGLE_CLIENT_SECRET"),
            google_redirect_uri: optional_var("GOOGLE_REDIRECT_URI"),
            google_calendar_id: optional_var("GOOGLE_CALENDAR_ID").unwrap_or(defaults.google_calendar_id),
            google_auth_url: optional_var("GOOGLE_AUTH_URL").unwrap_or(defaults.google_auth_url),
            google_token_url: optional_var("GOOGLE_TOKEN_URL").unwrap_or(defaults.google_token_url),
            google_calendar_api_url: optional_var("GOOGLE_CALENDAR_API_URL")
                .unwrap_or(defaults.google_calendar_api_url),
            default_timezone: optional_var("DEFAULT_TIMEZONE").unwrap_or(defaults.default_timezone),
            search_api_url: optional_var("SEARCH_API_URL").unwrap_or(defaults.search_api_url),
        }
    }

    /// Whether chat and image generation can reach the AI provider
    pub fn openai_enabled(&self) -> bool {
        self.openai_api_key.is_some()
    }

    /// Whether all three OAuth settings are present
    pub fn google_enabled(&self) -> bool {
        self.google_client_id.is_some()
            && self.google_client_secret.is_some()
            && self.google_redirect_uri.is_some()
    }

    /// Log which optional integrations are available
    pub fn log_summary(&self) {
        if self.openai_enabled() {
            log::info!("OpenAI integration enabled (model: {})", self.openai_model);
        } else {
            log::warn!("OPENAI_API_KEY not set - chat and image endpoints will reply with setup instructions");
        }
        if self.google_enabled() {
            log::info!("Google Calendar integration enabled (calendar: {})", self.google_calendar_id);
        } else {
            log::warn!(
                "GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET / GOOGLE_REDIRECT_URI not all set - calendar sync disabled"
            );
        }
    }
}
