//! Calendar client provider: loads the stored credential, attaches it to a
//! fresh OAuth client and persists silent refreshes back to storage.

use async_trait::async_trait;
use rusqlite::Result as SqliteResult;
use std::sync::Arc;

use super::calendar::CalendarClient;
use super::error::CalendarError;
use super::oauth::{OAuthClient, TokenListener};
use crate::config::Config;
use crate::models::Credential;

/// Storage for the single Google credential
pub trait TokenStore: Send + Sync {
    fn load(&self) -> SqliteResult<Option<Credential>>;

    /// Merge present fields into the stored credential and return the result
    fn save(&self, update: &Credential) -> SqliteResult<Credential>;
}

/// Writes refreshed tokens to the store. Failures are logged and dropped;
/// the next request simply refreshes again.
pub struct PersistingListener {
    store: Arc<dyn TokenStore>,
}

impl PersistingListener {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TokenListener for PersistingListener {
    async fn on_token_refresh(&self, update: &Credential) {
        match self.store.save(update) {
            Ok(_) => log::info!("[OAUTH] Persisted refreshed access token"),
            Err(e) => log::warn!("[OAUTH] Failed to persist refreshed token: {}", e),
        }
    }
}

pub struct CalendarProvider {
    config: Config,
    store: Arc<dyn TokenStore>,
}

impl CalendarProvider {
    pub fn new(config: &Config, store: Arc<dyn TokenStore>) -> Self {
        Self {
            config: config.clone(),
            store,
        }
    }

    /// Build an authenticated calendar handle
    pub fn get_client(&self) -> Result<CalendarClient, CalendarError> {
        let oauth = OAuthClient::from_config(&self.config).ok_or(CalendarError::NotConfigured)?;

        let credentials = match self.store.load()? {
            Some(c) if c.has_access_token() => c,
            _ => return Err(CalendarError::NotAuthenticated),
        };

        let listener = Arc::new(PersistingListener::new(self.store.clone()));
        let oauth = oauth.with_credentials(credentials).on_token_refresh(listener);

        Ok(CalendarClient::new(
            oauth,
            &self.config.google_calendar_id,
            &self.config.google_calendar_api_url,
        ))
    }

    /// Whether a credential with an access token is stored
    pub fn is_connected(&self) -> Result<bool, CalendarError> {
        Ok(self.store.load()?.is_some_and(|c| c.has_access_token()))
    }
}
