//! Google OAuth2 client for Calendar access.
//!
//! Built per request from configuration. A client carries the credential it
//! was handed and refreshes the access token on demand, notifying every
//! registered `TokenListener` with the refresh payload.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::error::CalendarError;
use crate::config::Config;
use crate::models::Credential;

pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Refresh when the access token expires within this many seconds
const REFRESH_SKEW_SECS: i64 = 60;

const HTTP_TIMEOUT_SECS: u64 = 30;

/// Token endpoint response for both code exchange and refresh
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Partial credential carrying only the fields Google returned
    pub fn to_credential(&self) -> Credential {
        Credential {
            access_token: Some(self.access_token.clone()),
            refresh_token: self.refresh_token.clone(),
            scope: self.scope.clone(),
            token_type: self.token_type.clone(),
            expiry_date: self
                .expires_in
                .map(|secs| Utc::now().timestamp_millis() + secs * 1000),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Observer notified after the client silently refreshes its access token
#[async_trait]
pub trait TokenListener: Send + Sync {
    async fn on_token_refresh(&self, update: &Credential);
}

pub struct OAuthClient {
    http: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_url: String,
    token_url: String,
    credentials: Mutex<Credential>,
    listeners: Vec<Arc<dyn TokenListener>>,
}

impl OAuthClient {
    /// Build a client from configuration, or None when any OAuth setting is missing
    pub fn from_config(config: &Config) -> Option<Self> {
        let client_id = config.google_client_id.clone()?;
        let client_secret = config.google_client_secret.clone()?;
        let redirect_uri = config.google_redirect_uri.clone()?;

        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("[OAUTH] Failed to build HTTP client with timeout, using defaults: {}", e);
                Client::new()
            });

        Some(Self {
            http,
            client_id,
            client_secret,
            redirect_uri,
            auth_url: config.google_auth_url.clone(),
            token_url: config.google_token_url.clone(),
            credentials: Mutex::new(Credential::default()),
            listeners: Vec::new(),
        })
    }

    /// Attach a stored credential
    pub fn with_credentials(mut self, credentials: Credential) -> Self {
        *self.credentials.get_mut() = credentials;
        self
    }

    /// Register an observer for silent token refreshes
    pub fn on_token_refresh(mut self, listener: Arc<dyn TokenListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Consent screen URL. Requests offline access and forces re-consent so
    /// Google always issues a refresh token.
    pub fn authorization_url(&self) -> Result<String, url::ParseError> {
        let url = url::Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", CALENDAR_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )?;
        Ok(url.into())
    }

    /// Exchange a one-time authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, CalendarError> {
        log::info!("[OAUTH] Exchanging authorization code");
        self.request_token(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.redirect_uri.as_str()),
        ])
        .await
    }

    /// Obtain a new access token from a refresh token
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, CalendarError> {
        log::info!("[OAUTH] Refreshing access token");
        self.request_token(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, CalendarError> {
        let response = self.http.post(&self.token_url).form(form).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{}: {}", err.error, desc),
                    None => err.error,
                },
                Err(_) => body,
            };
            log::warn!("[OAUTH] Token endpoint returned {}: {}", status, message);
            return Err(CalendarError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| CalendarError::Decode(e.to_string()))
    }

    /// Current access token, refreshed first if it is about to expire
    pub async fn access_token(&self) -> Result<String, CalendarError> {
        let mut credentials = self.credentials.lock().await;

        if credentials.is_expired(REFRESH_SKEW_SECS) {
            match credentials.refresh_token.clone() {
                Some(refresh_token) if !refresh_token.is_empty() => {
                    let update = self.refresh(&refresh_token).await?.to_credential();
                    *credentials = credentials.merged_with(&update);
                    for listener in &self.listeners {
                        listener.on_token_refresh(&update).await;
                    }
                }
                _ => log::warn!("[OAUTH] Access token expired and no refresh token is stored"),
            }
        }

        match credentials.access_token.as_deref() {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(CalendarError::NotAuthenticated),
        }
    }

    #[cfg(test)]
    pub(crate) async fn current_credentials(&self) -> Credential {
        self.credentials.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(token_url: &str) -> Config {
        Config {
            google_client_id: Some("client-id".to_string()),
            google_client_secret: Some("client-secret".to_string()),
            google_redirect_uri: Some("http://localhost:3000/oauth2callback".to_string()),
            google_token_url: token_url.to_string(),
            ..Config::default()
        }
    }

    /// Records every refresh payload it is notified with
    #[derive(Default)]
    struct RecordingListener {
        updates: std::sync::Mutex<Vec<Credential>>,
    }

    #[async_trait]
    impl TokenListener for RecordingListener {
        async fn on_token_refresh(&self, update: &Credential) {
            self.updates.lock().unwrap().push(update.clone());
        }
    }

    #[test]
    fn test_factory_requires_all_settings() {
        let mut config = test_config("http://localhost/token");
        assert!(OAuthClient::from_config(&config).is_some());

        config.google_redirect_uri = None;
        assert!(OAuthClient::from_config(&config).is_none());
    }

    #[test]
    fn test_authorization_url_requests_offline_consent() {
        let client = OAuthClient::from_config(&test_config("http://localhost/token")).unwrap();
        let url = client.authorization_url().unwrap();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Foauth2callback"));
        assert!(url.contains("auth%2Fcalendar"));
    }

    #[tokio::test]
    async fn test_exchange_code_parses_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=one-time-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "access-1",
                "refresh_token": "refresh-1",
                "expires_in": 3599,
                "scope": CALENDAR_SCOPE,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OAuthClient::from_config(&test_config(&format!("{}/token", server.uri()))).unwrap();
        let tokens = client.exchange_code("one-time-code").await.unwrap();

        assert_eq!(tokens.access_token, "access-1");
        assert_eq!(tokens.refresh_token.as_deref(), Some("refresh-1"));
        let cred = tokens.to_credential();
        assert!(cred.expiry_date.unwrap() > Utc::now().timestamp_millis());
    }

    #[tokio::test]
    async fn test_exchange_failure_reports_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Bad Request"
            })))
            .mount(&server)
            .await;

        let client = OAuthClient::from_config(&test_config(&format!("{}/token", server.uri()))).unwrap();
        let err = client.exchange_code("stale").await.unwrap_err();

        match err {
            CalendarError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "invalid_grant: Bad Request");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_valid_token_is_used_without_refresh() {
        let listener = Arc::new(RecordingListener::default());
        let client = OAuthClient::from_config(&test_config("http://127.0.0.1:9/token"))
            .unwrap()
            .with_credentials(Credential {
                access_token: Some("still-valid".to_string()),
                refresh_token: Some("refresh".to_string()),
                expiry_date: Some(Utc::now().timestamp_millis() + 3_600_000),
                ..Credential::default()
            })
            .on_token_refresh(listener.clone());

        assert_eq!(client.access_token().await.unwrap(), "still-valid");
        assert!(listener.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_token_refreshes_and_notifies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "access-2",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let listener = Arc::new(RecordingListener::default());
        let client = OAuthClient::from_config(&test_config(&format!("{}/token", server.uri())))
            .unwrap()
            .with_credentials(Credential {
                access_token: Some("access-1".to_string()),
                refresh_token: Some("refresh-1".to_string()),
                scope: Some(CALENDAR_SCOPE.to_string()),
                token_type: Some("Bearer".to_string()),
                expiry_date: Some(Utc::now().timestamp_millis() - 1_000),
            })
            .on_token_refresh(listener.clone());

        assert_eq!(client.access_token().await.unwrap(), "access-2");

        let updates = listener.updates.lock().unwrap().clone();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].access_token.as_deref(), Some("access-2"));
        assert!(updates[0].refresh_token.is_none());

        let current = client.current_credentials().await;
        assert_eq!(current.refresh_token.as_deref(), Some("refresh-1"));
        assert_eq!(current.scope.as_deref(), Some(CALENDAR_SCOPE));
    }

    #[tokio::test]
    async fn test_missing_access_token_is_not_authenticated() {
        let client = OAuthClient::from_config(&test_config("http://127.0.0.1:9/token")).unwrap();
        let err = client.access_token().await.unwrap_err();
        assert!(matches!(err, CalendarError::NotAuthenticated));
    }
}
