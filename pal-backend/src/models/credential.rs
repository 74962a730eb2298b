use chrono::Utc;
use serde::{Deserialize, Serialize};

/// OAuth2 token set for the single connected Google account.
///
/// The same shape doubles as a partial update: `None` fields are left
/// untouched when merged into a stored credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
    /// Access token expiry as epoch milliseconds
    pub expiry_date: Option<i64>,
}

impl Credential {
    /// Overlay every field present in `update` onto a copy of `self`
    pub fn merged_with(&self, update: &Credential) -> Credential {
        Credential {
            access_token: update.access_token.clone().or_else(|| self.access_token.clone()),
            refresh_token: update.refresh_token.clone().or_else(|| self.refresh_token.clone()),
            scope: update.scope.clone().or_else(|| self.scope.clone()),
            token_type: update.token_type.clone().or_else(|| self.token_type.clone()),
            expiry_date: update.expiry_date.or(self.expiry_date),
        }
    }

    /// True once the authorization flow has stored an access token
    pub fn has_access_token(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// True when the access token expires within `skew_secs` (unknown expiry counts as valid)
    pub fn is_expired(&self, skew_secs: i64) -> bool {
        match self.expiry_date {
            Some(expiry) => expiry <= Utc::now().timestamp_millis() + skew_secs * 1000,
            None => false,
        }
    }
}
