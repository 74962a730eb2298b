//! Google OAuth2 and Calendar integration
//!
//! The token lifecycle lives here: `OAuthClient` performs the authorization
//! code exchange and silent refreshes, `CalendarProvider` wires a stored
//! credential into a client and persists every refresh back to the
//! `TokenStore`.

mod calendar;
mod error;
mod oauth;
mod provider;
mod types;

pub use calendar::CalendarClient;
pub use error::CalendarError;
pub use oauth::OAuthClient;
pub use provider::{CalendarProvider, TokenStore};
pub use types::{EventDateTime, NewCalendarEvent};
