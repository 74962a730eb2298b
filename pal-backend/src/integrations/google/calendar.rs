//! Google Calendar API client.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use super::error::CalendarError;
use super::oauth::OAuthClient;
use super::types::{CalendarEvent, EventList, NewCalendarEvent};

/// Authenticated handle on a single calendar
pub struct CalendarClient {
    oauth: OAuthClient,
    calendar_id: String,
    base_url: String,
}

impl CalendarClient {
    pub fn new(oauth: OAuthClient, calendar_id: &str, base_url: &str) -> Self {
        Self {
            oauth,
            calendar_id: calendar_id.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&self.calendar_id),
        )
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("{}/{}", self.events_url(), urlencoding::encode(event_id))
    }

    /// List single (expanded) events within a time window, ordered by start
    pub async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<EventList, CalendarError> {
        let token = self.oauth.access_token().await?;
        log::info!(
            "[CALENDAR] Listing events {} .. {}",
            time_min.to_rfc3339(),
            time_max.to_rfc3339()
        );

        let response = self
            .oauth
            .http()
            .get(self.events_url())
            .bearer_auth(token)
            .query(&[
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Insert a new event
    pub async fn insert_event(&self, event: &NewCalendarEvent) -> Result<CalendarEvent, CalendarError> {
        let token = self.oauth.access_token().await?;
        log::info!("[CALENDAR] Creating event '{}'", event.summary);

        let response = self
            .oauth
            .http()
            .post(self.events_url())
            .bearer_auth(token)
            .json(event)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Patch an event; the body is forwarded without field validation
    pub async fn patch_event(
        &self,
        event_id: &str,
        patch: &serde_json::Value,
    ) -> Result<CalendarEvent, CalendarError> {
        let token = self.oauth.access_token().await?;
        log::info!("[CALENDAR] Updating event {}", event_id);

        let response = self
            .oauth
            .http()
            .patch(self.event_url(event_id))
            .bearer_auth(token)
            .json(patch)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Delete an event
    pub async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError> {
        let token = self.oauth.access_token().await?;
        log::info!("[CALENDAR] Deleting event {}", event_id);

        let response = self
            .oauth
            .http()
            .delete(self.event_url(event_id))
            .bearer_auth(token)
            .send()
            .await?;

        // 204 No Content on success
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::Api {
                status: status.as_u16(),
                message: Self::error_message(&text),
            })
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            log::warn!("[CALENDAR] Google returned {}", status);
            return Err(CalendarError::Api {
                status: status.as_u16(),
                message: Self::error_message(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| CalendarError::Decode(e.to_string()))
    }

    /// Pull `error.message` out of a Google error body, falling back to the raw text
    fn error_message(body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or_else(|| body.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::integrations::google::EventDateTime;
    use crate::models::Credential;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CalendarClient {
        let config = Config {
            google_client_id: Some("client-id".to_string()),
            google_client_secret: Some("client-secret".to_string()),
            google_redirect_uri: Some("http://localhost:3000/oauth2callback".to_string()),
            google_token_url: format!("{}/token", server.uri()),
            ..Config::default()
        };
        let oauth = OAuthClient::from_config(&config)
            .unwrap()
            .with_credentials(Credential {
                access_token: Some("access-1".to_string()),
                expiry_date: Some(Utc::now().timestamp_millis() + 3_600_000),
                ..Credential::default()
            });
        CalendarClient::new(oauth, "primary", &server.uri())
    }

    #[tokio::test]
    async fn test_list_events_requests_expanded_ordered_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(header("authorization", "Bearer access-1"))
            .and(query_param("singleEvents", "true"))
            .and(query_param("orderBy", "startTime"))
            .and(query_param("timeMin", "2024-01-01T00:00:00+00:00"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "calendar#events",
                "items": [
                    { "id": "e1", "summary": "Standup", "start": { "dateTime": "2024-01-01T09:00:00Z" } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let min = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let max = DateTime::parse_from_rfc3339("2024-01-08T00:00:00Z").unwrap().with_timezone(&Utc);
        let list = client_for(&server).list_events(min, max).await.unwrap();

        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].id, "e1");
    }

    #[tokio::test]
    async fn test_insert_event_posts_typed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(body_json(json!({
                "summary": "Review",
                "start": { "dateTime": "2024-01-01T09:00:00Z", "timeZone": "UTC" },
                "end": { "dateTime": "2024-01-01T10:00:00Z", "timeZone": "UTC" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "new-id",
                "summary": "Review",
                "status": "confirmed"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = client_for(&server)
            .insert_event(&NewCalendarEvent {
                summary: "Review".to_string(),
                description: None,
                start: EventDateTime::timed("2024-01-01T09:00:00Z", "UTC"),
                end: EventDateTime::timed("2024-01-01T10:00:00Z", "UTC"),
            })
            .await
            .unwrap();

        assert_eq!(created.id, "new-id");
        assert_eq!(created.status.as_deref(), Some("confirmed"));
    }

    #[tokio::test]
    async fn test_patch_forwards_body_as_is() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/calendars/primary/events/e1"))
            .and(body_json(json!({ "summary": "Renamed", "colorId": "5" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "e1",
                "summary": "Renamed"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let updated = client_for(&server)
            .patch_event("e1", &json!({ "summary": "Renamed", "colorId": "5" }))
            .await
            .unwrap();
        assert_eq!(updated.summary.as_deref(), Some("Renamed"));
    }

    #[tokio::test]
    async fn test_delete_reports_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/missing"))
            .respond_with(ResponseTemplate::new(410).set_body_json(json!({
                "error": { "code": 410, "message": "Resource has been deleted" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).delete_event("missing").await.unwrap_err();
        match err {
            CalendarError::Api { status, message } => {
                assert_eq!(status, 410);
                assert_eq!(message, "Resource has been deleted");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_response_fails_decoding() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "no id" })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .insert_event(&NewCalendarEvent {
                summary: "x".to_string(),
                description: None,
                start: EventDateTime::timed("2024-01-01T09:00:00Z", "UTC"),
                end: EventDateTime::timed("2024-01-01T10:00:00Z", "UTC"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CalendarError::Decode(_)));
    }
}
