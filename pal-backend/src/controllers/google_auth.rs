use actix_web::{http::header, web, HttpResponse, Responder};
use serde::Deserialize;

use super::ErrorResponse;
use crate::integrations::google::OAuthClient;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/auth/google").route(web::get().to(begin_authorization)))
        .service(web::resource("/oauth2callback").route(web::get().to(oauth_callback)));
}

async fn begin_authorization(state: web::Data<AppState>) -> impl Responder {
    let client = match OAuthClient::from_config(&state.config) {
        Some(c) => c,
        None => {
            return HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Google OAuth not configured. Set GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_REDIRECT_URI.",
            ));
        }
    };

    match client.authorization_url() {
        Ok(url) => {
            log::info!("[OAUTH] Redirecting to Google consent screen");
            HttpResponse::Found()
                .insert_header((header::LOCATION, url))
                .finish()
        }
        Err(e) => {
            log::error!("[OAUTH] Invalid authorization URL: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new("Invalid GOOGLE_AUTH_URL"))
        }
    }
}

async fn oauth_callback(
    state: web::Data<AppState>,
    query: web::Query<CallbackQuery>,
) -> impl Responder {
    if let Some(error) = &query.error {
        log::warn!("[OAUTH] Authorization was not granted: {}", error);
        return HttpResponse::BadRequest().json(ErrorResponse::new(format!(
            "Authorization was not granted: {}",
            error
        )));
    }

    let code = match query.code.as_deref().filter(|c| !c.is_empty()) {
        Some(c) => c,
        None => return HttpResponse::BadRequest().json(ErrorResponse::new("Missing code")),
    };

    let client = match OAuthClient::from_config(&state.config) {
        Some(c) => c,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse::new("Google OAuth client not configured"));
        }
    };

    let tokens = match client.exchange_code(code).await {
        Ok(t) => t,
        Err(e) => {
            log::error!("[OAUTH] Code exchange failed: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new(format!("Token exchange failed: {}", e)));
        }
    };

    if tokens.refresh_token.is_none() {
        log::warn!("[OAUTH] Google did not return a refresh token; keeping any stored one");
    }

    match state.db.save_google_credential(&tokens.to_credential()) {
        Ok(_) => {
            log::info!("[OAUTH] Google Calendar connected");
            HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body("<!doctype html><html><body><h1>Google Calendar connected</h1><p>You can close this tab and return to the app.</p><p><a href=\"/\">Back</a></p></body></html>")
        }
        Err(e) => {
            log::error!("[OAUTH] Failed to store tokens: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to store tokens"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::controllers::test_support::app_state;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn oauth_config(token_url: &str) -> Config {
        Config {
            google_client_id: Some("client-id".to_string()),
            google_client_secret: Some("client-secret".to_string()),
            google_redirect_uri: Some("http://localhost:3000/oauth2callback".to_string()),
            google_token_url: token_url.to_string(),
            ..Config::default()
        }
    }

    #[actix_web::test]
    async fn test_begin_redirects_to_consent() {
        let state = app_state(oauth_config("http://127.0.0.1:9/token"));
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let req = test::TestRequest::get().uri("/auth/google").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);

        let location = resp.headers().get(header::LOCATION).unwrap().to_str().unwrap();
        assert!(location.contains("access_type=offline"));
        assert!(location.contains("prompt=consent"));
    }

    #[actix_web::test]
    async fn test_begin_without_config_is_500() {
        let app = test::init_service(
            App::new().app_data(app_state(Config::default())).configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/auth/google").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_callback_without_code_is_400() {
        let state = app_state(oauth_config("http://127.0.0.1:9/token"));
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let req = test::TestRequest::get().uri("/oauth2callback").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_callback_without_client_is_400() {
        let app = test::init_service(
            App::new().app_data(app_state(Config::default())).configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/oauth2callback?code=abc").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_valid_code_populates_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("code=good-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-1",
                "refresh_token": "refresh-1",
                "expires_in": 3599,
                "scope": "https://www.googleapis.com/auth/calendar",
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = app_state(oauth_config(&format!("{}/token", server.uri())));
        assert!(!state.db.get_google_credential().unwrap().unwrap().has_access_token());

        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;
        let req = test::TestRequest::get().uri("/oauth2callback?code=good-code").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let stored = state.db.get_google_credential().unwrap().unwrap();
        assert_eq!(stored.access_token.as_deref(), Some("access-1"));
        assert_eq!(stored.refresh_token.as_deref(), Some("refresh-1"));
        assert_eq!(stored.token_type.as_deref(), Some("Bearer"));
        assert!(stored.expiry_date.is_some());
    }

    #[actix_web::test]
    async fn test_exchange_failure_leaves_credential_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant"
            })))
            .mount(&server)
            .await;

        let state = app_state(oauth_config(&format!("{}/token", server.uri())));
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let req = test::TestRequest::get().uri("/oauth2callback?code=expired").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!state.db.get_google_credential().unwrap().unwrap().has_access_token());
    }
}
