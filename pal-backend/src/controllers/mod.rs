pub mod calendar;
pub mod chat;
pub mod events;
pub mod google_auth;
pub mod health;
pub mod images;
pub mod memories;
pub mod messages;
pub mod search;

use actix_web::{error, web, HttpResponse};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

/// Trimmed value of a request field, or None when absent or blank
pub fn required(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// JSON extractor config answering malformed bodies with `{error}` instead of plain text
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = format!("Invalid JSON body: {}", err);
        let response = HttpResponse::BadRequest().json(ErrorResponse::new(message));
        error::InternalError::from_response(err, response).into()
    })
}
