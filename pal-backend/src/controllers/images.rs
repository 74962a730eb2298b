use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use serde::Deserialize;

use super::{required, ErrorResponse};
use crate::ai::OpenAIClient;
use crate::AppState;

const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub prompt: Option<String>,
    pub size: Option<String>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/images").route(web::post().to(generate_image)));
}

async fn generate_image(state: web::Data<AppState>, body: web::Json<ImageRequest>) -> impl Responder {
    let prompt = match required(&body.prompt) {
        Some(p) => p,
        None => return HttpResponse::BadRequest().json(ErrorResponse::new("prompt required")),
    };

    let api_key = match &state.config.openai_api_key {
        Some(key) => key,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse::new("OPENAI_API_KEY not configured"));
        }
    };

    let size = required(&body.size).unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string());

    let client = match OpenAIClient::new(api_key, &state.config.openai_base_url, &state.config.openai_image_model) {
        Ok(c) => c,
        Err(e) => {
            log::error!("[IMAGES] {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new(e));
        }
    };

    match client.generate_image(&prompt, &size).await {
        Ok(response) => {
            let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
            if !status.is_success() {
                log::warn!("[IMAGES] Provider answered with {}", status);
            }
            HttpResponse::build(status).json(response.body)
        }
        Err(e) => {
            log::error!("[IMAGES] {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(e))
        }
    }
}
