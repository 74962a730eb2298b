use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use super::{required, ErrorResponse};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMemoryRequest {
    pub key: Option<String>,
    pub value: Option<String>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/memories")
            .route(web::get().to(list_memories))
            .route(web::post().to(create_memory)),
    );
}

async fn create_memory(
    state: web::Data<AppState>,
    body: web::Json<CreateMemoryRequest>,
) -> impl Responder {
    let (key, value) = match (required(&body.key), required(&body.value)) {
        (Some(k), Some(v)) => (k, v),
        _ => return HttpResponse::BadRequest().json(ErrorResponse::new("key and value required")),
    };

    match state.db.create_memory(&key, &value) {
        Ok(memory) => HttpResponse::Ok().json(memory),
        Err(e) => {
            log::error!("[MEMORIES] Failed to save memory: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to save memory"))
        }
    }
}

async fn list_memories(state: web::Data<AppState>) -> impl Responder {
    match state.db.list_memories(None) {
        Ok(memories) => HttpResponse::Ok().json(memories),
        Err(e) => {
            log::error!("[MEMORIES] Failed to list memories: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to retrieve memories"))
        }
    }
}
