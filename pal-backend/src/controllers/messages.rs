use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use super::ErrorResponse;
use crate::AppState;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<usize>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/messages").route(web::get().to(list_messages)));
}

async fn list_messages(
    state: web::Data<AppState>,
    query: web::Query<MessagesQuery>,
) -> impl Responder {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    match state.db.recent_messages(limit) {
        Ok(messages) => HttpResponse::Ok().json(messages),
        Err(e) => {
            log::error!("Failed to list messages: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to retrieve messages"))
        }
    }
}
