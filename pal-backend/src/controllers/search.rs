use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use super::{required, ErrorResponse};
use crate::integrations::search::SearchClient;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/search").route(web::get().to(search)));
}

async fn search(state: web::Data<AppState>, query: web::Query<SearchQuery>) -> impl Responder {
    let q = match required(&query.q) {
        Some(q) => q,
        None => return HttpResponse::BadRequest().json(ErrorResponse::new("q required")),
    };

    let client = match SearchClient::new(&state.config.search_api_url) {
        Ok(c) => c,
        Err(e) => {
            log::error!("[SEARCH] {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new(e));
        }
    };

    match client.search(&q).await {
        Ok(results) => HttpResponse::Ok().json(results),
        Err(e) => {
            log::error!("[SEARCH] {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(e))
        }
    }
}
