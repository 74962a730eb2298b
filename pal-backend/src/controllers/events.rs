use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use super::{required, ErrorResponse};
use crate::models::NewLocalEvent;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub timezone: Option<String>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/events")
            .route(web::get().to(list_events))
            .route(web::post().to(create_event)),
    );
}

async fn create_event(
    state: web::Data<AppState>,
    body: web::Json<CreateEventRequest>,
) -> impl Responder {
    let body = body.into_inner();
    let (title, start) = match (required(&body.title), required(&body.start)) {
        (Some(t), Some(s)) => (t, s),
        _ => return HttpResponse::BadRequest().json(ErrorResponse::new("title and start required")),
    };

    let event = NewLocalEvent {
        title,
        start,
        end: body.end,
        description: body.description,
        timezone: body.timezone,
    };

    match state.db.create_local_event(&event) {
        Ok(event) => HttpResponse::Ok().json(event),
        Err(e) => {
            log::error!("[EVENTS] Failed to save event: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to save event"))
        }
    }
}

async fn list_events(state: web::Data<AppState>) -> impl Responder {
    match state.db.list_local_events() {
        Ok(events) => HttpResponse::Ok().json(events),
        Err(e) => {
            log::error!("[EVENTS] Failed to list events: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to retrieve events"))
        }
    }
}
