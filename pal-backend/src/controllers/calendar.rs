use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{required, ErrorResponse};
use crate::integrations::google::{
    CalendarClient, CalendarError, CalendarProvider, EventDateTime, NewCalendarEvent,
};
use crate::AppState;

/// Default list window when `timeMax` is omitted
const DEFAULT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Serialize)]
struct CalendarErrorResponse {
    error: String,
    code: &'static str,
}

#[derive(Debug, Serialize)]
struct CalendarStatus {
    configured: bool,
    connected: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub time_min: Option<String>,
    pub time_max: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: Option<String>,
    pub timezone: Option<String>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/calendar")
            .route("/status", web::get().to(status))
            .route("/list", web::get().to(list_events))
            .route("/create", web::post().to(create_event))
            .route("/update/{id}", web::patch().to(update_event))
            .route("/delete/{id}", web::delete().to(delete_event)),
    );
}

fn calendar_error(e: CalendarError) -> HttpResponse {
    log::error!("[CALENDAR] {}", e);
    HttpResponse::InternalServerError().json(CalendarErrorResponse {
        error: e.to_string(),
        code: e.code(),
    })
}

fn client_for(state: &AppState) -> Result<CalendarClient, CalendarError> {
    CalendarProvider::new(&state.config, state.db.clone()).get_client()
}

fn parse_instant(field: &str, value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("{} must be an RFC 3339 timestamp", field))
}

async fn status(state: web::Data<AppState>) -> impl Responder {
    let provider = CalendarProvider::new(&state.config, state.db.clone());
    match provider.is_connected() {
        Ok(connected) => HttpResponse::Ok().json(CalendarStatus {
            configured: state.config.google_enabled(),
            connected,
        }),
        Err(e) => calendar_error(e),
    }
}

async fn list_events(state: web::Data<AppState>, query: web::Query<ListQuery>) -> impl Responder {
    let time_min = match query.time_min.as_deref() {
        Some(v) => match parse_instant("timeMin", v) {
            Ok(t) => t,
            Err(msg) => return HttpResponse::BadRequest().json(ErrorResponse::new(msg)),
        },
        None => Utc::now(),
    };
    let time_max = match query.time_max.as_deref() {
        Some(v) => match parse_instant("timeMax", v) {
            Ok(t) => t,
            Err(msg) => return HttpResponse::BadRequest().json(ErrorResponse::new(msg)),
        },
        None => time_min + Duration::days(DEFAULT_WINDOW_DAYS),
    };

    let client = match client_for(&state) {
        Ok(c) => c,
        Err(e) => return calendar_error(e),
    };

    match client.list_events(time_min, time_max).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => calendar_error(e),
    }
}

async fn create_event(
    state: web::Data<AppState>,
    body: web::Json<CreateEventRequest>,
) -> impl Responder {
    let (title, start, end) = match (
        required(&body.title),
        required(&body.start),
        required(&body.end),
    ) {
        (Some(t), Some(s), Some(e)) => (t, s, e),
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse::new("title, start, end required"));
        }
    };

    let start_at = match parse_instant("start", &start) {
        Ok(t) => t,
        Err(msg) => return HttpResponse::BadRequest().json(ErrorResponse::new(msg)),
    };
    let end_at = match parse_instant("end", &end) {
        Ok(t) => t,
        Err(msg) => return HttpResponse::BadRequest().json(ErrorResponse::new(msg)),
    };
    if end_at < start_at {
        return HttpResponse::BadRequest().json(ErrorResponse::new("end must not be before start"));
    }

    let timezone = required(&body.timezone).unwrap_or_else(|| state.config.default_timezone.clone());
    let event = NewCalendarEvent {
        summary: title,
        description: required(&body.description),
        start: EventDateTime::timed(&start, &timezone),
        end: EventDateTime::timed(&end, &timezone),
    };

    let client = match client_for(&state) {
        Ok(c) => c,
        Err(e) => return calendar_error(e),
    };

    match client.insert_event(&event).await {
        Ok(created) => HttpResponse::Ok().json(created),
        Err(e) => calendar_error(e),
    }
}

async fn update_event(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> impl Responder {
    let event_id = path.into_inner();

    let client = match client_for(&state) {
        Ok(c) => c,
        Err(e) => return calendar_error(e),
    };

    match client.patch_event(&event_id, &body).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => calendar_error(e),
    }
}

async fn delete_event(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let event_id = path.into_inner();

    let client = match client_for(&state) {
        Ok(c) => c,
        Err(e) => return calendar_error(e),
    };

    match client.delete_event(&event_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => calendar_error(e),
    }
}
