use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use super::{required, ErrorResponse};
use crate::ai::{ChatMessage, OpenAIClient};
use crate::models::{Memory, MessageRole};
use crate::AppState;

/// How many memories are folded into the system prompt
const MEMORY_CONTEXT_LIMIT: usize = 50;
/// How many previous transcript messages are sent as history
const HISTORY_LIMIT: usize = 20;

pub const NOT_CONFIGURED_REPLY: &str = "Set OPENAI_API_KEY in your environment to enable chat.";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/chat").route(web::post().to(chat)));
}

fn build_system_prompt(memories: &[Memory]) -> String {
    let mut prompt = String::from(
        "You are a helpful personal assistant. Answer concisely and use what you know about the user when relevant.",
    );

    if !memories.is_empty() {
        prompt.push_str("\n\nThings you know about the user:");
        for memory in memories {
            prompt.push_str(&format!("\n- {}: {}", memory.key, memory.value));
        }
    }

    prompt
}

async fn chat(state: web::Data<AppState>, body: web::Json<ChatRequest>) -> impl Responder {
    let message = match required(&body.message) {
        Some(m) => m,
        None => return HttpResponse::BadRequest().json(ErrorResponse::new("message required")),
    };

    let memories = match state.db.list_memories(Some(MEMORY_CONTEXT_LIMIT)) {
        Ok(m) => m,
        Err(e) => {
            log::error!("[CHAT] Failed to load memories: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to load memories"));
        }
    };

    // History is read before the new message is written so it is not sent twice
    let history = match state.db.recent_messages(HISTORY_LIMIT) {
        Ok(h) => h,
        Err(e) => {
            log::error!("[CHAT] Failed to load history: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to load history"));
        }
    };

    if let Err(e) = state.db.add_message(MessageRole::User, &message) {
        log::error!("[CHAT] Failed to save user message: {}", e);
        return HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to save message"));
    }

    let api_key = match &state.config.openai_api_key {
        Some(key) => key,
        None => {
            return HttpResponse::Ok().json(ChatResponse {
                reply: NOT_CONFIGURED_REPLY.to_string(),
            });
        }
    };

    let client = match OpenAIClient::new(api_key, &state.config.openai_base_url, &state.config.openai_model) {
        Ok(c) => c,
        Err(e) => {
            log::error!("[CHAT] {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new(e));
        }
    };

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::new(MessageRole::System, build_system_prompt(&memories)));
    messages.extend(history.into_iter().map(|m| ChatMessage::new(m.role, m.content)));
    messages.push(ChatMessage::new(MessageRole::User, message));

    let reply = match client.generate_text(messages).await {
        Ok(r) => r,
        Err(e) => {
            log::error!("[CHAT] Upstream failure: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new(e));
        }
    };

    if let Err(e) = state.db.add_message(MessageRole::Assistant, &reply) {
        log::error!("[CHAT] Failed to save assistant reply: {}", e);
        return HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to save reply"));
    }

    HttpResponse::Ok().json(ChatResponse { reply })
}
