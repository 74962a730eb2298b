use crate::ai::ChatMessage;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OpenAICompletionRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAICompletionResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpenAIImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}

/// Raw provider reply, relayed to the caller unchanged
#[derive(Debug, Clone)]
pub struct PassthroughResponse {
    pub status: u16,
    pub body: Value,
}

impl OpenAIClient {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, String> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let auth_value = header::HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| format!("Invalid API key format: {}", e))?;
        headers.insert(header::AUTHORIZATION, auth_value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub async fn generate_text(&self, messages: Vec<ChatMessage>) -> Result<String, String> {
        let endpoint = format!("{}/chat/completions", self.base_url);

        let request = OpenAICompletionRequest {
            model: self.model.clone(),
            messages: messages
                .into_iter()
                .map(|m| OpenAIMessage {
                    role: m.role.to_string(),
                    content: m.content,
                })
                .collect(),
        };

        log::info!(
            "[OPENAI] Sending {} messages to {} with model {}",
            request.messages.len(),
            endpoint,
            self.model
        );

        let response = self
            .client
            .post(&endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("OpenAI API request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(&error_text) {
                return Err(format!("OpenAI API error: {}", error_response.error.message));
            }

            return Err(format!(
                "OpenAI API returned error status: {}, body: {}",
                status, error_text
            ));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| format!("Failed to read OpenAI response: {}", e))?;

        log::debug!("[OPENAI] Raw response:\n{}", response_text);

        let response_data: OpenAICompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| format!("Failed to parse OpenAI response: {}", e))?;

        let choice = response_data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| "OpenAI API returned no choices".to_string())?;

        log::info!(
            "[OPENAI] Response - content_len: {}, finish_reason: {:?}",
            choice.message.content.as_ref().map(|c| c.len()).unwrap_or(0),
            choice.finish_reason
        );

        Ok(choice.message.content.unwrap_or_default())
    }

    /// Request image generation with the client's model and hand back the
    /// provider's status and body as-is
    pub async fn generate_image(&self, prompt: &str, size: &str) -> Result<PassthroughResponse, String> {
        let endpoint = format!("{}/images/generations", self.base_url);
        log::info!("[OPENAI] Requesting image from {} with model {}", endpoint, self.model);

        let response = self
            .client
            .post(&endpoint)
            .json(&OpenAIImageRequest {
                model: &self.model,
                prompt,
                n: 1,
                size,
            })
            .send()
            .await
            .map_err(|e| format!("OpenAI image request failed: {}", e))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| format!("Failed to read OpenAI response: {}", e))?;

        // Non-JSON bodies are wrapped so the caller still gets JSON
        let body = serde_json::from_str(&text)
            .unwrap_or_else(|_| serde_json::json!({ "error": { "message": text } }));

        Ok(PassthroughResponse { status, body })
    }
}
