// Completion client for the chat-completions wire format

use std::time::Duration;

use reqwest::ClientBuilder;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::NlshError;
use crate::prompts;

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Send the natural-language request to the completion provider and
/// return the raw response text for the parser.
pub async fn request_command(config: &Config, natural_language: &str) -> Result<String, NlshError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .build()
        .map_err(|e| NlshError::Provider(format!("failed to create HTTP client: {}", e)))?;

    let payload = ChatRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: prompts::SYSTEM_INSTRUCTIONS.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: prompts::build_request_prompt(natural_language),
            },
        ],
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };

    let response = client
        .post(&config.api_base)
        .bearer_auth(&config.api_key)
        .json(&payload)
        .send()
        .await
        .map_err(|e| {
            if e.is_connect() {
                NlshError::Provider(format!(
                    "failed to connect to {}. Check your network connection",
                    config.api_base
                ))
            } else if e.is_timeout() {
                NlshError::Provider("request to the completion API timed out".to_string())
            } else {
                NlshError::Provider(format!("failed to send request: {}", e))
            }
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());

        let message = match status.as_u16() {
            401 => format!(
                "authentication failed (HTTP 401). Check that OPENAI_API_KEY is valid: {}",
                error_text
            ),
            404 => format!(
                "model '{}' not found (HTTP 404). Check the configured model name: {}",
                config.model, error_text
            ),
            429 => format!("rate limited or out of credits (HTTP 429): {}", error_text),
            500..=599 => format!("provider server error (HTTP {}): {}", status, error_text),
            _ => format!("request failed with HTTP {}: {}", status, error_text),
        };

        return Err(NlshError::Provider(message));
    }

    let chat_response = response
        .json::<ChatResponse>()
        .await
        .map_err(|e| NlshError::Provider(format!("malformed completion response: {}", e)))?;

    chat_response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| NlshError::Provider("completion response contained no choices".to_string()))
}
