//! Language model clients
//!
//! `ResponsesModelClient` talks to any OpenAI-compatible Responses API.
//! `KeywordResponder` is the offline stand-in used when no endpoint is
//! configured.

use anyhow::{anyhow, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collaborators::ModelClient;
use crate::config::ModelSettings;
use crate::types::{ChatTurn, Role};

/// Model client for the given settings: HTTP when an endpoint is set,
/// otherwise the keyword responder
pub fn model_from_config(settings: &ModelSettings, client: Client) -> Box<dyn ModelClient> {
    match settings.base_url.as_deref() {
        Some(url) if !url.trim().is_empty() => Box::new(ResponsesModelClient::new(client, settings, url)),
        _ => Box::new(KeywordResponder),
    }
}

// ============================================================================
// Responses API
// ============================================================================

/// Request body for the Responses API (internal)
#[derive(Serialize)]
struct ResponsesApiRequest {
    model: String,
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
}

/// Response from the Responses API
#[derive(Deserialize, Debug)]
struct ResponsesApiResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(default)]
    output_text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentItem>,
}

#[derive(Deserialize, Debug)]
struct ContentItem {
    #[serde(default)]
    text: Option<String>,
}

pub struct ResponsesModelClient {
    client: Client,
    base_url: String,
    model: String,
    instructions: Option<String>,
}

impl ResponsesModelClient {
    pub fn new(client: Client, settings: &ModelSettings, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            instructions: settings.instructions.clone(),
        }
    }

    /// System turns become instructions; the rest is flattened into a
    /// role-labelled transcript
    fn build_request(&self, turns: &[ChatTurn]) -> ResponsesApiRequest {
        let mut instructions: Vec<&str> = self.instructions.iter().map(String::as_str).collect();
        let mut transcript = Vec::new();

        for turn in turns {
            match turn.role {
                Role::System => instructions.push(&turn.content),
                Role::User => transcript.push(format!("USER:\n{}", turn.content)),
                Role::Assistant => transcript.push(format!("ASSISTANT:\n{}", turn.content)),
            }
        }

        ResponsesApiRequest {
            model: self.model.clone(),
            input: transcript.join("\n\n"),
            instructions: if instructions.is_empty() {
                None
            } else {
                Some(instructions.join("\n\n"))
            },
        }
    }
}

impl ModelClient for ResponsesModelClient {
    fn generate(&self, turns: &[ChatTurn]) -> Result<String> {
        let request = self.build_request(turns);

        debug!(url = %self.base_url, model = %self.model, "Calling language model");

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .json(&request)
            .send()
            .map_err(|e| anyhow!("LLM request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(anyhow!("LLM error {}: {}", status, body));
        }

        let resp: ResponsesApiResponse = response
            .json()
            .map_err(|e| anyhow!("Failed to parse LLM response: {}", e))?;

        extract_text_from_response(&resp)
    }
}

/// Extract text content from Responses API response
fn extract_text_from_response(resp: &ResponsesApiResponse) -> Result<String> {
    let mut chunks = Vec::new();

    for item in &resp.output {
        for content in &item.content {
            if let Some(ref text) = content.text {
                chunks.push(text.clone());
            }
        }
    }

    // Fallback to output_text if no content found
    if chunks.is_empty() {
        if let Some(ref text) = resp.output_text {
            chunks.push(text.clone());
        }
    }

    if chunks.is_empty() {
        return Err(anyhow!("No text found in LLM response"));
    }

    Ok(chunks.join("\n").trim().to_string())
}

// ============================================================================
// Offline responder
// ============================================================================

/// Canned replies, checked in order against the last user turn
const CANNED_REPLIES: &[(&str, &str)] = &[
    ("привет", "Привет! Как дела? Рад тебя видеть! 😊"),
    ("как дела", "Отлично, спасибо! А у тебя как дела?"),
    (
        "анекдот",
        "Программист заходит в лифт, а там написано \"JS\" и со стрелкой вниз. Программист подумал: \"О, JavaScript!\" 😄",
    ),
    (
        "стихотворение",
        "В мире кода и алгоритмов\nГде логика правит бал\nКаждая строка как символ\nВеликого цифрового храма",
    ),
    (
        "искусственный интеллект",
        "Искусственный интеллект - это технология, которая позволяет компьютерам обучаться и принимать решения, имитируя человеческое мышление.",
    ),
    (
        "помощь",
        "Я могу помочь с погодой, новостями, Wikipedia, калькулятором, конвертером валют и переводом!",
    ),
    ("спасибо", "Пожалуйста! Рад помочь! 😊"),
    ("пока", "До свидания! Было приятно пообщаться! 👋"),
];

const DEFAULT_REPLY: &str = "Интересный вопрос! Я - AI помощник, и я могу помочь с различными задачами. Попробуй спросить о погоде, новостях или других функциях!";

/// Keyword-based replies without any model
pub struct KeywordResponder;

impl ModelClient for KeywordResponder {
    fn generate(&self, turns: &[ChatTurn]) -> Result<String> {
        let last_user = turns
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.to_lowercase())
            .unwrap_or_default();

        let reply = CANNED_REPLIES
            .iter()
            .find(|(key, _)| last_user.contains(key))
            .map(|(_, reply)| *reply)
            .unwrap_or(DEFAULT_REPLY);

        Ok(reply.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn settings() -> ModelSettings {
        ModelSettings {
            model: "test-model".to_string(),
            instructions: Some("Отвечай кратко.".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_request_splits_system_turns() {
        let client = ResponsesModelClient::new(Client::new(), &settings(), "http://localhost/v1/");
        let request = client.build_request(&[
            ChatTurn::system("Ты помощник."),
            ChatTurn::user("привет"),
            ChatTurn::assistant("Здравствуйте"),
            ChatTurn::user("как дела"),
        ]);

        assert_eq!(request.model, "test-model");
        assert_eq!(
            request.instructions.as_deref(),
            Some("Отвечай кратко.\n\nТы помощник.")
        );
        assert_eq!(
            request.input,
            "USER:\nпривет\n\nASSISTANT:\nЗдравствуйте\n\nUSER:\nкак дела"
        );
        assert_eq!(client.base_url, "http://localhost/v1");
    }

    #[test]
    fn test_generate_reads_output_content() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/responses")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "test-model",
                "input": "USER:\nрасскажи сказку"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"resp_1","output":[{"content":[{"text":"  Жили-были...  "}]}]}"#)
            .create();

        let base = format!("{}/v1", server.url());
        let client = ResponsesModelClient::new(Client::new(), &settings(), &base);
        let text = client.generate(&[ChatTurn::user("расскажи сказку")]).unwrap();

        mock.assert();
        assert_eq!(text, "Жили-были...");
    }

    #[test]
    fn test_generate_server_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/responses")
            .with_status(503)
            .with_body("loading")
            .create();

        let client = ResponsesModelClient::new(Client::new(), &settings(), &server.url());
        let err = client.generate(&[ChatTurn::user("привет")]).unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_extract_text_falls_back_to_output_text() {
        let resp: ResponsesApiResponse =
            serde_json::from_str(r#"{"output":[],"output_text":"ответ"}"#).unwrap();
        assert_eq!(extract_text_from_response(&resp).unwrap(), "ответ");

        let empty: ResponsesApiResponse = serde_json::from_str(r#"{"output":[]}"#).unwrap();
        assert!(extract_text_from_response(&empty).is_err());
    }

    #[test]
    fn test_keyword_responder() {
        let reply = KeywordResponder
            .generate(&[ChatTurn::user("Привет, бот")])
            .unwrap();
        assert!(reply.starts_with("Привет! Как дела?"));

        let reply = KeywordResponder
            .generate(&[ChatTurn::user("сколько звёзд на небе")])
            .unwrap();
        assert_eq!(reply, DEFAULT_REPLY);
    }

    #[test]
    fn test_model_from_config() {
        let offline = model_from_config(&ModelSettings::default(), Client::new());
        assert!(offline.is_ready());
        let reply = offline.generate(&[ChatTurn::user("помощь")]).unwrap();
        assert!(reply.contains("калькулятором"));
    }
}
