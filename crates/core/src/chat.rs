//! Chat layer
//!
//! Turns one user message into the `{type, message, data, timestamp}`
//! response shown to the user. Skill intents come straight from the
//! dispatcher; deferred messages are answered by the language model.

use chrono::Local;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::collaborators::ModelClient;
use crate::router::Dispatcher;
use crate::types::{ChatTurn, Envelope, Payload};

const MODEL_LOADING: &str = "Модель еще загружается. Пожалуйста, подождите немного...";
const MODEL_FAILED: &str = "Извините, произошла ошибка при генерации ответа.";

/// Response type of error envelopes
pub const ERROR_TYPE: &str = "error";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChatError {
    #[error("Сообщение не может быть пустым")]
    EmptyMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResponse {
    /// Intent name, or `"error"` for failed skills
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Payload>,
    /// RFC 3339 local time
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub model_loaded: bool,
    pub timestamp: String,
}

/// Answer a single message
///
/// Only the empty string is rejected; whitespace-only input goes through
/// the dispatcher and ends up with the language model.
pub fn respond(
    dispatcher: &Dispatcher,
    model: &dyn ModelClient,
    message: &str,
) -> Result<ChatResponse, ChatError> {
    if message.is_empty() {
        return Err(ChatError::EmptyMessage);
    }

    let envelope = dispatcher.dispatch(message);

    if envelope.is_deferred() {
        let reply = generate_reply(model, message);
        return Ok(ChatResponse {
            kind: envelope.intent.to_string(),
            message: reply,
            data: None,
            timestamp: now(),
        });
    }

    Ok(from_envelope(envelope))
}

pub fn status(model: &dyn ModelClient) -> StatusReport {
    StatusReport {
        model_loaded: model.is_ready(),
        timestamp: now(),
    }
}

fn generate_reply(model: &dyn ModelClient, message: &str) -> String {
    if !model.is_ready() {
        return MODEL_LOADING.to_string();
    }

    debug!("Deferring message to the language model");
    match model.generate(&[ChatTurn::user(message)]) {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "Language model failed");
            MODEL_FAILED.to_string()
        }
    }
}

fn from_envelope(envelope: Envelope) -> ChatResponse {
    let message = envelope.message.unwrap_or_default();

    if envelope.is_error {
        return ChatResponse {
            kind: ERROR_TYPE.to_string(),
            message,
            data: None,
            timestamp: now(),
        };
    }

    ChatResponse {
        kind: envelope.intent.to_string(),
        message,
        data: envelope.payload,
        timestamp: now(),
    }
}

fn now() -> String {
    Local::now().to_rfc3339()
}
