//! Domain models for the skill router
//!
//! This module contains the core types shared by the matchers, the
//! dispatcher and the formatter:
//! - Intent identifiers
//! - Skill payloads (weather, news, encyclopedia, calculation, conversion, translation)
//! - The uniform dispatch `Envelope`
//! - Conversation turns handed to the language model

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SkillError;

// ============================================================================
// Intents
// ============================================================================

/// Intent types recognised by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Weather,
    News,
    Encyclopedia,
    Calculator,
    Currency,
    Translator,
    LanguageModel,
}

impl Intent {
    /// Stable snake_case name, also used as the `type` of chat responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Weather => "weather",
            Intent::News => "news",
            Intent::Encyclopedia => "encyclopedia",
            Intent::Calculator => "calculator",
            Intent::Currency => "currency",
            Intent::Translator => "translator",
            Intent::LanguageModel => "language_model",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Skill Payloads
// ============================================================================

/// Current conditions returned by the weather collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    pub city: String,
    /// Degrees Celsius, rounded
    pub temperature: i32,
    pub feels_like: i32,
    pub description: String,
    /// Relative humidity in percent
    pub humidity: u32,
    /// Metres per second
    pub wind_speed: f64,
    /// hPa
    pub pressure: u32,
}

/// A single headline returned by the news collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    pub url: String,

    /// ISO 8601 timestamp as reported by the provider
    #[serde(rename = "publishedAt")]
    pub published_at: String,
}

/// Summary of an encyclopedia article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncyclopediaEntry {
    pub title: String,
    pub summary: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub expression: String,
    pub result: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub result: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub original: String,
    pub translation: String,
}

/// Intent-specific structured result carried by an envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Weather(WeatherInfo),
    News(Vec<NewsArticle>),
    Encyclopedia(EncyclopediaEntry),
    Calculation(Calculation),
    Conversion(Conversion),
    Translation(Translation),
}

// ============================================================================
// Envelope
// ============================================================================

/// Uniform result of dispatching one message
///
/// A `LanguageModel` envelope never carries a payload, a message or an
/// error: the caller owns the model call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub intent: Intent,
    pub payload: Option<Payload>,
    pub message: Option<String>,
    pub is_error: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl Envelope {
    /// Successful skill result; the message is rendered from the payload
    pub fn success(intent: Intent, payload: Payload) -> Self {
        let mut envelope = Self {
            intent,
            payload: Some(payload),
            message: None,
            is_error: false,
            error_detail: None,
        };
        envelope.message = Some(crate::format::format(&envelope));
        envelope
    }

    /// Failed skill; the message is the plain error text
    pub fn failure(intent: Intent, error: &SkillError) -> Self {
        let detail = error.to_string();
        Self {
            intent,
            payload: None,
            message: Some(detail.clone()),
            is_error: true,
            error_detail: Some(detail),
        }
    }

    /// No skill matched; defer to the language model
    pub fn defer() -> Self {
        Self {
            intent: Intent::LanguageModel,
            payload: None,
            message: None,
            is_error: false,
            error_detail: None,
        }
    }

    pub fn is_deferred(&self) -> bool {
        self.intent == Intent::LanguageModel
    }
}

// ============================================================================
// Conversation Turns
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of the conversation handed to the language model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
