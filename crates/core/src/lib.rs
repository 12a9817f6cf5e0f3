//! Skill Router Core Library
//!
//! Routes free-form chat messages to built-in skills:
//! - Intent matching in a fixed priority order
//! - Skill handlers (weather, news, encyclopedia, calculator, currency, translator)
//! - Uniform dispatch envelopes and their rendered messages
//! - HTTP collaborators with offline demo fallbacks
//! - Language model clients and the chat layer around the dispatcher

pub mod types;
pub mod error;
pub mod config;

pub mod calculator;
pub mod currency;
pub mod translator;

pub mod intent;
pub mod router;
pub mod format;

pub mod collaborators;
pub mod encyclopedia;
pub mod news;
pub mod weather;
pub mod llm;

pub mod chat;

// Re-export commonly used types at crate root
pub use types::{
    Calculation, ChatTurn, Conversion, EncyclopediaEntry, Envelope, Intent, NewsArticle, Payload,
    Role, Translation, WeatherInfo,
};
pub use error::{ExpressionError, SkillError, Subsystem};
pub use config::Config;

pub use chat::{respond, status, ChatError, ChatResponse, StatusReport};
pub use collaborators::{Collaborators, ModelClient};
pub use router::Dispatcher;
