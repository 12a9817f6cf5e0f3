//! Error taxonomy for skill handlers
//!
//! Every failure inside a handler is turned into an error `Envelope`; the
//! `Display` text of these errors is exactly what the user sees.

use thiserror::Error;

/// External lookup that a skill delegates to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    Weather,
    News,
    Encyclopedia,
}

impl Subsystem {
    /// User-facing failure text for this subsystem
    pub fn failure_message(&self) -> &'static str {
        match self {
            Subsystem::Weather => "Не удалось получить прогноз погоды",
            Subsystem::News => "Не удалось получить новости",
            Subsystem::Encyclopedia => "Не удалось найти информацию в Wikipedia",
        }
    }
}

/// Why an arithmetic expression was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("Недопустимые символы в выражении")]
    DisallowedCharacters,

    #[error("Несбалансированные скобки")]
    UnbalancedParentheses,

    #[error("Результат слишком большой")]
    NonFinite,

    #[error("Ошибка вычисления: деление на ноль")]
    DivisionByZero,

    #[error("Ошибка вычисления: {0}")]
    Syntax(String),
}

/// Failure of a matched skill
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkillError {
    #[error("{}", .0.failure_message())]
    CollaboratorUnavailable(Subsystem),

    #[error(transparent)]
    InvalidExpression(#[from] ExpressionError),

    #[error("Не удалось конвертировать валюту")]
    UnsupportedConversion { from: String, to: String },
}
