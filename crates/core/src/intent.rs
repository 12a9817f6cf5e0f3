//! Intent Matchers
//!
//! Keyword and regex detectors, one per skill. Each matcher decides whether
//! a message belongs to its intent and extracts that intent's parameters.
//! Matchers are tried in a fixed priority order and the first one that
//! fires wins, so overlapping triggers resolve by position in the list.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::RoutingSettings;
use crate::currency::normalize_unit;
use crate::types::Intent;

// ============================================================================
// Message and Params
// ============================================================================

/// Input text as seen by the matchers
#[derive(Debug, Clone)]
pub struct Message<'a> {
    raw: &'a str,
    lower: String,
}

impl<'a> Message<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            lower: raw.to_lowercase(),
        }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn lower(&self) -> &str {
        &self.lower
    }
}

/// Parameters extracted for a matched intent
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    Weather { city: String },
    News { topic: String },
    Encyclopedia { query: String },
    Calculator { expression: String },
    Currency { amount: f64, from: String, to: String },
    Translator { text: String },
}

impl Params {
    pub fn intent(&self) -> Intent {
        match self {
            Params::Weather { .. } => Intent::Weather,
            Params::News { .. } => Intent::News,
            Params::Encyclopedia { .. } => Intent::Encyclopedia,
            Params::Calculator { .. } => Intent::Calculator,
            Params::Currency { .. } => Intent::Currency,
            Params::Translator { .. } => Intent::Translator,
        }
    }
}

// ============================================================================
// Matcher trait
// ============================================================================

/// Detector for a single intent
///
/// `extract` returns `Some` exactly when `matches` is true.
pub trait IntentMatcher: Send + Sync {
    fn intent(&self) -> Intent;

    fn matches(&self, message: &Message<'_>) -> bool {
        self.extract(message).is_some()
    }

    fn extract(&self, message: &Message<'_>) -> Option<Params>;
}

/// Built-in matchers in priority order:
/// weather → news → encyclopedia → calculator → currency → translator
pub fn default_matchers(settings: &RoutingSettings) -> Vec<Box<dyn IntentMatcher>> {
    vec![
        Box::new(WeatherMatcher::new(&settings.default_city)),
        Box::new(NewsMatcher::new(&settings.news_topic)),
        Box::new(EncyclopediaMatcher),
        Box::new(CalculatorMatcher),
        Box::new(CurrencyMatcher),
        Box::new(TranslatorMatcher),
    ]
}

/// First extraction in list order, or `None` when the message should go to
/// the language model
pub fn classify(matchers: &[Box<dyn IntentMatcher>], message: &Message<'_>) -> Option<Params> {
    matchers.iter().find_map(|matcher| matcher.extract(message))
}

// ============================================================================
// Keyword and pattern tables
// ============================================================================

const WEATHER_KEYWORDS: &[&str] = &["погода", "погоду", "температура", "климат"];

const NEWS_KEYWORDS: &[&str] = &["новости", "новость", "события", "происшествия"];

const ENCYCLOPEDIA_PHRASES: &[&str] = &["что такое", "кто такой", "определение", "википедия"];

// NOTE: expect() is acceptable for these compile-time constant patterns
static ENCYCLOPEDIA_TRIGGERS: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = ENCYCLOPEDIA_PHRASES
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){}", alternation)).expect("Invalid regex: encyclopedia triggers")
});

static CALCULATOR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"посчитай\s+(.+)").expect("Invalid regex: посчитай"),
        Regex::new(r"вычисли\s+(.+)").expect("Invalid regex: вычисли"),
        Regex::new(r"сколько будет\s+(.+)").expect("Invalid regex: сколько будет"),
        Regex::new(r"вычислить\s+(.+)").expect("Invalid regex: вычислить"),
    ]
});

const CURRENCY_ALIASES: &str = "usd|rub|руб|рублей|доллар|долларов|eur|cny";

static CURRENCY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let amount = r"([0-9]+(?:\.[0-9]+)?)";
    vec![
        Regex::new(&format!(
            r"{amount}\s*({units})\s*(?:в|to)\s*({units})",
            amount = amount,
            units = CURRENCY_ALIASES
        ))
        .expect("Invalid regex: currency amount pattern"),
        Regex::new(&format!(
            r"конвертируй\s+{amount}\s*({units})\s*(?:в|to)\s*({units})",
            amount = amount,
            units = CURRENCY_ALIASES
        ))
        .expect("Invalid regex: конвертируй pattern"),
    ]
});

static TRANSLATOR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"переведи\s+(.+)").expect("Invalid regex: переведи"),
        Regex::new(r"перевод\s+(.+)").expect("Invalid regex: перевод"),
        Regex::new(r"translate\s+(.+)").expect("Invalid regex: translate"),
    ]
});

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Capture group 1 of the first pattern that matches
fn first_capture<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

// ============================================================================
// Matchers
// ============================================================================

pub struct WeatherMatcher {
    default_city: String,
}

impl WeatherMatcher {
    pub fn new(default_city: &str) -> Self {
        Self {
            default_city: default_city.to_string(),
        }
    }

    /// Token right after the first token that is exactly a keyword
    fn city_after_keyword(raw: &str) -> Option<String> {
        let words: Vec<&str> = raw.split_whitespace().collect();
        let idx = words
            .iter()
            .position(|w| WEATHER_KEYWORDS.contains(&w.to_lowercase().as_str()))?;
        words.get(idx + 1).map(|city| city.to_string())
    }
}

impl IntentMatcher for WeatherMatcher {
    fn intent(&self) -> Intent {
        Intent::Weather
    }

    fn matches(&self, message: &Message<'_>) -> bool {
        contains_any(message.lower(), WEATHER_KEYWORDS)
    }

    fn extract(&self, message: &Message<'_>) -> Option<Params> {
        if !self.matches(message) {
            return None;
        }

        let city = Self::city_after_keyword(message.raw())
            .unwrap_or_else(|| self.default_city.clone());
        Some(Params::Weather { city })
    }
}

pub struct NewsMatcher {
    topic: String,
}

impl NewsMatcher {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
        }
    }
}

impl IntentMatcher for NewsMatcher {
    fn intent(&self) -> Intent {
        Intent::News
    }

    fn matches(&self, message: &Message<'_>) -> bool {
        contains_any(message.lower(), NEWS_KEYWORDS)
    }

    fn extract(&self, message: &Message<'_>) -> Option<Params> {
        self.matches(message).then(|| Params::News {
            topic: self.topic.clone(),
        })
    }
}

pub struct EncyclopediaMatcher;

impl IntentMatcher for EncyclopediaMatcher {
    fn intent(&self) -> Intent {
        Intent::Encyclopedia
    }

    fn matches(&self, message: &Message<'_>) -> bool {
        contains_any(message.lower(), ENCYCLOPEDIA_PHRASES)
    }

    fn extract(&self, message: &Message<'_>) -> Option<Params> {
        if !self.matches(message) {
            return None;
        }

        // The query may end up empty; the encyclopedia lookup reports that
        let query = ENCYCLOPEDIA_TRIGGERS
            .replace_all(message.raw(), "")
            .trim()
            .to_string();
        Some(Params::Encyclopedia { query })
    }
}

pub struct CalculatorMatcher;

impl IntentMatcher for CalculatorMatcher {
    fn intent(&self) -> Intent {
        Intent::Calculator
    }

    fn extract(&self, message: &Message<'_>) -> Option<Params> {
        first_capture(&CALCULATOR_PATTERNS, message.lower()).map(|expr| Params::Calculator {
            expression: expr.to_string(),
        })
    }
}

pub struct CurrencyMatcher;

impl IntentMatcher for CurrencyMatcher {
    fn intent(&self) -> Intent {
        Intent::Currency
    }

    fn extract(&self, message: &Message<'_>) -> Option<Params> {
        CURRENCY_PATTERNS.iter().find_map(|re| {
            let caps = re.captures(message.lower())?;
            let amount = caps.get(1)?.as_str().parse::<f64>().ok()?;
            Some(Params::Currency {
                amount,
                from: normalize_unit(caps.get(2)?.as_str()),
                to: normalize_unit(caps.get(3)?.as_str()),
            })
        })
    }
}

pub struct TranslatorMatcher;

impl IntentMatcher for TranslatorMatcher {
    fn intent(&self) -> Intent {
        Intent::Translator
    }

    fn extract(&self, message: &Message<'_>) -> Option<Params> {
        first_capture(&TRANSLATOR_PATTERNS, message.lower()).map(|text| Params::Translator {
            text: text.trim().to_string(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_text(text: &str) -> Option<Params> {
        let matchers = default_matchers(&RoutingSettings::default());
        classify(&matchers, &Message::new(text))
    }

    #[test]
    fn test_priority_order() {
        let intents: Vec<Intent> = default_matchers(&RoutingSettings::default())
            .iter()
            .map(|m| m.intent())
            .collect();
        assert_eq!(
            intents,
            vec![
                Intent::Weather,
                Intent::News,
                Intent::Encyclopedia,
                Intent::Calculator,
                Intent::Currency,
                Intent::Translator,
            ]
        );
    }

    #[test]
    fn test_weather_city_after_keyword() {
        assert_eq!(
            classify_text("погода Казань"),
            Some(Params::Weather {
                city: "Казань".to_string()
            })
        );
        assert_eq!(
            classify_text("Какая температура Новосибирск сегодня"),
            Some(Params::Weather {
                city: "Новосибирск".to_string()
            })
        );
    }

    #[test]
    fn test_weather_default_city() {
        assert_eq!(
            classify_text("какая сегодня погода"),
            Some(Params::Weather {
                city: "Москва".to_string()
            })
        );
    }

    #[test]
    fn test_weather_keyword_inside_token_uses_default_city() {
        // "погода?" contains the keyword but is not the keyword token
        assert_eq!(
            classify_text("какая погода? Париж"),
            Some(Params::Weather {
                city: "Москва".to_string()
            })
        );
    }

    #[test]
    fn test_weather_configured_default_city() {
        let settings = RoutingSettings {
            default_city: "Тверь".to_string(),
            ..Default::default()
        };
        let matchers = default_matchers(&settings);
        assert_eq!(
            classify(&matchers, &Message::new("климат")),
            Some(Params::Weather {
                city: "Тверь".to_string()
            })
        );
    }

    #[test]
    fn test_news_uses_default_topic() {
        assert_eq!(
            classify_text("Покажи последние новости"),
            Some(Params::News {
                topic: "новости".to_string()
            })
        );
    }

    #[test]
    fn test_encyclopedia_strips_triggers() {
        assert_eq!(
            classify_text("Что такое Rust"),
            Some(Params::Encyclopedia {
                query: "Rust".to_string()
            })
        );
        assert_eq!(
            classify_text("википедия Эйнштейн"),
            Some(Params::Encyclopedia {
                query: "Эйнштейн".to_string()
            })
        );
    }

    #[test]
    fn test_encyclopedia_empty_query() {
        assert_eq!(
            classify_text("  что такое  "),
            Some(Params::Encyclopedia {
                query: String::new()
            })
        );
    }

    #[test]
    fn test_calculator_captures_expression() {
        assert_eq!(
            classify_text("Посчитай 2+2*2"),
            Some(Params::Calculator {
                expression: "2+2*2".to_string()
            })
        );
        assert_eq!(
            classify_text("сколько будет (1+2)/3"),
            Some(Params::Calculator {
                expression: "(1+2)/3".to_string()
            })
        );
        assert_eq!(
            classify_text("вычислить 5*5"),
            Some(Params::Calculator {
                expression: "5*5".to_string()
            })
        );
    }

    #[test]
    fn test_currency_extraction() {
        assert_eq!(
            classify_text("10 долларов в рублей"),
            Some(Params::Currency {
                amount: 10.0,
                from: "USD".to_string(),
                to: "RUB".to_string()
            })
        );
        assert_eq!(
            classify_text("конвертируй 2.5 usd to руб"),
            Some(Params::Currency {
                amount: 2.5,
                from: "USD".to_string(),
                to: "RUB".to_string()
            })
        );
    }

    #[test]
    fn test_currency_euro_passes_through_unnormalized() {
        // Current behavior: only rouble and dollar aliases are normalized
        assert_eq!(
            classify_text("100 eur в руб"),
            Some(Params::Currency {
                amount: 100.0,
                from: "eur".to_string(),
                to: "RUB".to_string()
            })
        );
    }

    #[test]
    fn test_translator_extraction() {
        assert_eq!(
            classify_text("Переведи  Привет "),
            Some(Params::Translator {
                text: "привет".to_string()
            })
        );
        assert_eq!(
            classify_text("translate спасибо"),
            Some(Params::Translator {
                text: "спасибо".to_string()
            })
        );
    }

    #[test]
    fn test_calculator_beats_currency() {
        let params = classify_text("посчитай 10 usd в rub").unwrap();
        assert_eq!(params.intent(), Intent::Calculator);
    }

    #[test]
    fn test_weather_beats_everything_later() {
        let params = classify_text("переведи погода").unwrap();
        assert_eq!(params.intent(), Intent::Weather);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(classify_text("расскажи анекдот"), None);
        assert_eq!(classify_text("   \t  "), None);
        assert_eq!(classify_text(""), None);
    }

    #[test]
    fn test_matches_agrees_with_extract() {
        let matchers = default_matchers(&RoutingSettings::default());
        for text in ["погода", "новости", "посчитай 1", "5 usd в руб", "привет"] {
            let message = Message::new(text);
            for matcher in &matchers {
                assert_eq!(matcher.matches(&message), matcher.extract(&message).is_some());
            }
        }
    }
}
