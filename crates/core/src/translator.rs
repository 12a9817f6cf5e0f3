//! Literal phrase translator (Russian → English)

use std::collections::HashMap;
use std::sync::LazyLock;

const PHRASES: &[(&str, &str)] = &[
    ("привет", "hello"),
    ("пока", "goodbye"),
    ("спасибо", "thank you"),
    ("пожалуйста", "please"),
    ("да", "yes"),
    ("нет", "no"),
    ("хорошо", "good"),
    ("плохо", "bad"),
    ("красиво", "beautiful"),
    ("интересно", "interesting"),
    ("сложно", "difficult"),
    ("легко", "easy"),
    ("большой", "big"),
    ("маленький", "small"),
    ("новый", "new"),
    ("старый", "old"),
];

static BUILTIN: LazyLock<PhraseDictionary> =
    LazyLock::new(|| PhraseDictionary::from_entries(PHRASES));

/// Fixed mapping from lowercase source phrase to target phrase
#[derive(Debug, Clone, Default)]
pub struct PhraseDictionary {
    phrases: HashMap<String, String>,
}

impl PhraseDictionary {
    pub fn builtin() -> &'static PhraseDictionary {
        &BUILTIN
    }

    pub fn from_entries(entries: &[(&str, &str)]) -> Self {
        let phrases = entries
            .iter()
            .map(|(source, target)| (source.to_lowercase(), target.to_string()))
            .collect();
        Self { phrases }
    }

    pub fn lookup(&self, phrase: &str) -> Option<&str> {
        self.phrases.get(&phrase.to_lowercase()).map(String::as_str)
    }

    /// Translate a phrase, or return a placeholder naming the original text
    pub fn translate(&self, phrase: &str) -> String {
        match self.lookup(phrase) {
            Some(target) => target.to_string(),
            None => format!("[Перевод: {}]", phrase),
        }
    }
}
