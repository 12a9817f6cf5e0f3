//! Message Dispatcher
//!
//! Runs the matchers in priority order, executes the winning skill and
//! wraps the outcome in an `Envelope`. Messages no matcher claims are
//! deferred to the language model without doing any work.

use tracing::{debug, warn};

use crate::calculator;
use crate::collaborators::Collaborators;
use crate::config::RoutingSettings;
use crate::currency::RateTable;
use crate::error::{SkillError, Subsystem};
use crate::intent::{classify, default_matchers, IntentMatcher, Message, Params};
use crate::translator::PhraseDictionary;
use crate::types::{Calculation, Conversion, Envelope, Intent, Payload, Translation};

pub struct Dispatcher {
    matchers: Vec<Box<dyn IntentMatcher>>,
    collaborators: Collaborators,
    rates: &'static RateTable,
    phrases: &'static PhraseDictionary,
}

impl Dispatcher {
    /// Dispatcher with the built-in matchers, rate table and phrase dictionary
    pub fn new(settings: &RoutingSettings, collaborators: Collaborators) -> Self {
        Self::with_matchers(default_matchers(settings), collaborators)
    }

    /// Dispatcher with a custom matcher list, tried in the given order
    pub fn with_matchers(matchers: Vec<Box<dyn IntentMatcher>>, collaborators: Collaborators) -> Self {
        Self {
            matchers,
            collaborators,
            rates: RateTable::builtin(),
            phrases: PhraseDictionary::builtin(),
        }
    }

    /// Classify and handle one message. Never fails: skill errors come back
    /// as error envelopes.
    pub fn dispatch(&self, text: &str) -> Envelope {
        let message = Message::new(text);

        let Some(params) = classify(&self.matchers, &message) else {
            debug!(intent = %Intent::LanguageModel, "No skill matched");
            return Envelope::defer();
        };

        let intent = params.intent();
        debug!(intent = %intent, params = ?params, "Routing message");

        match self.run(params) {
            Ok(payload) => Envelope::success(intent, payload),
            Err(error) => Envelope::failure(intent, &error),
        }
    }

    fn run(&self, params: Params) -> Result<Payload, SkillError> {
        match params {
            Params::Weather { city } => self
                .collaborators
                .weather
                .fetch_weather(&city)
                .map(Payload::Weather)
                .map_err(|e| unavailable(Subsystem::Weather, e)),

            Params::News { topic } => {
                let articles = self
                    .collaborators
                    .news
                    .fetch_news(&topic)
                    .map_err(|e| unavailable(Subsystem::News, e))?;
                if articles.is_empty() {
                    warn!(topic = %topic, "News lookup returned no articles");
                    return Err(SkillError::CollaboratorUnavailable(Subsystem::News));
                }
                Ok(Payload::News(articles))
            }

            Params::Encyclopedia { query } => self
                .collaborators
                .encyclopedia
                .fetch_summary(&query)
                .map(Payload::Encyclopedia)
                .map_err(|e| unavailable(Subsystem::Encyclopedia, e)),

            Params::Calculator { expression } => {
                let result = calculator::evaluate(&expression)?;
                Ok(Payload::Calculation(Calculation { expression, result }))
            }

            Params::Currency { amount, from, to } => {
                let result = self.rates.convert(amount, &from, &to)?;
                Ok(Payload::Conversion(Conversion {
                    amount,
                    from,
                    to,
                    result,
                }))
            }

            Params::Translator { text } => {
                let translation = self.phrases.translate(&text);
                Ok(Payload::Translation(Translation {
                    original: text,
                    translation,
                }))
            }
        }
    }
}

fn unavailable(subsystem: Subsystem, error: anyhow::Error) -> SkillError {
    warn!(subsystem = ?subsystem, error = %error, "Collaborator failed");
    SkillError::CollaboratorUnavailable(subsystem)
}
