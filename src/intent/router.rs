//! Rule-table intent router

use super::rules::{RULES, Rule};
use super::{Intent, Routed, normalize};

/// Maps utterances to intents using an ordered rule table
#[derive(Debug, Clone, Copy)]
pub struct IntentRouter {
    rules: &'static [Rule],
}

impl IntentRouter {
    /// Router over the built-in rule table
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: RULES }
    }

    /// Router over a custom rule table
    #[must_use]
    pub const fn with_rules(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    /// The rules in priority order
    #[must_use]
    pub const fn rules(&self) -> &'static [Rule] {
        self.rules
    }

    /// Route an utterance: intent, matching rule and extracted argument
    #[must_use]
    pub fn route(&self, utterance: &str) -> Routed {
        let text = normalize(utterance);

        for rule in self.rules {
            if let Some(end) = rule.matcher.find(&text) {
                let argument = rule.argument.extract(&text, end);
                tracing::debug!(
                    rule = rule.name,
                    intent = %rule.intent,
                    argument = ?argument,
                    "utterance routed"
                );
                return Routed {
                    intent: rule.intent,
                    rule: rule.name,
                    argument,
                    utterance: text,
                };
            }
        }

        tracing::debug!(utterance = %text, "no rule matched");
        Routed {
            intent: Intent::Unknown,
            rule: "none",
            argument: None,
            utterance: text,
        }
    }

    /// Classify an utterance
    #[must_use]
    pub fn classify(&self, utterance: &str) -> Intent {
        self.route(utterance).intent
    }
}

impl Default for IntentRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify an utterance with the built-in rule table
#[must_use]
pub fn classify(utterance: &str) -> Intent {
    IntentRouter::new().classify(utterance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{Argument, Matcher};

    #[test]
    fn test_unknown() {
        let routed = IntentRouter::new().route("tell me about quantum flux");
        assert_eq!(routed.intent, Intent::Unknown);
        assert_eq!(routed.rule, "none");
        assert!(routed.argument.is_none());
    }

    #[test]
    fn test_empty_is_unknown() {
        assert_eq!(classify(""), Intent::Unknown);
        assert_eq!(classify("   "), Intent::Unknown);
    }

    #[test]
    fn test_normalizes_case() {
        assert_eq!(classify("What TIME is it"), Intent::GetTime);
    }

    #[test]
    fn test_custom_rules() {
        static ONLY_JOKES: &[Rule] = &[Rule {
            name: "joke",
            matcher: Matcher::Word("joke"),
            intent: Intent::TellJoke,
            argument: Argument::None,
        }];

        let router = IntentRouter::with_rules(ONLY_JOKES);
        assert_eq!(router.classify("tell me a joke"), Intent::TellJoke);
        assert_eq!(router.classify("what time is it"), Intent::Unknown);
        assert_eq!(router.rules().len(), 1);
    }
}
