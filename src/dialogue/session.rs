//! Per-flow dialogue state

use std::fmt;

use crate::error::ErrorClass;
use crate::intent::Intent;
use crate::{Error, Result};

/// Where a dialogue is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Waiting for the named field
    Awaiting(&'static str),
    /// All fields collected, waiting for a yes or no
    AwaitingConfirmation,
    /// The action ran
    Complete,
    /// Ended without the action completing
    Cancelled,
}

impl Stage {
    /// Whether the dialogue has ended
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Awaiting(field) => write!(f, "awaiting_{field}"),
            Self::AwaitingConfirmation => f.write_str("awaiting_confirmation"),
            Self::Complete => f.write_str("complete"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// State of one multi-turn flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueSession {
    /// Intent the flow serves
    pub kind: Intent,

    /// Collected fields in collection order
    pub collected_fields: Vec<(&'static str, String)>,

    /// Current stage
    pub stage: Stage,

    /// Why the flow was cancelled, if it was
    pub failure: Option<ErrorClass>,
}

impl DialogueSession {
    /// Start a session awaiting `first_field`
    #[must_use]
    pub const fn new(kind: Intent, first_field: &'static str) -> Self {
        Self {
            kind,
            collected_fields: Vec::new(),
            stage: Stage::Awaiting(first_field),
            failure: None,
        }
    }

    /// Value of a collected field
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.collected_fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value of a field the action needs
    ///
    /// # Errors
    ///
    /// Returns error if the field was never collected
    pub fn require(&self, name: &str) -> Result<&str> {
        self.field(name)
            .ok_or_else(|| Error::Provider(format!("{} is missing field {name}", self.kind)))
    }

    pub(crate) fn record(&mut self, name: &'static str, value: String) {
        self.collected_fields.push((name, value));
    }

    pub(crate) const fn complete(&mut self) {
        self.stage = Stage::Complete;
    }

    pub(crate) const fn cancel(&mut self, reason: ErrorClass) {
        self.stage = Stage::Cancelled;
        self.failure = Some(reason);
    }

    /// Whether the action ran to completion
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.stage == Stage::Complete
    }

    /// Whether the flow was cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.stage == Stage::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_keep_order() {
        let mut session = DialogueSession::new(Intent::SendMessage, "recipient");
        session.record("recipient", "+1".to_string());
        session.record("body", "hi".to_string());

        assert_eq!(session.field("body"), Some("hi"));
        assert_eq!(session.collected_fields[0].0, "recipient");
        assert!(session.require("subject").is_err());
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Awaiting("recipient").to_string(), "awaiting_recipient");
        assert_eq!(Stage::AwaitingConfirmation.to_string(), "awaiting_confirmation");
        assert!(Stage::Cancelled.is_terminal());
        assert!(!Stage::Awaiting("body").is_terminal());
    }

    #[test]
    fn test_cancel_records_reason() {
        let mut session = DialogueSession::new(Intent::PlayMedia, "query");
        session.cancel(ErrorClass::UserAbort);
        assert!(session.is_cancelled());
        assert_eq!(session.failure, Some(ErrorClass::UserAbort));
    }
}
