//! Session lifecycle
//!
//! The session is a single state machine owned by the main task:
//!
//! - `Dormant`: listen for a wake phrase (or an exit word)
//! - `Active`: route every utterance to a command or a dialogue flow
//! - `Terminated`: the loop has ended
//!
//! Each [`SessionLoop::step`] performs exactly one listen and at most one
//! transition.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use chrono::Timelike;

use crate::commands;
use crate::contacts::ContactStore;
use crate::dialogue::{DialogueController, flow_for};
use crate::intent::rules::EXIT_WORDS;
use crate::intent::{Intent, IntentRouter, WakeWordDetector};
use crate::providers::ActionProviders;
use crate::voice::{Speaker, Transcriber};

pub const WAKE_REPLY: &str = "I'm awake and ready to help!";
pub const WAKE_PROMPT: &str = "What can I do for you?";
pub const DORMANT_PROMPT: &str = "Say 'wake up' to activate me.";
pub const SLEEP_REPLY: &str = "Going to rest mode. Say 'wake up' to activate me again.";
pub const EXIT_REPLY: &str = "Goodbye! Have a great day!";
pub const INTERRUPT_REPLY: &str = "Goodbye!";
pub const GREETING_FOLLOW_UP: &str = "How can I help you today?";

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Dormant,
    Active,
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dormant => "dormant",
            Self::Active => "active",
            Self::Terminated => "terminated",
        })
    }
}

/// Everything the session talks to
pub struct Collaborators {
    pub transcriber: Box<dyn Transcriber>,
    pub speaker: Box<dyn Speaker>,
    pub providers: Arc<dyn ActionProviders>,
    pub contacts: Arc<dyn ContactStore>,
}

/// Top-level listen, route, act loop
pub struct SessionLoop {
    state: SessionState,
    router: IntentRouter,
    wake: WakeWordDetector,
    transcriber: Box<dyn Transcriber>,
    speaker: Box<dyn Speaker>,
    providers: Arc<dyn ActionProviders>,
    contacts: Arc<dyn ContactStore>,
    turns: usize,
}

impl SessionLoop {
    /// Create a dormant session
    #[must_use]
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            state: SessionState::Dormant,
            router: IntentRouter::new(),
            wake: WakeWordDetector::default(),
            transcriber: collaborators.transcriber,
            speaker: collaborators.speaker,
            providers: collaborators.providers,
            contacts: collaborators.contacts,
            turns: 0,
        }
    }

    /// Use a custom wake phrase detector
    #[must_use]
    pub fn with_wake_words(mut self, wake: WakeWordDetector) -> Self {
        self.wake = wake;
        self
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Commands handled since the session last woke
    #[must_use]
    pub const fn turns(&self) -> usize {
        self.turns
    }

    /// Speak the time-of-day greeting
    #[allow(clippy::future_not_send)]
    pub async fn greet(&mut self) {
        let hour = self.providers.now().hour();
        self.speaker.speak(greeting_for(hour)).await;
        self.speaker.speak(GREETING_FOLLOW_UP).await;
    }

    /// Listen once and act on the result
    ///
    /// No input leaves the state unchanged.
    #[allow(clippy::future_not_send)]
    pub async fn step(&mut self) -> SessionState {
        if self.state == SessionState::Terminated {
            return self.state;
        }

        let Some(utterance) = self.transcriber.listen().await else {
            if self.transcriber.is_closed() {
                self.interrupt().await;
            } else {
                tracing::trace!(state = %self.state, "no input");
            }
            return self.state;
        };

        match self.state {
            SessionState::Dormant => self.on_dormant(&utterance).await,
            SessionState::Active => self.dispatch(&utterance).await,
            SessionState::Terminated => {}
        }

        self.state
    }

    /// Step until terminated
    #[allow(clippy::future_not_send)]
    pub async fn run(&mut self) {
        tracing::info!("session started");
        while self.state != SessionState::Terminated {
            self.step().await;
        }
        tracing::info!(turns = self.turns, "session ended");
    }

    /// Run until terminated or until `interrupt` resolves
    ///
    /// An interrupt ends the session from any state with a short farewell.
    #[allow(clippy::future_not_send)]
    pub async fn run_until<F>(&mut self, interrupt: F) -> SessionState
    where
        F: Future<Output = ()>,
    {
        let interrupted = tokio::select! {
            () = self.run() => false,
            () = interrupt => true,
        };

        if interrupted {
            self.interrupt().await;
        }

        self.state
    }

    /// End the session immediately
    #[allow(clippy::future_not_send)]
    pub async fn interrupt(&mut self) {
        tracing::info!(state = %self.state, "session interrupted");
        self.state = SessionState::Terminated;
        self.speaker.speak(INTERRUPT_REPLY).await;
    }

    #[allow(clippy::future_not_send)]
    async fn on_dormant(&mut self, utterance: &str) {
        if let Some(wake) = self.wake.detect(utterance) {
            self.transition(SessionState::Active);
            self.turns = 0;
            self.speaker.speak(WAKE_REPLY).await;

            if wake.command.is_empty() {
                self.speaker.speak(WAKE_PROMPT).await;
            } else {
                self.dispatch(&wake.command).await;
            }
        } else if EXIT_WORDS.matches(utterance) {
            self.speaker.speak(EXIT_REPLY).await;
            self.transition(SessionState::Terminated);
        } else {
            self.speaker.speak(DORMANT_PROMPT).await;
        }
    }

    #[allow(clippy::future_not_send)]
    async fn dispatch(&mut self, utterance: &str) {
        let routed = self.router.route(utterance);
        self.turns += 1;
        tracing::info!(
            intent = %routed.intent,
            rule = routed.rule,
            turn = self.turns,
            "command"
        );

        match routed.intent {
            Intent::Sleep => {
                self.speaker.speak(SLEEP_REPLY).await;
                self.transition(SessionState::Dormant);
            }
            Intent::Exit => {
                self.speaker.speak(EXIT_REPLY).await;
                self.transition(SessionState::Terminated);
            }
            _ => {
                if let Some(flow) = flow_for(&routed) {
                    let mut controller = DialogueController::new(
                        &mut *self.transcriber,
                        &mut *self.speaker,
                        &*self.providers,
                        &*self.contacts,
                    );
                    let session = controller.run(flow, routed.argument.clone()).await;
                    tracing::debug!(flow = %session.kind, stage = %session.stage, "dialogue finished");
                } else {
                    commands::run(&routed, &*self.providers, &mut *self.speaker).await;
                }
            }
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            tracing::info!(from = %self.state, to = %next, "session state changed");
            self.state = next;
        }
    }
}

/// Greeting for an hour of the day (0-23)
#[must_use]
pub const fn greeting_for(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good Morning Sir",
        12..=16 => "Good Afternoon Sir",
        _ => "Good Evening Sir",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_for() {
        assert_eq!(greeting_for(0), "Good Morning Sir");
        assert_eq!(greeting_for(11), "Good Morning Sir");
        assert_eq!(greeting_for(12), "Good Afternoon Sir");
        assert_eq!(greeting_for(16), "Good Afternoon Sir");
        assert_eq!(greeting_for(17), "Good Evening Sir");
        assert_eq!(greeting_for(23), "Good Evening Sir");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::default().to_string(), "dormant");
        assert_eq!(SessionState::Terminated.to_string(), "terminated");
    }
}
