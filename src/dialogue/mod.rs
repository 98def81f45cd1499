//! Multi-turn dialogues
//!
//! [`DialogueController`] runs a [`FlowSpec`] turn by turn: prompt for each
//! field, listen, store, then optionally confirm and run the flow's action.
//! Every failure inside a flow ends it with a spoken reply; nothing
//! propagates to the caller.

mod flow;
mod session;

pub use flow::{
    CANCEL_WORDS, FieldKind, FieldSpec, FlowAction, FlowSpec, PLAY_SPOTIFY, PLAY_YOUTUBE,
    SEND_MESSAGE, TAKE_SCREENSHOT, WEB_SEARCH, flow_for, is_affirmative, is_cancellation,
    sanitize_file_name,
};
pub use session::{DialogueSession, Stage};

use crate::contacts::ContactStore;
use crate::error::ErrorClass;
use crate::providers::ActionProviders;
use crate::voice::{Speaker, Transcriber};
use crate::{Error, Result};

/// Spoken after a prompt went unanswered twice
pub const NO_INPUT_REPLY: &str = "I didn't catch that. Please try again.";

/// Spoken when a recipient name matches no contact
pub const CONTACT_NOT_FOUND_REPLY: &str = "Contact not found. Please check the name and try again.";

/// Drives one flow at a time over borrowed collaborators
pub struct DialogueController<'a> {
    transcriber: &'a mut dyn Transcriber,
    speaker: &'a mut dyn Speaker,
    providers: &'a dyn ActionProviders,
    contacts: &'a dyn ContactStore,
}

impl<'a> DialogueController<'a> {
    #[must_use]
    pub fn new(
        transcriber: &'a mut dyn Transcriber,
        speaker: &'a mut dyn Speaker,
        providers: &'a dyn ActionProviders,
        contacts: &'a dyn ContactStore,
    ) -> Self {
        Self {
            transcriber,
            speaker,
            providers,
            contacts,
        }
    }

    /// Run `flow` to a terminal stage
    ///
    /// `prefill` answers the first field without asking, as when the command
    /// already named the query ("play on youtube cats").
    #[allow(clippy::future_not_send)]
    pub async fn run(&mut self, flow: &FlowSpec, prefill: Option<String>) -> DialogueSession {
        let first = flow.fields.first().map_or("confirmation", |f| f.name);
        let mut session = DialogueSession::new(flow.kind, first);
        tracing::info!(flow = %flow.kind, prefilled = prefill.is_some(), "dialogue started");

        match self.drive(flow, &mut session, prefill).await {
            Ok(()) => {
                session.complete();
                tracing::info!(flow = %flow.kind, "dialogue complete");
            }
            Err(e) => {
                let class = e.class();
                match class {
                    ErrorClass::UserAbort => {
                        tracing::info!(flow = %flow.kind, stage = %session.stage, "dialogue cancelled");
                    }
                    ErrorClass::NoInput | ErrorClass::ContactNotFound => {
                        tracing::info!(flow = %flow.kind, stage = %session.stage, reason = %e, "dialogue ended");
                    }
                    ErrorClass::ProviderFailure | ErrorClass::FatalStartup => {
                        tracing::error!(flow = %flow.kind, error = %e, "dialogue action failed");
                    }
                }
                self.speaker.speak(failure_reply(flow, class)).await;
                session.cancel(class);
            }
        }

        session
    }

    #[allow(clippy::future_not_send)]
    async fn drive(
        &mut self,
        flow: &FlowSpec,
        session: &mut DialogueSession,
        mut prefill: Option<String>,
    ) -> Result<()> {
        for field in flow.fields {
            session.stage = Stage::Awaiting(field.name);

            let value = match prefill.take() {
                Some(reply) => match self.accept(field, &reply) {
                    Err(Error::ContactNotFound(name)) => {
                        tracing::debug!(field = field.name, name = %name, "prefilled recipient not found");
                        self.collect(field).await?
                    }
                    accepted => accepted?,
                },
                None => self.collect(field).await?,
            };
            tracing::debug!(field = field.name, value = %value, "field collected");
            session.record(field.name, value);
        }

        if let Some(question) = flow.confirmation {
            session.stage = Stage::AwaitingConfirmation;
            let reply = self.ask(question).await?;
            if !is_affirmative(&reply) {
                return Err(Error::UserAbort);
            }
        }

        flow.action
            .execute(session, self.providers, &mut *self.speaker)
            .await
    }

    /// Ask for a field and validate the reply
    #[allow(clippy::future_not_send)]
    async fn collect(&mut self, field: &FieldSpec) -> Result<String> {
        let reply = self.ask(field.prompt).await?;
        if is_cancellation(&reply) {
            return Err(Error::UserAbort);
        }
        self.accept(field, &reply)
    }

    /// Speak a prompt and listen, re-prompting once on silence
    #[allow(clippy::future_not_send)]
    async fn ask(&mut self, prompt: &str) -> Result<String> {
        for attempt in 1..=2 {
            self.speaker.speak(prompt).await;
            if let Some(reply) = self.transcriber.listen().await {
                return Ok(reply);
            }
            tracing::debug!(attempt, prompt, "no reply");
        }
        Err(Error::NoInput)
    }

    fn accept(&self, field: &FieldSpec, reply: &str) -> Result<String> {
        match field.kind {
            FieldKind::Text => Ok(reply.trim().to_string()),
            FieldKind::Contact => self.contacts.resolve(reply),
            FieldKind::FileName => {
                let name = sanitize_file_name(reply);
                if name.is_empty() {
                    Ok(self.providers.now().format("screenshot_%Y%m%d_%H%M%S").to_string())
                } else {
                    Ok(name)
                }
            }
        }
    }
}

/// Reply for a flow that ended early
#[must_use]
pub const fn failure_reply(flow: &FlowSpec, class: ErrorClass) -> &'static str {
    match class {
        ErrorClass::UserAbort => flow.cancelled_reply,
        ErrorClass::NoInput => NO_INPUT_REPLY,
        ErrorClass::ContactNotFound => CONTACT_NOT_FOUND_REPLY,
        ErrorClass::ProviderFailure | ErrorClass::FatalStartup => flow.failure_reply,
    }
}
