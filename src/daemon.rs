//! Daemon - wires collaborators to the session and runs it
//!
//! Owns startup (contacts, audio devices, providers), the interrupt signal
//! and the guarantee that transient audio files are removed however the
//! session ends.

use std::future::Future;
use std::sync::Arc;

use crate::contacts::ContactBook;
use crate::providers::SystemProviders;
use crate::session::{Collaborators, SessionLoop, SessionState};
use crate::voice::{
    AudioArtifacts, ConsoleSpeaker, ConsoleTranscriber, MicTranscriber, Speaker, Transcriber,
    VoiceSpeaker,
};
use crate::{Config, Result};

/// How the assistant hears and answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoMode {
    /// Microphone in, synthesized speech out
    Voice,
    /// Stdin in, stdout out
    Text,
}

/// The assistant process
pub struct Daemon {
    config: Arc<Config>,
    mode: IoMode,
}

impl Daemon {
    /// Create a daemon; voice mode falls back to text when voice is disabled
    #[must_use]
    pub fn new(config: Config, mode: IoMode) -> Self {
        let mode = if config.voice.enabled { mode } else { IoMode::Text };
        Self {
            config: Arc::new(config),
            mode,
        }
    }

    /// Selected I/O mode
    #[must_use]
    pub const fn mode(&self) -> IoMode {
        self.mode
    }

    /// Build the session and its collaborators
    ///
    /// # Errors
    ///
    /// Returns a fatal startup error if contacts, audio devices or providers
    /// cannot be initialized
    pub fn build_session(&self) -> Result<SessionLoop> {
        let contacts = ContactBook::load(&self.config.paths.contacts)?;
        tracing::info!(
            contacts = contacts.len(),
            path = %self.config.paths.contacts.display(),
            "contacts loaded"
        );

        let (transcriber, speaker): (Box<dyn Transcriber>, Box<dyn Speaker>) = match self.mode {
            IoMode::Voice => (
                Box::new(MicTranscriber::from_config(&self.config)?),
                Box::new(VoiceSpeaker::from_config(&self.config)?),
            ),
            IoMode::Text => (
                Box::new(ConsoleTranscriber::stdin(self.config.assistant.timeout)),
                Box::new(ConsoleSpeaker),
            ),
        };

        let providers = SystemProviders::from_config(&self.config)?;

        Ok(SessionLoop::new(Collaborators {
            transcriber,
            speaker,
            providers: Arc::new(providers),
            contacts: Arc::new(contacts),
        }))
    }

    /// Run until the user exits or the process is interrupted
    ///
    /// # Errors
    ///
    /// Returns error if startup fails
    #[allow(clippy::future_not_send)]
    pub async fn run(self) -> Result<()> {
        let artifacts = AudioArtifacts::new(&self.config.paths.artifacts);
        let session = self.build_session()?;
        tracing::info!(mode = ?self.mode, "assistant started");

        let state = run_session(session, &artifacts, interrupt_signal()).await;

        debug_assert_eq!(state, SessionState::Terminated);
        tracing::info!("assistant stopped");
        Ok(())
    }
}

/// Greet, then run `session` until it terminates or `interrupt` resolves
///
/// Stale audio files are swept before the first turn, and the artifact
/// directory is swept again once the session has ended.
#[allow(clippy::future_not_send)]
pub async fn run_session<F>(
    mut session: SessionLoop,
    artifacts: &AudioArtifacts,
    interrupt: F,
) -> SessionState
where
    F: Future<Output = ()>,
{
    artifacts.sweep();
    let _cleanup = artifacts.guard();

    session.greet().await;
    session.run_until(interrupt).await
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for interrupt");
        std::future::pending::<()>().await;
    }
}
