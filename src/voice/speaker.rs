//! Synthesized-speech speaker

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::artifacts::AudioArtifacts;
use super::playback::AudioPlayback;
use super::tts::TextToSpeech;
use super::Speaker;
use crate::config::{Config, TtsBackend};
use crate::{Error, Result};

/// Speaks replies through TTS and the default output device
pub struct VoiceSpeaker {
    tts: TextToSpeech,
    playback: AudioPlayback,
    artifacts: AudioArtifacts,
    speech_delay: Duration,
}

impl VoiceSpeaker {
    /// Create a speaker from its parts
    #[must_use]
    pub const fn new(
        tts: TextToSpeech,
        playback: AudioPlayback,
        artifacts: AudioArtifacts,
        speech_delay: Duration,
    ) -> Self {
        Self {
            tts,
            playback,
            artifacts,
            speech_delay,
        }
    }

    /// Build from configuration, choosing the configured TTS backend
    ///
    /// # Errors
    ///
    /// Returns error if the backend's API key is missing or the output
    /// device cannot be opened
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = config.voice.tts_backend;
        let key = match backend {
            TtsBackend::OpenAi => config.api_keys.openai.as_ref(),
            TtsBackend::ElevenLabs => config.api_keys.elevenlabs.as_ref(),
        }
        .ok_or_else(|| Error::Config(format!("{backend:?} API key required for voice output")))?;

        let tts = TextToSpeech::new(
            backend,
            SecretString::from(key.expose_secret().to_owned()),
            config.voice.tts_voice.clone(),
            config.voice.tts_model.clone(),
            config.assistant.tts_slow,
            config.assistant.provider_timeout,
        )?
        .with_language(&config.assistant.tts_language);

        Ok(Self::new(
            tts,
            AudioPlayback::new()?,
            AudioArtifacts::new(&config.paths.artifacts),
            config.assistant.speech_delay,
        ))
    }

    #[allow(clippy::future_not_send)]
    async fn render(&self, text: &str) -> Result<()> {
        let audio = self.tts.synthesize(text).await?;
        let path = self.artifacts.write(&audio)?;

        let played = match tokio::fs::read(&path).await {
            Ok(data) => self.playback.play_mp3(&data).await,
            Err(e) => Err(e.into()),
        };

        self.artifacts.remove(&path);
        played
    }
}

#[async_trait(?Send)]
impl Speaker for VoiceSpeaker {
    async fn speak(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        tracing::info!(text, "speaking");
        println!("[Assistant]: {text}");

        match self.render(text).await {
            Ok(()) => tokio::time::sleep(self.speech_delay).await,
            Err(e) => {
                tracing::warn!(error = %e, "speech output failed");
                println!("[TTS FAILED]: {text}");
            }
        }
    }
}
