//! Microphone transcriber

use std::time::{Duration, Instant};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
use super::segmenter::{Segment, UtteranceSegmenter};
use super::stt::SpeechToText;
use super::{Transcriber, normalize_transcript};
use crate::config::{AssistantConfig, Config, SttBackend};
use crate::{Error, Result};

/// How often captured audio is drained into the segmenter
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Listens on the default microphone and transcribes one phrase per call
pub struct MicTranscriber {
    capture: AudioCapture,
    stt: SpeechToText,
    timeout: Duration,
    pause_threshold: Duration,
    phrase_time_limit: Duration,
}

impl MicTranscriber {
    /// Open the microphone and start capturing
    ///
    /// # Errors
    ///
    /// Returns error if the input device cannot be opened
    pub fn new(stt: SpeechToText, config: &AssistantConfig) -> Result<Self> {
        let mut capture = AudioCapture::new()?;
        capture.start()?;

        Ok(Self {
            capture,
            stt,
            timeout: config.timeout,
            pause_threshold: config.pause_threshold,
            phrase_time_limit: config.phrase_time_limit,
        })
    }

    /// Build from configuration, choosing the configured STT backend
    ///
    /// # Errors
    ///
    /// Returns error if the backend's API key is missing or the microphone
    /// cannot be opened
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = config.voice.stt_backend;
        let key = match backend {
            SttBackend::Whisper => config.api_keys.openai.as_ref(),
            SttBackend::Deepgram => config.api_keys.deepgram.as_ref(),
        }
        .ok_or_else(|| Error::Config(format!("{backend:?} API key required for voice input")))?;

        let stt = SpeechToText::new(
            backend,
            SecretString::from(key.expose_secret().to_owned()),
            config.voice.stt_model.clone(),
            &config.assistant.language,
            config.assistant.provider_timeout,
        )?;

        Self::new(stt, &config.assistant)
    }

    /// Capture one phrase, or `None` if no speech started before the timeout
    #[allow(clippy::future_not_send)]
    async fn capture_phrase(&mut self) -> Option<Vec<f32>> {
        self.capture.clear_buffer();
        let mut segmenter = UtteranceSegmenter::new(self.pause_threshold, self.phrase_time_limit);
        let started = Instant::now();

        loop {
            tokio::time::sleep(POLL_INTERVAL).await;

            if let Segment::Complete(phrase) = segmenter.push(&self.capture.take_buffer()) {
                return Some(phrase);
            }

            if !segmenter.in_speech() && started.elapsed() >= self.timeout {
                tracing::debug!("listening timed out");
                return None;
            }
        }
    }
}

#[async_trait(?Send)]
impl Transcriber for MicTranscriber {
    async fn listen(&mut self) -> Option<String> {
        tracing::info!("listening");
        let phrase = self.capture_phrase().await?;

        let wav = match samples_to_wav(&phrase, SAMPLE_RATE) {
            Ok(wav) => wav,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode audio");
                return None;
            }
        };

        match self.stt.transcribe(&wav).await {
            Ok(raw) => {
                let text = normalize_transcript(&raw);
                match &text {
                    Some(utterance) => tracing::info!(utterance, "recognized"),
                    None => tracing::info!("could not understand audio"),
                }
                text
            }
            Err(e) => {
                tracing::warn!(error = %e, "speech recognition failed");
                None
            }
        }
    }
}

impl Drop for MicTranscriber {
    fn drop(&mut self) {
        self.capture.stop();
    }
}
