//! Voice input and output
//!
//! The session talks to the user through two narrow traits: a
//! [`Transcriber`] that yields one normalized utterance per call and a
//! [`Speaker`] that renders one reply. Microphone and TTS adapters live here
//! alongside console fallbacks for `--text` mode.

mod artifacts;
mod capture;
mod console;
mod microphone;
mod playback;
mod segmenter;
mod speaker;
mod stt;
mod tts;

use async_trait::async_trait;

pub use artifacts::{ArtifactGuard, AudioArtifacts};
pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use console::{ConsoleSpeaker, ConsoleTranscriber};
pub use microphone::MicTranscriber;
pub use playback::{AudioPlayback, DecodedAudio, decode_mp3};
pub use segmenter::{ENERGY_THRESHOLD, Segment, SegmenterState, UtteranceSegmenter, calculate_energy};
pub use speaker::VoiceSpeaker;
pub use stt::SpeechToText;
pub use tts::TextToSpeech;

/// Source of user utterances
///
/// Not `Send`: audio streams are tied to the thread that opened them.
#[async_trait(?Send)]
pub trait Transcriber {
    /// Wait for one utterance
    ///
    /// Returns lowercase text, or `None` when nothing was heard before the
    /// timeout or the speech could not be recognized. Never fails.
    async fn listen(&mut self) -> Option<String>;

    /// Whether the input is gone for good, as at end of file
    fn is_closed(&self) -> bool {
        false
    }
}

/// Sink for spoken replies
#[async_trait(?Send)]
pub trait Speaker {
    /// Say `text`, falling back to a printed echo if audio fails
    async fn speak(&mut self, text: &str);
}

/// Lowercase a transcript and strip surrounding whitespace and punctuation
///
/// Returns `None` if nothing is left.
#[must_use]
pub fn normalize_transcript(raw: &str) -> Option<String> {
    let text = raw
        .trim()
        .trim_matches(|c: char| c.is_ascii_punctuation() && c != '\'')
        .trim()
        .to_lowercase();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_transcript() {
        assert_eq!(normalize_transcript(" Hey Assistant. ").as_deref(), Some("hey assistant"));
        assert_eq!(normalize_transcript("What time is it?").as_deref(), Some("what time is it"));
        assert!(normalize_transcript("  ...  ").is_none());
        assert!(normalize_transcript("").is_none());
    }
}
