//! Wake phrase detection
//!
//! Detects wake phrases in transcribed text to activate the assistant, and
//! splits off any command spoken in the same breath.

/// Phrases that wake a dormant assistant
pub const WAKE_PHRASES: &[&str] = &["wake up", "wakeup", "hey assistant"];

/// A detected wake phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeMatch {
    /// The wake phrase that was heard
    pub phrase: String,

    /// Text spoken after the wake phrase (empty if none)
    pub command: String,
}

/// Detects wake phrases in transcripts
#[derive(Debug, Clone)]
pub struct WakeWordDetector {
    wake_words: Vec<String>,
}

impl WakeWordDetector {
    /// Create a new wake phrase detector
    ///
    /// # Arguments
    ///
    /// * `wake_words` - phrases to detect (e.g., "hey assistant")
    #[must_use]
    pub fn new(wake_words: Vec<String>) -> Self {
        let normalized: Vec<String> = wake_words
            .into_iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        tracing::debug!(wake_words = ?normalized, "wake word detector initialized");

        Self {
            wake_words: normalized,
        }
    }

    /// Check if a transcript contains a wake phrase
    ///
    /// Phrases are tested in configuration order.
    #[must_use]
    pub fn detect(&self, transcript: &str) -> Option<WakeMatch> {
        let normalized = transcript.to_lowercase();

        self.wake_words.iter().find_map(|wake_word| {
            extract_command(&normalized, wake_word).map(|command| {
                tracing::info!(wake_word, transcript, "wake word detected");
                WakeMatch {
                    phrase: wake_word.clone(),
                    command,
                }
            })
        })
    }

    /// Get the configured wake phrases
    #[must_use]
    pub fn wake_words(&self) -> &[String] {
        &self.wake_words
    }
}

impl Default for WakeWordDetector {
    fn default() -> Self {
        Self::new(WAKE_PHRASES.iter().map(ToString::to_string).collect())
    }
}

/// Extract the command after the wake phrase, if the phrase is present
fn extract_command(transcript: &str, wake_word: &str) -> Option<String> {
    transcript.find(wake_word).map(|pos| {
        transcript[pos + wake_word.len()..]
            .trim_start_matches(|c: char| c.is_whitespace() || c == ',' || c == '.' || c == '!')
            .trim_end()
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_phrases() {
        let detector = WakeWordDetector::default();
        assert_eq!(detector.wake_words(), WAKE_PHRASES);
    }

    #[test]
    fn test_wake_word_normalization() {
        let detector = WakeWordDetector::new(vec!["  Hey VOX  ".to_string(), String::new()]);
        assert_eq!(detector.wake_words(), &["hey vox"]);
    }

    #[test]
    fn test_detect_case_insensitive() {
        let detector = WakeWordDetector::default();

        assert!(detector.detect("HEY ASSISTANT").is_some());
        assert!(detector.detect("please wake up").is_some());
        assert!(detector.detect("wakeup").is_some());
        assert!(detector.detect("hello world").is_none());
    }

    #[test]
    fn test_extract_command() {
        let detector = WakeWordDetector::default();

        let wake = detector.detect("Hey assistant, what's the weather?").unwrap();
        assert_eq!(wake.phrase, "hey assistant");
        assert_eq!(wake.command, "what's the weather?");

        let wake = detector.detect("hey assistant").unwrap();
        assert_eq!(wake.command, "");
    }
}
