//! Energy-based utterance segmentation
//!
//! Splits a live sample stream into single phrases: a phrase starts when the
//! signal energy rises above the speech threshold and ends after a pause of
//! the configured length, or when it reaches the phrase time limit.

use std::time::Duration;

use super::capture::SAMPLE_RATE;

/// Minimum RMS energy considered speech
pub const ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum phrase length (0.3 seconds at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800;

/// Segmenter state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    /// Waiting for speech to start
    Idle,
    /// Inside a phrase
    Speaking,
}

/// Outcome of feeding a chunk of samples
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// No complete phrase yet
    Pending,
    /// A phrase ended; the samples are the whole phrase
    Complete(Vec<f32>),
}

/// Accumulates samples until a phrase is complete
#[derive(Debug)]
pub struct UtteranceSegmenter {
    state: SegmenterState,
    buffer: Vec<f32>,
    silence_samples: usize,
    pause_samples: usize,
    max_samples: usize,
}

impl UtteranceSegmenter {
    /// Create a segmenter
    ///
    /// # Arguments
    ///
    /// * `pause_threshold` - silence that ends a phrase
    /// * `phrase_time_limit` - maximum phrase duration
    #[must_use]
    pub fn new(pause_threshold: Duration, phrase_time_limit: Duration) -> Self {
        Self {
            state: SegmenterState::Idle,
            buffer: Vec::new(),
            silence_samples: 0,
            pause_samples: duration_to_samples(pause_threshold),
            max_samples: duration_to_samples(phrase_time_limit).max(MIN_SPEECH_SAMPLES),
        }
    }

    /// Feed captured samples
    pub fn push(&mut self, samples: &[f32]) -> Segment {
        if samples.is_empty() {
            return Segment::Pending;
        }

        let energy = calculate_energy(samples);
        let is_speech = energy > ENERGY_THRESHOLD;

        match self.state {
            SegmenterState::Idle => {
                if is_speech {
                    self.state = SegmenterState::Speaking;
                    self.buffer.clear();
                    self.buffer.extend_from_slice(samples);
                    self.silence_samples = 0;
                    tracing::trace!(energy, "speech started");
                }
            }
            SegmenterState::Speaking => {
                self.buffer.extend_from_slice(samples);

                if is_speech {
                    self.silence_samples = 0;
                } else {
                    self.silence_samples += samples.len();
                }

                if self.buffer.len() >= self.max_samples {
                    tracing::debug!(samples = self.buffer.len(), "phrase time limit reached");
                    return Segment::Complete(self.finish());
                }

                if self.silence_samples >= self.pause_samples {
                    if self.buffer.len() - self.silence_samples >= MIN_SPEECH_SAMPLES {
                        tracing::debug!(samples = self.buffer.len(), "phrase complete");
                        return Segment::Complete(self.finish());
                    }
                    // Too short to be speech, probably a click
                    tracing::trace!("discarding short burst");
                    self.reset();
                }
            }
        }

        Segment::Pending
    }

    /// Whether a phrase is in progress
    #[must_use]
    pub fn in_speech(&self) -> bool {
        self.state == SegmenterState::Speaking
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SegmenterState {
        self.state
    }

    /// Drop any partial phrase
    pub fn reset(&mut self) {
        self.state = SegmenterState::Idle;
        self.buffer.clear();
        self.silence_samples = 0;
    }

    fn finish(&mut self) -> Vec<f32> {
        self.state = SegmenterState::Idle;
        self.silence_samples = 0;
        std::mem::take(&mut self.buffer)
    }
}

/// Root-mean-square energy of a chunk
#[must_use]
pub fn calculate_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum: f32 = samples.iter().map(|s| s * s).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = sum / samples.len() as f32;
    mean.sqrt()
}

fn duration_to_samples(duration: Duration) -> usize {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let samples = (duration.as_secs_f64() * f64::from(SAMPLE_RATE)) as usize;
    samples
}
