//! Voice pipeline integration tests
//!
//! Tests voice components without requiring audio hardware

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use vox_assistant::voice::{
    ConsoleTranscriber, SAMPLE_RATE, Segment, SegmenterState, UtteranceSegmenter,
    normalize_transcript, samples_to_wav,
};
use vox_assistant::session::INTERRUPT_REPLY;
use vox_assistant::{Collaborators, SessionLoop, SessionState, Transcriber, WakeWordDetector};

mod common;
use common::{RecordingProviders, RecordingSpeaker, contacts};

/// 0.1 seconds of audio per chunk
const CHUNK: usize = SAMPLE_RATE as usize / 10;

/// Generate sine wave audio samples
fn sine_chunk(amplitude: f32) -> Vec<f32> {
    (0..CHUNK)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
        })
        .collect()
}

fn silence_chunk() -> Vec<f32> {
    vec![0.0; CHUNK]
}

fn segmenter() -> UtteranceSegmenter {
    UtteranceSegmenter::new(Duration::from_millis(500), Duration::from_secs(10))
}

#[test]
fn test_phrase_ends_after_pause() {
    let mut seg = segmenter();

    for _ in 0..10 {
        assert_eq!(seg.push(&sine_chunk(0.3)), Segment::Pending);
    }
    assert_eq!(seg.state(), SegmenterState::Speaking);

    for _ in 0..4 {
        assert_eq!(seg.push(&silence_chunk()), Segment::Pending);
    }

    match seg.push(&silence_chunk()) {
        Segment::Complete(samples) => assert_eq!(samples.len(), 15 * CHUNK),
        Segment::Pending => panic!("phrase should be complete after the pause"),
    }
    assert_eq!(seg.state(), SegmenterState::Idle);
}

#[test]
fn test_silence_never_starts_a_phrase() {
    let mut seg = segmenter();

    for _ in 0..50 {
        assert_eq!(seg.push(&silence_chunk()), Segment::Pending);
    }
    assert!(!seg.in_speech());
}

#[test]
fn test_short_burst_discarded() {
    let mut seg = segmenter();

    seg.push(&sine_chunk(0.3));
    for _ in 0..5 {
        assert_eq!(seg.push(&silence_chunk()), Segment::Pending);
    }

    assert_eq!(seg.state(), SegmenterState::Idle);
}

#[test]
fn test_phrase_time_limit() {
    let mut seg = UtteranceSegmenter::new(Duration::from_millis(500), Duration::from_secs(1));

    for _ in 0..9 {
        assert_eq!(seg.push(&sine_chunk(0.3)), Segment::Pending);
    }

    match seg.push(&sine_chunk(0.3)) {
        Segment::Complete(samples) => assert_eq!(samples.len(), SAMPLE_RATE as usize),
        Segment::Pending => panic!("phrase should be cut at the time limit"),
    }
}

#[test]
fn test_wav_roundtrip() {
    let original = sine_chunk(0.5);
    let wav = samples_to_wav(&original, SAMPLE_RATE).unwrap();

    let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.bits_per_sample, 16);

    let decoded: Vec<i16> = reader.into_samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(decoded.len(), original.len());
}

#[test]
fn test_transcript_then_wake_phrase() {
    let detector = WakeWordDetector::default();

    let heard = normalize_transcript("Hey Assistant, what's the weather?").unwrap();
    let wake = detector.detect(&heard).unwrap();

    assert_eq!(wake.phrase, "hey assistant");
    assert_eq!(wake.command, "what's the weather");
    assert!(normalize_transcript(" ... ").is_none());
}

#[tokio::test]
async fn test_console_lines() {
    let input: &[u8] = b"Wake up.\n\n  SEND MESSAGE  \n";
    let mut console = ConsoleTranscriber::new(input, Duration::from_millis(20));

    assert_eq!(console.listen().await.as_deref(), Some("wake up"));
    assert_eq!(console.listen().await, None);
    assert_eq!(console.listen().await.as_deref(), Some("send message"));
    assert_eq!(console.listen().await, None);
    assert!(console.is_closed());
}

#[tokio::test]
async fn test_text_mode_session() {
    let input: &[u8] = b"wake up\nsend a message to Alice\nrunning late\nyes\nexit\n";
    let speaker = RecordingSpeaker::new();
    let providers = RecordingProviders::new();

    let mut session = SessionLoop::new(Collaborators {
        transcriber: Box::new(ConsoleTranscriber::new(input, Duration::from_millis(20))),
        speaker: Box::new(speaker.clone()),
        providers: Arc::new(providers.clone()),
        contacts: Arc::new(contacts()),
    });

    tokio::time::timeout(Duration::from_secs(5), session.run())
        .await
        .expect("session should end on exit");

    assert_eq!(session.state(), SessionState::Terminated);
    assert_eq!(
        providers.sent_messages(),
        vec![("+1".to_string(), "running late".to_string())]
    );
    assert!(speaker.said("Message sent successfully."));
}

#[tokio::test]
async fn test_text_mode_ends_at_end_of_input() {
    let input: &[u8] = b"wake up\nwhat time is it\n";
    let speaker = RecordingSpeaker::new();
    let providers = RecordingProviders::new();

    let mut session = SessionLoop::new(Collaborators {
        transcriber: Box::new(ConsoleTranscriber::new(input, Duration::from_millis(20))),
        speaker: Box::new(speaker.clone()),
        providers: Arc::new(providers),
        contacts: Arc::new(contacts()),
    });

    tokio::time::timeout(Duration::from_secs(5), session.run())
        .await
        .expect("session should end when input runs out");

    assert_eq!(session.state(), SessionState::Terminated);
    assert_eq!(session.turns(), 1);
    assert_eq!(speaker.last().as_deref(), Some(INTERRUPT_REPLY));
}
