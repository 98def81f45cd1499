//! Session lifecycle tests

use std::time::Duration;

use vox_assistant::SessionState;
use vox_assistant::run_session;
use vox_assistant::voice::AudioArtifacts;
use vox_assistant::commands::UNKNOWN_REPLY;
use vox_assistant::session::{
    DORMANT_PROMPT, EXIT_REPLY, GREETING_FOLLOW_UP, INTERRUPT_REPLY, SLEEP_REPLY, WAKE_PROMPT,
    WAKE_REPLY,
};

mod common;
use common::{Call, RecordingProviders, ScriptedTranscriber, session};

#[tokio::test]
async fn test_wake_phrase_activates() {
    let (mut session, h) = session(
        ScriptedTranscriber::says(&["hey assistant"]),
        RecordingProviders::new(),
    );

    assert_eq!(session.state(), SessionState::Dormant);
    assert_eq!(session.step().await, SessionState::Active);
    assert_eq!(h.speaker.spoken(), vec![WAKE_REPLY, WAKE_PROMPT]);
}

#[tokio::test]
async fn test_exit_terminates_without_listening_again() {
    let (mut session, h) = session(
        ScriptedTranscriber::says(&["hey assistant", "exit"]),
        RecordingProviders::new(),
    );

    tokio::time::timeout(Duration::from_secs(5), session.run())
        .await
        .expect("session should end on exit");

    assert_eq!(session.state(), SessionState::Terminated);
    assert_eq!(h.listens(), 2);
    assert_eq!(h.speaker.last().as_deref(), Some(EXIT_REPLY));

    assert_eq!(session.step().await, SessionState::Terminated);
    assert_eq!(h.listens(), 2);
}

#[tokio::test]
async fn test_exit_word_while_dormant() {
    let (mut session, h) = session(
        ScriptedTranscriber::says(&["goodbye"]),
        RecordingProviders::new(),
    );

    assert_eq!(session.step().await, SessionState::Terminated);
    assert_eq!(h.speaker.spoken(), vec![EXIT_REPLY]);
}

#[tokio::test]
async fn test_no_input_leaves_state_unchanged() {
    let (mut session, h) = session(
        ScriptedTranscriber::new([None, Some("wake up"), None]),
        RecordingProviders::new(),
    );

    assert_eq!(session.step().await, SessionState::Dormant);
    assert!(h.speaker.spoken().is_empty());

    assert_eq!(session.step().await, SessionState::Active);
    let spoken = h.speaker.spoken().len();

    assert_eq!(session.step().await, SessionState::Active);
    assert_eq!(h.speaker.spoken().len(), spoken);
    assert_eq!(session.turns(), 0);
}

#[tokio::test]
async fn test_send_message_end_to_end() {
    let (mut session, h) = session(
        ScriptedTranscriber::says(&[
            "hey assistant",
            "send message",
            "alice",
            "running late",
            "yes",
        ]),
        RecordingProviders::new(),
    );

    session.step().await;
    session.step().await;

    assert_eq!(session.state(), SessionState::Active);
    assert_eq!(session.turns(), 1);
    assert_eq!(h.listens(), 5);
    assert_eq!(
        h.providers.sent_messages(),
        vec![("+1".to_string(), "running late".to_string())]
    );
    assert_eq!(h.providers.calls().len(), 1);
}

#[tokio::test]
async fn test_whatsapp_request_asks_for_recipient() {
    let (mut session, h) = session(
        ScriptedTranscriber::says(&[
            "wake up",
            "send a whatsapp message",
            "alice",
            "running late",
            "yes",
        ]),
        RecordingProviders::new(),
    );

    session.step().await;
    assert_eq!(session.step().await, SessionState::Active);

    assert_eq!(
        h.providers.sent_messages(),
        vec![("+1".to_string(), "running late".to_string())]
    );
    assert!(h.speaker.said("Whom do you want to send the message to?"));
    assert_eq!(h.speaker.last().as_deref(), Some("Message sent successfully."));
}

#[tokio::test]
async fn test_unresolvable_named_recipient_falls_back_to_prompt() {
    let (mut session, h) = session(
        ScriptedTranscriber::says(&[
            "wake up",
            "send a message to alice saying running late",
            "al",
            "running late",
            "yes",
        ]),
        RecordingProviders::new(),
    );

    session.step().await;
    session.step().await;

    assert_eq!(h.listens(), 5);
    assert_eq!(
        h.providers.sent_messages(),
        vec![("+1".to_string(), "running late".to_string())]
    );
    assert!(h.speaker.said("Whom do you want to send the message to?"));
}

#[tokio::test]
async fn test_sleep_and_wake_again() {
    let (mut session, h) = session(
        ScriptedTranscriber::says(&["wake up", "go to sleep", "what time is it", "wake up"]),
        RecordingProviders::new(),
    );

    assert_eq!(session.step().await, SessionState::Active);
    assert_eq!(session.step().await, SessionState::Dormant);
    assert_eq!(h.speaker.last().as_deref(), Some(SLEEP_REPLY));

    assert_eq!(session.step().await, SessionState::Dormant);
    assert_eq!(h.speaker.last().as_deref(), Some(DORMANT_PROMPT));

    assert_eq!(session.step().await, SessionState::Active);
    assert!(h.providers.calls().is_empty());
}

#[tokio::test]
async fn test_wake_phrase_with_command() {
    let (mut session, h) = session(
        ScriptedTranscriber::says(&["wake up what time is it"]),
        RecordingProviders::new(),
    );

    assert_eq!(session.step().await, SessionState::Active);
    assert_eq!(session.turns(), 1);
    assert_eq!(
        h.speaker.spoken(),
        vec![
            WAKE_REPLY,
            "The time is 09:30 AM",
            "Today is Monday, January 15, 2024",
        ]
    );
}

#[tokio::test]
async fn test_provider_failure_keeps_session_active() {
    let (mut session, h) = session(
        ScriptedTranscriber::says(&["wake up", "tell me a joke", "what's the weather in oslo"]),
        RecordingProviders::failing(),
    );

    session.step().await;
    assert_eq!(session.step().await, SessionState::Active);
    assert_eq!(
        h.speaker.last().as_deref(),
        Some("Sorry, I couldn't get a joke right now.")
    );

    assert_eq!(session.step().await, SessionState::Active);
    assert_eq!(
        h.speaker.last().as_deref(),
        Some("Sorry, I couldn't get the weather information.")
    );
    assert_eq!(
        h.providers.calls(),
        vec![Call::Joke, Call::Weather(Some("oslo".to_string()))]
    );
}

#[tokio::test]
async fn test_single_shot_commands() {
    let (mut session, h) = session(
        ScriptedTranscriber::says(&[
            "wake up",
            "check battery",
            "volume up",
            "volume",
            "open github",
            "banana",
        ]),
        RecordingProviders::new(),
    );

    for _ in 0..6 {
        session.step().await;
    }

    let spoken = h.speaker.spoken();
    assert!(spoken.contains(&"Battery is at 80 percent".to_string()));
    assert!(spoken.contains(&"Battery level is excellent.".to_string()));
    assert!(spoken.contains(&"Volume increased".to_string()));
    assert!(spoken.contains(&"I didn't understand the volume command.".to_string()));
    assert!(spoken.contains(&"Opening GitHub".to_string()));
    assert_eq!(h.speaker.last().as_deref(), Some(UNKNOWN_REPLY));
    assert_eq!(session.turns(), 5);
}

#[tokio::test]
async fn test_interrupt_ends_any_state() {
    let (mut session, h) = session(
        ScriptedTranscriber::says(&["wake up"]),
        RecordingProviders::new(),
    );

    let state = tokio::time::timeout(
        Duration::from_secs(5),
        session.run_until(tokio::time::sleep(Duration::from_millis(50))),
    )
    .await
    .expect("interrupt should end the session");

    assert_eq!(state, SessionState::Terminated);
    assert_eq!(h.speaker.last().as_deref(), Some(INTERRUPT_REPLY));
}

#[tokio::test]
async fn test_greeting() {
    let (mut session, h) = session(ScriptedTranscriber::says(&[]), RecordingProviders::new());

    session.greet().await;

    assert_eq!(h.speaker.spoken(), vec!["Good Morning Sir", GREETING_FOLLOW_UP]);
    assert_eq!(h.listens(), 0);
}

#[tokio::test]
async fn test_interrupted_run_sweeps_audio_files() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = AudioArtifacts::new(dir.path());
    let stale = artifacts.write(b"stale").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();

    let (session, h) = session(
        ScriptedTranscriber::says(&["wake up"]),
        RecordingProviders::new(),
    );

    let during = artifacts.clone();
    let interrupt = async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        during.write(b"reply").unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
    };

    let state = tokio::time::timeout(
        Duration::from_secs(5),
        run_session(session, &artifacts, interrupt),
    )
    .await
    .expect("interrupt should end the session");

    assert_eq!(state, SessionState::Terminated);
    assert!(!stale.exists());
    let left: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(left, vec!["notes.txt"]);
    assert_eq!(h.speaker.last().as_deref(), Some(INTERRUPT_REPLY));
}
