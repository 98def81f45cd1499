//! Declarative multi-turn flows
//!
//! A flow is its field sequence, an optional confirmation question, a
//! terminal action and the replies for how it can end. Adding a flow means
//! adding a [`FlowSpec`], not new control flow.

use crate::intent::{Intent, Routed};
use crate::providers::{ActionProviders, MediaService};
use crate::voice::Speaker;
use crate::Result;

use super::session::DialogueSession;

/// Keywords that cancel a flow at any prompt
pub const CANCEL_WORDS: &[&str] = &["cancel", "leave"];

/// Words that turn a confirmation into a refusal
const NEGATIONS: &[&str] = &["no", "not", "don't", "dont"];

/// Words that confirm
const AFFIRMATIONS: &[&str] = &["yes", "send"];

/// How a field's raw reply becomes its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text
    Text,
    /// A contact name, stored as the resolved phone number
    Contact,
    /// A file stem: alphanumerics, space, '-' and '_' only
    FileName,
}

/// One required field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub prompt: &'static str,
    pub kind: FieldKind,
}

/// What runs once every field is collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    SendMessage,
    PlayMedia(MediaService),
    WebSearch,
    Screenshot,
}

impl FlowAction {
    /// Run the action with the collected fields
    ///
    /// # Errors
    ///
    /// Returns the provider's error
    #[allow(clippy::future_not_send)]
    pub async fn execute(
        self,
        session: &DialogueSession,
        providers: &dyn ActionProviders,
        speaker: &mut dyn Speaker,
    ) -> Result<()> {
        match self {
            Self::SendMessage => {
                let phone = session.require("recipient")?;
                let body = session.require("body")?;
                providers.send_message(phone, body).await?;
                speaker.speak("Message sent successfully.").await;
            }
            Self::PlayMedia(service) => {
                let query = session.require("query")?;
                match service {
                    MediaService::YouTube => {
                        speaker.speak(&format!("Playing {query} on YouTube")).await;
                        providers.play_media(service, query).await?;
                    }
                    MediaService::Spotify => {
                        providers.play_media(service, query).await?;
                        speaker.speak("Opening Spotify").await;
                    }
                }
            }
            Self::WebSearch => {
                let query = session.require("query")?;
                match providers.web_search(query).await? {
                    Some(top) if !top.snippet.trim().is_empty() => {
                        speaker.speak(&format!("Top result: {}.", top.title)).await;
                        speaker.speak(&top.snippet).await;
                    }
                    Some(top) => speaker.speak(&format!("Top result: {}.", top.title)).await,
                    None => speaker.speak("Searching on Google").await,
                }
            }
            Self::Screenshot => {
                let name = session.require("name")?;
                speaker.speak("Taking screenshot in 3 seconds...").await;
                let path = providers.screenshot(name).await?;
                let file = path
                    .file_name()
                    .map_or_else(|| format!("{name}.png"), |f| f.to_string_lossy().into_owned());
                speaker.speak(&format!("Screenshot saved as {file}")).await;
            }
        }
        Ok(())
    }
}

/// A named multi-turn flow
#[derive(Debug, Clone, Copy)]
pub struct FlowSpec {
    pub kind: Intent,
    pub fields: &'static [FieldSpec],
    /// Question asked after the last field, if the action needs consent
    pub confirmation: Option<&'static str>,
    pub action: FlowAction,
    /// Spoken when the user cancels
    pub cancelled_reply: &'static str,
    /// Spoken when the action fails
    pub failure_reply: &'static str,
}

pub static SEND_MESSAGE: FlowSpec = FlowSpec {
    kind: Intent::SendMessage,
    fields: &[
        FieldSpec {
            name: "recipient",
            prompt: "Whom do you want to send the message to?",
            kind: FieldKind::Contact,
        },
        FieldSpec {
            name: "body",
            prompt: "What's the message?",
            kind: FieldKind::Text,
        },
    ],
    confirmation: Some("Should I send the message?"),
    action: FlowAction::SendMessage,
    cancelled_reply: "Message cancelled.",
    failure_reply: "Sorry, I couldn't send the message.",
};

pub static PLAY_YOUTUBE: FlowSpec = FlowSpec {
    kind: Intent::PlayMedia,
    fields: &[FieldSpec {
        name: "query",
        prompt: "What would you like to watch?",
        kind: FieldKind::Text,
    }],
    confirmation: None,
    action: FlowAction::PlayMedia(MediaService::YouTube),
    cancelled_reply: "Cancelled YouTube search.",
    failure_reply: "Sorry, I couldn't play the video.",
};

pub static PLAY_SPOTIFY: FlowSpec = FlowSpec {
    kind: Intent::PlayMedia,
    fields: &[FieldSpec {
        name: "query",
        prompt: "What would you like to listen to?",
        kind: FieldKind::Text,
    }],
    confirmation: None,
    action: FlowAction::PlayMedia(MediaService::Spotify),
    cancelled_reply: "Cancelled Spotify search.",
    failure_reply: "Sorry, I couldn't open Spotify.",
};

pub static WEB_SEARCH: FlowSpec = FlowSpec {
    kind: Intent::WebSearch,
    fields: &[FieldSpec {
        name: "query",
        prompt: "What should I search on Google?",
        kind: FieldKind::Text,
    }],
    confirmation: None,
    action: FlowAction::WebSearch,
    cancelled_reply: "Search cancelled.",
    failure_reply: "Sorry, I couldn't search right now.",
};

pub static TAKE_SCREENSHOT: FlowSpec = FlowSpec {
    kind: Intent::TakeScreenshot,
    fields: &[FieldSpec {
        name: "name",
        prompt: "What should I name the screenshot?",
        kind: FieldKind::FileName,
    }],
    confirmation: None,
    action: FlowAction::Screenshot,
    cancelled_reply: "Screenshot cancelled.",
    failure_reply: "Sorry, I couldn't take the screenshot.",
};

/// The flow serving a routed utterance, if its intent is multi-turn
#[must_use]
pub fn flow_for(routed: &Routed) -> Option<&'static FlowSpec> {
    match routed.intent {
        Intent::SendMessage => Some(&SEND_MESSAGE),
        Intent::PlayMedia => {
            let text = &routed.utterance;
            if text.contains("spotify") || text.contains("music") {
                Some(&PLAY_SPOTIFY)
            } else {
                Some(&PLAY_YOUTUBE)
            }
        }
        Intent::WebSearch => Some(&WEB_SEARCH),
        Intent::TakeScreenshot => Some(&TAKE_SCREENSHOT),
        _ => None,
    }
}

/// Whether a reply asks to cancel the flow
#[must_use]
pub fn is_cancellation(reply: &str) -> bool {
    let reply = reply.to_lowercase();
    CANCEL_WORDS.iter().any(|word| reply.contains(word))
}

/// Whether a reply to a confirmation question grants it
///
/// The reply must say "yes" or "send" and must not also cancel or negate,
/// so "don't send" and "yes, no, cancel" are refusals.
#[must_use]
pub fn is_affirmative(reply: &str) -> bool {
    let reply = reply.to_lowercase();
    let words: Vec<&str> = reply
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .collect();

    let affirmed = words.iter().any(|w| AFFIRMATIONS.contains(w));
    let negated = words.iter().any(|w| NEGATIONS.contains(w));

    affirmed && !negated && !is_cancellation(&reply)
}

/// Keep alphanumerics, space, '-' and '_'
#[must_use]
pub fn sanitize_file_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .to_string()
}
