//! Intent classification
//!
//! An utterance is mapped to exactly one [`Intent`] by testing an ordered
//! rule table top to bottom; the first matching rule wins. Classification is
//! a pure function of the normalized utterance text.

mod router;
pub mod rules;
mod wake_word;

use std::fmt;

pub use router::{IntentRouter, classify};
pub use rules::{Argument, Matcher, RULES, Rule};
pub use wake_word::{WAKE_PHRASES, WakeMatch, WakeWordDetector};

/// Closed set of things the user can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    SearchWikipedia,
    PlayMedia,
    OpenSite,
    WebSearch,
    GetTime,
    SendMessage,
    MediaControl,
    TellJoke,
    GetWeather,
    GetBattery,
    TakeScreenshot,
    SetVolume,
    SpeedTest,
    Greet,
    CapabilityQuery,
    Sleep,
    Exit,
    Unknown,
}

impl Intent {
    /// Snake-case identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SearchWikipedia => "search_wikipedia",
            Self::PlayMedia => "play_media",
            Self::OpenSite => "open_site",
            Self::WebSearch => "web_search",
            Self::GetTime => "get_time",
            Self::SendMessage => "send_message",
            Self::MediaControl => "media_control",
            Self::TellJoke => "tell_joke",
            Self::GetWeather => "get_weather",
            Self::GetBattery => "get_battery",
            Self::TakeScreenshot => "take_screenshot",
            Self::SetVolume => "set_volume",
            Self::SpeedTest => "speed_test",
            Self::Greet => "greet",
            Self::CapabilityQuery => "capability_query",
            Self::Sleep => "sleep",
            Self::Exit => "exit",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this intent runs as a multi-turn dialogue flow
    #[must_use]
    pub const fn is_multi_turn(self) -> bool {
        matches!(
            self,
            Self::SendMessage | Self::PlayMedia | Self::WebSearch | Self::TakeScreenshot
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of routing one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routed {
    /// Classified intent
    pub intent: Intent,

    /// Name of the rule that matched (`"none"` for [`Intent::Unknown`])
    pub rule: &'static str,

    /// Argument extracted by the rule, if any
    pub argument: Option<String>,

    /// Normalized utterance
    pub utterance: String,
}

/// Lowercase and trim an utterance
#[must_use]
pub fn normalize(utterance: &str) -> String {
    utterance.trim().to_lowercase()
}
