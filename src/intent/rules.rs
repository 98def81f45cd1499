//! Ordered keyword rule table
//!
//! Rules are tested top to bottom and the first match wins, so a more
//! specific phrase must appear above any weaker rule that overlaps it
//! ("play on youtube" above "open" + "youtube", "stop playing" above "stop").

use super::Intent;

/// Keyword predicate over a normalized utterance
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Substring containment
    Phrase(&'static str),
    /// Containment as a whole token, bounded by non-alphanumerics
    ///
    /// Only for short keywords that occur inside common words ("hi", "rest").
    Word(&'static str),
    /// First alternative that matches
    AnyOf(&'static [Self]),
    /// Every part must match
    AllOf(&'static [Self]),
}

impl Matcher {
    /// Byte offset just past the match, if the utterance matches
    ///
    /// For `AllOf` this is the furthest end of all parts.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<usize> {
        match self {
            Self::Phrase(phrase) => text.find(phrase).map(|pos| pos + phrase.len()),
            Self::Word(word) => find_word(text, word),
            Self::AnyOf(alternatives) => alternatives.iter().find_map(|m| m.find(text)),
            Self::AllOf(parts) => parts
                .iter()
                .map(|m| m.find(text))
                .try_fold(0, |end, found| found.map(|f| end.max(f))),
        }
    }

    /// Whether the utterance matches
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.find(text).is_some()
    }
}

/// How a rule extracts its argument from the utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    /// No argument
    None,
    /// Text following the matched keywords
    Tail,
    /// Text following a marker, when the marker is present
    After(&'static str),
    /// Utterance with every occurrence of a keyword removed
    Strip(&'static str),
}

impl Argument {
    /// Extract the argument given the match end offset
    #[must_use]
    pub fn extract(self, text: &str, match_end: usize) -> Option<String> {
        let raw = match self {
            Self::None => return None,
            Self::Tail => text.get(match_end..)?.to_string(),
            Self::After(marker) => {
                let pos = text.find(marker)?;
                text[pos + marker.len()..].to_string()
            }
            Self::Strip(keyword) => text.replace(keyword, " "),
        };

        let cleaned = trim_fillers(&raw);
        (!cleaned.is_empty()).then_some(cleaned)
    }
}

/// A single routing rule
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Rule name, for logs and tests
    pub name: &'static str,
    /// Predicate over the utterance
    pub matcher: Matcher,
    /// Intent produced on match
    pub intent: Intent,
    /// Argument extraction
    pub argument: Argument,
}

/// Words that end the session
pub const EXIT_WORDS: Matcher = Matcher::AnyOf(&[
    Matcher::Phrase("goodbye"),
    Matcher::Phrase("exit"),
    Matcher::Word("quit"),
]);

/// Site keywords understood by the `open_site` rule
pub const SITE_KEYWORDS: &[&str] = &["youtube", "google", "github", "gmail", "stackoverflow"];

/// The routing table, in priority order
pub static RULES: &[Rule] = &[
    Rule {
        name: "wikipedia",
        matcher: Matcher::Phrase("wikipedia"),
        intent: Intent::SearchWikipedia,
        argument: Argument::Strip("wikipedia"),
    },
    Rule {
        name: "play_on_youtube",
        matcher: Matcher::AnyOf(&[
            Matcher::Phrase("play on youtube"),
            Matcher::Phrase("youtube play"),
        ]),
        intent: Intent::PlayMedia,
        argument: Argument::Tail,
    },
    Rule {
        name: "play_music",
        matcher: Matcher::AnyOf(&[Matcher::Phrase("spotify"), Matcher::Phrase("music")]),
        intent: Intent::PlayMedia,
        argument: Argument::Tail,
    },
    Rule {
        name: "open_site",
        matcher: Matcher::AllOf(&[
            Matcher::Word("open"),
            Matcher::AnyOf(&[
                Matcher::Word("youtube"),
                Matcher::Word("google"),
                Matcher::Word("github"),
                Matcher::Word("gmail"),
                Matcher::Word("stackoverflow"),
            ]),
        ]),
        intent: Intent::OpenSite,
        argument: Argument::None,
    },
    Rule {
        name: "google_search",
        matcher: Matcher::AllOf(&[Matcher::Word("google"), Matcher::Word("search")]),
        intent: Intent::WebSearch,
        argument: Argument::Tail,
    },
    Rule {
        name: "search_for",
        matcher: Matcher::Phrase("search for"),
        intent: Intent::WebSearch,
        argument: Argument::Tail,
    },
    Rule {
        name: "time",
        matcher: Matcher::AnyOf(&[Matcher::Word("time"), Matcher::Word("date")]),
        intent: Intent::GetTime,
        argument: Argument::None,
    },
    Rule {
        name: "send_message",
        matcher: Matcher::AnyOf(&[
            Matcher::Phrase("whatsapp"),
            Matcher::Phrase("send message"),
            Matcher::Phrase("send a message"),
        ]),
        intent: Intent::SendMessage,
        argument: Argument::After(" to "),
    },
    Rule {
        name: "media_control",
        matcher: Matcher::AnyOf(&[Matcher::Phrase("pause"), Matcher::Phrase("stop playing")]),
        intent: Intent::MediaControl,
        argument: Argument::None,
    },
    Rule {
        name: "joke",
        matcher: Matcher::Phrase("joke"),
        intent: Intent::TellJoke,
        argument: Argument::None,
    },
    Rule {
        name: "weather",
        matcher: Matcher::Phrase("weather"),
        intent: Intent::GetWeather,
        argument: Argument::After(" in "),
    },
    Rule {
        name: "battery",
        matcher: Matcher::Phrase("battery"),
        intent: Intent::GetBattery,
        argument: Argument::None,
    },
    Rule {
        name: "screenshot",
        matcher: Matcher::Phrase("screenshot"),
        intent: Intent::TakeScreenshot,
        argument: Argument::Tail,
    },
    Rule {
        name: "volume",
        matcher: Matcher::Phrase("volume"),
        intent: Intent::SetVolume,
        argument: Argument::None,
    },
    Rule {
        name: "speed_test",
        matcher: Matcher::AnyOf(&[
            Matcher::Phrase("internet speed"),
            Matcher::Phrase("speed test"),
        ]),
        intent: Intent::SpeedTest,
        argument: Argument::None,
    },
    Rule {
        name: "greet",
        matcher: Matcher::AnyOf(&[
            Matcher::Word("hello"),
            Matcher::Word("hi"),
            Matcher::Phrase("how are you"),
        ]),
        intent: Intent::Greet,
        argument: Argument::None,
    },
    Rule {
        name: "capabilities",
        matcher: Matcher::Phrase("what can you do"),
        intent: Intent::CapabilityQuery,
        argument: Argument::None,
    },
    Rule {
        name: "sleep",
        matcher: Matcher::AnyOf(&[
            Matcher::Word("rest"),
            Matcher::Phrase("sleep"),
            Matcher::Word("stop"),
        ]),
        intent: Intent::Sleep,
        argument: Argument::None,
    },
    Rule {
        name: "exit",
        matcher: EXIT_WORDS,
        intent: Intent::Exit,
        argument: Argument::None,
    },
];

const LEADING_FILLERS: &[&str] = &["to", "for", "about", "on", "search", "called", "named"];
const TRAILING_FILLERS: &[&str] = &["on", "please"];

/// Collapse whitespace, trim punctuation and drop filler words at the edges
fn trim_fillers(raw: &str) -> String {
    let mut words: Vec<&str> = raw
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation() && c != '\''))
        .filter(|w| !w.is_empty())
        .collect();

    while words.first().is_some_and(|w| LEADING_FILLERS.contains(w)) {
        words.remove(0);
    }
    while words.last().is_some_and(|w| TRAILING_FILLERS.contains(w)) {
        words.pop();
    }

    words.join(" ")
}

/// Find `word` as a whole token, returning the byte offset past it
fn find_word(text: &str, word: &str) -> Option<usize> {
    if word.is_empty() {
        return None;
    }

    let mut from = 0;
    while let Some(pos) = text[from..].find(word) {
        let start = from + pos;
        let end = start + word.len();
        let bounded_before = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let bounded_after = text[end..].chars().next().is_none_or(|c| !c.is_alphanumeric());

        if bounded_before && bounded_after {
            return Some(end);
        }
        from = end;
    }

    None
}
