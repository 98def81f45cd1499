//! Action providers
//!
//! Each capability the assistant can act on is one call on
//! [`ActionProviders`]. Calls take plain arguments and return a value or an
//! [`Error`](crate::Error); the caller decides what to say about either.

mod browser;
mod device;
mod jokes;
mod messaging;
mod search;
mod speedtest;
mod system;
mod weather;
mod wikipedia;

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::Result;

pub use jokes::JOKES;
pub use search::{SearchResult, WebSearch};
pub use system::SystemProviders;
pub use wikipedia::first_sentences;

/// External capabilities invoked once an intent resolves to an action
#[async_trait]
pub trait ActionProviders: Send + Sync {
    /// Look up a Wikipedia summary
    async fn wikipedia(&self, query: &str) -> Result<WikiLookup>;

    /// Search the web; `None` when results were opened in the browser instead
    async fn web_search(&self, query: &str) -> Result<Option<SearchResult>>;

    /// Open a well-known site
    async fn open_site(&self, site: &Site) -> Result<()>;

    /// Start playback of a query on a media service
    async fn play_media(&self, service: MediaService, query: &str) -> Result<()>;

    /// Deliver a text message to a phone number
    async fn send_message(&self, phone: &str, body: &str) -> Result<()>;

    /// Current temperature; `None` means the caller's own location
    async fn weather(&self, location: Option<&str>) -> Result<WeatherReport>;

    /// Battery state, or `None` if the machine has no battery
    async fn battery(&self) -> Result<Option<BatteryStatus>>;

    /// Capture the screen to `<name>.png`, returning the saved path
    async fn screenshot(&self, name: &str) -> Result<PathBuf>;

    /// Adjust system volume
    async fn set_volume(&self, action: VolumeAction) -> Result<()>;

    /// Control the active media player
    async fn media_control(&self, command: MediaCommand) -> Result<()>;

    /// Measure download and upload throughput
    async fn speed_test(&self) -> Result<SpeedReport>;

    /// A random joke
    async fn joke(&self) -> Result<String>;

    /// Current local time
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Outcome of a Wikipedia lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WikiLookup {
    /// Summary text of the best matching page
    Summary(String),
    /// The query names several pages
    Ambiguous,
    /// No page matched
    NotFound,
}

/// Media services the assistant can play from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaService {
    YouTube,
    Spotify,
}

impl MediaService {
    /// Display name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::YouTube => "YouTube",
            Self::Spotify => "Spotify",
        }
    }

    /// Search page for a query
    #[must_use]
    pub fn search_url(self, query: &str) -> String {
        let query = urlencoding::encode(query.trim());
        match self {
            Self::YouTube => format!("https://www.youtube.com/results?search_query={query}"),
            Self::Spotify => format!("https://open.spotify.com/search/{query}/tracks"),
        }
    }
}

impl fmt::Display for MediaService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A site that can be opened by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub keyword: &'static str,
    pub name: &'static str,
    pub url: &'static str,
}

/// Sites understood by "open ..." commands, in matching order
pub const KNOWN_SITES: &[Site] = &[
    Site {
        keyword: "youtube",
        name: "YouTube",
        url: "https://www.youtube.com/",
    },
    Site {
        keyword: "google",
        name: "Google",
        url: "https://www.google.com/",
    },
    Site {
        keyword: "github",
        name: "GitHub",
        url: "https://github.com/",
    },
    Site {
        keyword: "gmail",
        name: "Gmail",
        url: "https://mail.google.com/",
    },
    Site {
        keyword: "stackoverflow",
        name: "Stack Overflow",
        url: "https://stackoverflow.com/",
    },
];

/// First known site mentioned in an utterance
#[must_use]
pub fn site_for(utterance: &str) -> Option<&'static Site> {
    KNOWN_SITES.iter().find(|site| utterance.contains(site.keyword))
}

/// Current temperature at a place
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherReport {
    pub location: String,
    pub temperature: String,
}

/// Battery charge state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStatus {
    /// Charge, 0 to 100
    pub percent: u8,
    pub charging: bool,
}

/// Volume adjustments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeAction {
    Up,
    Down,
    Mute,
}

impl VolumeAction {
    /// Read the adjustment out of an utterance
    #[must_use]
    pub fn parse(utterance: &str) -> Option<Self> {
        if utterance.contains("up") || utterance.contains("increase") {
            Some(Self::Up)
        } else if utterance.contains("down") || utterance.contains("decrease") {
            Some(Self::Down)
        } else if utterance.contains("mute") {
            Some(Self::Mute)
        } else {
            None
        }
    }
}

/// Media player commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCommand {
    PlayPause,
}

/// Measured throughput in megabits per second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedReport {
    pub download_mbps: f64,
    pub upload_mbps: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_parse() {
        assert_eq!(VolumeAction::parse("volume up"), Some(VolumeAction::Up));
        assert_eq!(VolumeAction::parse("increase the volume"), Some(VolumeAction::Up));
        assert_eq!(VolumeAction::parse("turn volume down"), Some(VolumeAction::Down));
        assert_eq!(VolumeAction::parse("mute volume"), Some(VolumeAction::Mute));
        assert_eq!(VolumeAction::parse("volume"), None);
    }

    #[test]
    fn test_media_urls() {
        assert_eq!(
            MediaService::YouTube.search_url("lofi beats"),
            "https://www.youtube.com/results?search_query=lofi%20beats"
        );
        assert_eq!(
            MediaService::Spotify.search_url("jazz"),
            "https://open.spotify.com/search/jazz/tracks"
        );
    }

    #[test]
    fn test_site_for() {
        assert_eq!(site_for("open github please").map(|s| s.name), Some("GitHub"));
        assert!(site_for("open the pod bay doors").is_none());
    }
}
