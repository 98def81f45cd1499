//! Shared test utilities
//!
//! Scripted collaborators that stand in for the microphone, speaker and
//! external services.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use vox_assistant::providers::{
    BatteryStatus, MediaCommand, MediaService, SearchResult, Site, SpeedReport, VolumeAction,
    WeatherReport, WikiLookup,
};
use vox_assistant::{
    ActionProviders, Collaborators, Contact, ContactBook, Error, Result, SessionLoop, Speaker,
    Transcriber,
};

/// Replays a fixed list of utterances, then hears nothing
pub struct ScriptedTranscriber {
    script: VecDeque<Option<String>>,
    listens: Arc<AtomicUsize>,
}

impl ScriptedTranscriber {
    /// Script of heard utterances; `None` entries are silences
    pub fn new<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            script: script.into_iter().map(|s| s.map(Into::into)).collect(),
            listens: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Script with no silences
    pub fn says(utterances: &[&str]) -> Self {
        Self::new(utterances.iter().map(|u| Some(*u)))
    }

    /// Shared listen counter
    pub fn listens(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.listens)
    }
}

#[async_trait(?Send)]
impl Transcriber for ScriptedTranscriber {
    async fn listen(&mut self) -> Option<String> {
        self.listens.fetch_add(1, Ordering::SeqCst);
        match self.script.pop_front() {
            Some(heard) => heard,
            None => {
                // Yield so a racing interrupt can fire
                tokio::time::sleep(Duration::from_millis(5)).await;
                None
            }
        }
    }
}

/// Records everything spoken
#[derive(Clone, Default)]
pub struct RecordingSpeaker {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl RecordingSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn said(&self, text: &str) -> bool {
        self.spoken().iter().any(|s| s == text)
    }

    pub fn last(&self) -> Option<String> {
        self.spoken().last().cloned()
    }
}

#[async_trait(?Send)]
impl Speaker for RecordingSpeaker {
    async fn speak(&mut self, text: &str) {
        self.spoken.lock().unwrap().push(text.to_string());
    }
}

/// One provider invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Wikipedia(String),
    WebSearch(String),
    OpenSite(&'static str),
    PlayMedia(MediaService, String),
    SendMessage { phone: String, body: String },
    Weather(Option<String>),
    Battery,
    Screenshot(String),
    Volume(VolumeAction),
    MediaControl(MediaCommand),
    SpeedTest,
    Joke,
}

/// Records provider calls and returns canned results
#[derive(Clone, Default)]
pub struct RecordingProviders {
    calls: Arc<Mutex<Vec<Call>>>,
    failing: bool,
}

impl RecordingProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Providers whose every call fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SendMessage { phone, body } => Some((phone, body)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing {
            return Err(Error::Provider("service unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ActionProviders for RecordingProviders {
    async fn wikipedia(&self, query: &str) -> Result<WikiLookup> {
        self.record(Call::Wikipedia(query.to_string()))?;
        Ok(WikiLookup::Summary(format!("{query} is a thing.")))
    }

    async fn web_search(&self, query: &str) -> Result<Option<SearchResult>> {
        self.record(Call::WebSearch(query.to_string()))?;
        Ok(Some(SearchResult {
            title: format!("All about {query}"),
            url: "https://example.com/".to_string(),
            snippet: String::new(),
        }))
    }

    async fn open_site(&self, site: &Site) -> Result<()> {
        self.record(Call::OpenSite(site.keyword))
    }

    async fn play_media(&self, service: MediaService, query: &str) -> Result<()> {
        self.record(Call::PlayMedia(service, query.to_string()))
    }

    async fn send_message(&self, phone: &str, body: &str) -> Result<()> {
        self.record(Call::SendMessage {
            phone: phone.to_string(),
            body: body.to_string(),
        })
    }

    async fn weather(&self, location: Option<&str>) -> Result<WeatherReport> {
        self.record(Call::Weather(location.map(ToString::to_string)))?;
        Ok(WeatherReport {
            location: location.unwrap_or("Paris").to_string(),
            temperature: "21°C".to_string(),
        })
    }

    async fn battery(&self) -> Result<Option<BatteryStatus>> {
        self.record(Call::Battery)?;
        Ok(Some(BatteryStatus {
            percent: 80,
            charging: false,
        }))
    }

    async fn screenshot(&self, name: &str) -> Result<PathBuf> {
        self.record(Call::Screenshot(name.to_string()))?;
        Ok(PathBuf::from(format!("/tmp/{name}.png")))
    }

    async fn set_volume(&self, action: VolumeAction) -> Result<()> {
        self.record(Call::Volume(action))
    }

    async fn media_control(&self, command: MediaCommand) -> Result<()> {
        self.record(Call::MediaControl(command))
    }

    async fn speed_test(&self) -> Result<SpeedReport> {
        self.record(Call::SpeedTest)?;
        Ok(SpeedReport {
            download_mbps: 95.5,
            upload_mbps: 20.25,
        })
    }

    async fn joke(&self) -> Result<String> {
        self.record(Call::Joke)?;
        Ok("Why did the robot go on vacation? To recharge.".to_string())
    }

    fn now(&self) -> DateTime<Local> {
        fixed_now()
    }
}

/// 09:30 on a Monday morning
pub fn fixed_now() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 1, 15, 9, 30, 0)
        .single()
        .expect("unambiguous local time")
}

/// One contact: alice, +1, alias "al"
pub fn contacts() -> ContactBook {
    ContactBook::new(vec![Contact {
        name: "alice".to_string(),
        phone: "+1".to_string(),
        aliases: vec!["al".to_string()],
    }])
}

/// Handles kept by a test after the session takes its collaborators
pub struct Harness {
    pub speaker: RecordingSpeaker,
    pub providers: RecordingProviders,
    pub listens: Arc<AtomicUsize>,
}

impl Harness {
    pub fn listens(&self) -> usize {
        self.listens.load(Ordering::SeqCst)
    }
}

/// A dormant session over scripted collaborators
pub fn session(transcriber: ScriptedTranscriber, providers: RecordingProviders) -> (SessionLoop, Harness) {
    let speaker = RecordingSpeaker::new();
    let listens = transcriber.listens();

    let session = SessionLoop::new(Collaborators {
        transcriber: Box::new(transcriber),
        speaker: Box::new(speaker.clone()),
        providers: Arc::new(providers.clone()),
        contacts: Arc::new(contacts()),
    });

    (
        session,
        Harness {
            speaker,
            providers,
            listens,
        },
    )
}
