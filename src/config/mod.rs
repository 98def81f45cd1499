//! Configuration management for the assistant

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;

use crate::{Error, Result};

pub use file::{ConfigFile, config_file_path};

/// Assistant configuration, loaded once at startup and never mutated
#[derive(Debug)]
pub struct Config {
    /// Listening and speech timing
    pub assistant: AssistantConfig,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// Filesystem locations
    pub paths: PathsConfig,

    /// API keys
    pub api_keys: ApiKeys,

    /// File this configuration was loaded from
    pub source: PathBuf,
}

/// Listening, recognition and speech parameters
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantConfig {
    /// Max wait for speech to start before a listen yields no input
    pub timeout: Duration,

    /// Max duration of a single phrase
    pub phrase_time_limit: Duration,

    /// Silence that ends a phrase
    pub pause_threshold: Duration,

    /// Recognition language (BCP-47 style, e.g. "en-in")
    pub language: String,

    /// Speech synthesis language
    pub tts_language: String,

    /// Slow speech synthesis
    pub tts_slow: bool,

    /// Pause after each spoken reply
    pub speech_delay: Duration,

    /// Timeout applied to provider HTTP calls
    pub provider_timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            phrase_time_limit: Duration::from_secs(8),
            pause_threshold: Duration::from_secs(1),
            language: "en-in".to_string(),
            tts_language: "en".to_string(),
            tts_slow: false,
            speech_delay: Duration::from_millis(500),
            provider_timeout: Duration::from_secs(10),
        }
    }
}

/// STT provider backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SttBackend {
    /// `OpenAI` Whisper
    #[default]
    Whisper,
    /// Deepgram
    Deepgram,
}

/// TTS provider backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TtsBackend {
    /// `OpenAI` speech
    #[default]
    OpenAi,
    /// `ElevenLabs`
    ElevenLabs,
}

/// Voice processing configuration
#[derive(Debug, Clone, Default)]
pub struct VoiceConfig {
    /// Use microphone and speakers (otherwise console I/O)
    pub enabled: bool,

    /// STT backend
    pub stt_backend: SttBackend,

    /// STT model (e.g. "whisper-1", "nova-2")
    pub stt_model: String,

    /// TTS backend
    pub tts_backend: TtsBackend,

    /// TTS model (e.g. "tts-1")
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,
}

/// Filesystem locations used by collaborators
#[derive(Debug, Clone)]
pub struct PathsConfig {
    /// Contacts JSON file
    pub contacts: PathBuf,

    /// Directory screenshots are saved into
    pub screenshots: PathBuf,

    /// Directory for transient synthesized audio
    pub artifacts: PathBuf,

    /// Directory for the log file
    pub logs: PathBuf,
}

/// API keys for external services
#[derive(Debug, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper and TTS)
    pub openai: Option<SecretString>,

    /// Deepgram API key (optional STT)
    pub deepgram: Option<SecretString>,

    /// `ElevenLabs` API key (optional TTS)
    pub elevenlabs: Option<SecretString>,

    /// Brave Search API key
    pub brave: Option<SecretString>,

    /// Serper (Google) Search API key
    pub serper: Option<SecretString>,

    /// `WhatsApp` Cloud API access token
    pub whatsapp: Option<SecretString>,

    /// `WhatsApp` phone number ID
    pub whatsapp_phone_id: Option<String>,
}

impl Config {
    /// Load configuration from `path`, or the default location when `None`
    ///
    /// A missing file is created with defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file is malformed or holds invalid values
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_file_path()
                .ok_or_else(|| Error::Config("could not determine config directory".to_string()))?,
        };

        let fc = file::load_or_create(&path)?;
        Self::from_file(fc, path)
    }

    /// Build configuration from a parsed file (env > file > default)
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a value is out of range
    pub fn from_file(fc: ConfigFile, source: PathBuf) -> Result<Self> {
        let defaults = AssistantConfig::default();
        let a = fc.assistant;

        let assistant = AssistantConfig {
            timeout: positive_secs("timeout", a.timeout, defaults.timeout)?,
            phrase_time_limit: positive_secs(
                "phrase_time_limit",
                a.phrase_time_limit,
                defaults.phrase_time_limit,
            )?,
            pause_threshold: positive_secs(
                "pause_threshold",
                a.pause_threshold,
                defaults.pause_threshold,
            )?,
            language: std::env::var("VOX_LANGUAGE")
                .ok()
                .or(a.language)
                .unwrap_or(defaults.language),
            tts_language: a.tts_language.unwrap_or(defaults.tts_language),
            tts_slow: a.tts_slow.unwrap_or(defaults.tts_slow),
            speech_delay: secs("speech_delay", a.speech_delay, defaults.speech_delay)?,
            provider_timeout: positive_secs(
                "provider_timeout",
                a.provider_timeout,
                defaults.provider_timeout,
            )?,
        };

        let stt_backend = match fc.voice.stt_provider.as_deref() {
            None | Some("whisper") => SttBackend::Whisper,
            Some("deepgram") => SttBackend::Deepgram,
            Some(other) => {
                return Err(Error::Config(format!("unknown stt_provider: {other}")));
            }
        };

        let tts_backend = match fc.voice.tts_provider.as_deref() {
            None | Some("openai") => TtsBackend::OpenAi,
            Some("elevenlabs") => TtsBackend::ElevenLabs,
            Some(other) => {
                return Err(Error::Config(format!("unknown tts_provider: {other}")));
            }
        };

        let voice = VoiceConfig {
            enabled: fc.voice.enabled.unwrap_or(true),
            stt_backend,
            stt_model: std::env::var("VOX_STT_MODEL")
                .ok()
                .or(fc.voice.stt_model)
                .unwrap_or_else(|| match stt_backend {
                    SttBackend::Whisper => "whisper-1".to_string(),
                    SttBackend::Deepgram => "nova-2".to_string(),
                }),
            tts_backend,
            tts_model: std::env::var("VOX_TTS_MODEL")
                .ok()
                .or(fc.voice.tts_model)
                .unwrap_or_else(|| match tts_backend {
                    TtsBackend::OpenAi => "tts-1".to_string(),
                    TtsBackend::ElevenLabs => "eleven_monolingual_v1".to_string(),
                }),
            tts_voice: fc.voice.tts_voice.unwrap_or_else(|| "alloy".to_string()),
        };

        let config_dir = source
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let paths = PathsConfig {
            contacts: std::env::var("VOX_CONTACTS")
                .ok()
                .or(fc.paths.contacts)
                .map_or_else(|| config_dir.join("contacts.json"), PathBuf::from),
            screenshots: fc
                .paths
                .screenshots
                .map_or_else(default_screenshot_dir, PathBuf::from),
            artifacts: fc.paths.artifacts.map_or_else(
                || std::env::temp_dir().join("vox-assistant"),
                PathBuf::from,
            ),
            logs: fc.paths.logs.map_or_else(default_log_dir, PathBuf::from),
        };

        let k = fc.api_keys;
        let api_keys = ApiKeys {
            openai: secret("OPENAI_API_KEY", k.openai),
            deepgram: secret("DEEPGRAM_API_KEY", k.deepgram),
            elevenlabs: secret("ELEVENLABS_API_KEY", k.elevenlabs),
            brave: secret("BRAVE_API_KEY", k.brave),
            serper: secret("SERPER_API_KEY", k.serper),
            whatsapp: secret("WHATSAPP_TOKEN", k.whatsapp),
            whatsapp_phone_id: std::env::var("WHATSAPP_PHONE_ID")
                .ok()
                .or(k.whatsapp_phone_id),
        };

        Ok(Self {
            assistant,
            voice,
            paths,
            api_keys,
            source,
        })
    }
}

/// Log directory named by the config file at `path`, without creating it
///
/// Falls back to [`default_log_dir`] when the file is missing or unreadable,
/// so logging can start before [`Config::load`] runs.
#[must_use]
pub fn log_dir(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .or_else(config_file_path)
        .and_then(|p| std::fs::read_to_string(p).ok())
        .and_then(|content| toml::from_str::<ConfigFile>(&content).ok())
        .and_then(|fc| fc.paths.logs)
        .map_or_else(default_log_dir, PathBuf::from)
}

/// Default log directory: `~/.local/share/vox/logs`
#[must_use]
pub fn default_log_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from("logs"),
        |d| d.data_dir().join("vox").join("logs"),
    )
}

/// Default screenshot directory: the user's pictures directory
fn default_screenshot_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|u| u.picture_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn secret(env: &str, file: Option<String>) -> Option<SecretString> {
    std::env::var(env)
        .ok()
        .or(file)
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

fn secs(name: &str, value: Option<f64>, default: Duration) -> Result<Duration> {
    value.map_or(Ok(default), |v| {
        Duration::try_from_secs_f64(v)
            .map_err(|_| Error::Config(format!("{name} must be a non-negative number of seconds")))
    })
}

fn positive_secs(name: &str, value: Option<f64>, default: Duration) -> Result<Duration> {
    let duration = secs(name, value, default)?;
    if duration.is_zero() {
        return Err(Error::Config(format!("{name} must be greater than zero")));
    }
    Ok(duration)
}
