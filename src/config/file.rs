//! TOML configuration file loading
//!
//! Supports `~/.config/vox/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.
//! When the file does not exist a fully populated default file is written.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::AssistantConfig;
use crate::{Error, Result};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ConfigFile {
    /// Listening and speech timing
    #[serde(default)]
    pub assistant: AssistantFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Filesystem locations
    #[serde(default)]
    pub paths: PathsFileConfig,

    /// API keys for external services
    #[serde(default, skip_serializing_if = "ApiKeysFileConfig::is_empty")]
    pub api_keys: ApiKeysFileConfig,
}

/// Listening and speech timing, durations in seconds
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AssistantFileConfig {
    /// Max wait for speech to start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,

    /// Max duration of a single phrase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phrase_time_limit: Option<f64>,

    /// Silence that ends a phrase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_threshold: Option<f64>,

    /// Recognition language (e.g. "en-in")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Speech synthesis language (e.g. "en")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_language: Option<String>,

    /// Slow speech synthesis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_slow: Option<bool>,

    /// Pause after each spoken reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_delay: Option<f64>,

    /// Timeout for provider HTTP calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_timeout: Option<f64>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VoiceFileConfig {
    /// Enable microphone input and audio output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// STT backend ("whisper" or "deepgram")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stt_provider: Option<String>,

    /// STT model (e.g. "whisper-1")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stt_model: Option<String>,

    /// TTS backend ("openai" or "elevenlabs")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_provider: Option<String>,

    /// TTS model (e.g. "tts-1")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_voice: Option<String>,
}

/// Filesystem locations
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PathsFileConfig {
    /// Contacts JSON file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<String>,

    /// Directory screenshots are saved into
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<String>,

    /// Directory for transient synthesized audio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<String>,

    /// Directory for the log file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub deepgram: Option<String>,
    pub elevenlabs: Option<String>,
    pub brave: Option<String>,
    pub serper: Option<String>,
    pub whatsapp: Option<String>,
    pub whatsapp_phone_id: Option<String>,
}

impl ApiKeysFileConfig {
    fn is_empty(&self) -> bool {
        self.openai.is_none()
            && self.deepgram.is_none()
            && self.elevenlabs.is_none()
            && self.brave.is_none()
            && self.serper.is_none()
            && self.whatsapp.is_none()
            && self.whatsapp_phone_id.is_none()
    }
}

impl ConfigFile {
    /// The file written on first run: every assistant default spelled out
    #[must_use]
    pub fn defaults() -> Self {
        let assistant = AssistantConfig::default();
        Self {
            assistant: AssistantFileConfig {
                timeout: Some(assistant.timeout.as_secs_f64()),
                phrase_time_limit: Some(assistant.phrase_time_limit.as_secs_f64()),
                pause_threshold: Some(assistant.pause_threshold.as_secs_f64()),
                language: Some(assistant.language),
                tts_language: Some(assistant.tts_language),
                tts_slow: Some(assistant.tts_slow),
                speech_delay: Some(assistant.speech_delay.as_secs_f64()),
                provider_timeout: Some(assistant.provider_timeout.as_secs_f64()),
            },
            voice: VoiceFileConfig {
                enabled: Some(true),
                stt_provider: Some("whisper".to_string()),
                stt_model: Some("whisper-1".to_string()),
                tts_provider: Some("openai".to_string()),
                tts_model: Some("tts-1".to_string()),
                tts_voice: Some("alloy".to_string()),
            },
            paths: PathsFileConfig::default(),
            api_keys: ApiKeysFileConfig::default(),
        }
    }
}

/// Load the TOML config file at `path`
///
/// A missing file is created with [`ConfigFile::defaults`]. An unreadable or
/// malformed file is a configuration error.
///
/// # Errors
///
/// Returns `Error::Config` if the file cannot be read, parsed or created
pub fn load_or_create(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        let defaults = ConfigFile::defaults();
        write_config_file(path, &defaults)?;
        tracing::info!(path = %path.display(), "created default config file");
        return Ok(defaults);
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("failed to read {}: {e}", path.display()))
    })?;

    let config = toml::from_str(&content).map_err(|e| {
        Error::Config(format!("failed to parse {}: {e}", path.display()))
    })?;

    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Serialize `config` to `path`, creating parent directories
///
/// # Errors
///
/// Returns `Error::Config` if the file cannot be written
pub fn write_config_file(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::Config(format!("failed to create {}: {e}", parent.display()))
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)
        .map_err(|e| Error::Config(format!("failed to write {}: {e}", path.display())))
}

/// Return the config file path: `~/.config/vox/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Return the config directory: `~/.config/vox`
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("vox"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_overlay() {
        let fc: ConfigFile = toml::from_str(
            r#"
            [assistant]
            timeout = 3.0
            language = "en-us"
            "#,
        )
        .unwrap();

        assert_eq!(fc.assistant.timeout, Some(3.0));
        assert_eq!(fc.assistant.language.as_deref(), Some("en-us"));
        assert!(fc.assistant.phrase_time_limit.is_none());
        assert!(fc.voice.enabled.is_none());
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let fc = load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(fc.assistant.timeout, Some(5.0));

        let reloaded = load_or_create(&path).unwrap();
        assert_eq!(reloaded.assistant.language.as_deref(), Some("en-in"));
        assert_eq!(reloaded.assistant.speech_delay, Some(0.5));
        assert_eq!(reloaded.voice.stt_model.as_deref(), Some("whisper-1"));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[assistant\ntimeout = ").unwrap();

        let err = load_or_create(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
