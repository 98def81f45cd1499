//! Error types for the assistant

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the assistant
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Listening timed out or nothing intelligible was heard
    #[error("no input received")]
    NoInput,

    /// The user cancelled the current flow
    #[error("cancelled by user")]
    UserAbort,

    /// No contact matched the spoken name
    #[error("contact not found: {0}")]
    ContactNotFound(String),

    /// An action provider call failed
    #[error("provider error: {0}")]
    Provider(String),

    /// Capability not available on this platform
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("toml error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// User-facing classification of an [`Error`]
///
/// Every failure the assistant can observe falls into exactly one class.
/// Only `FatalStartup` is allowed to end the process; the others are turned
/// into a spoken reply at the flow or command boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Listening timed out or was unintelligible
    NoInput,
    /// Explicit cancellation keyword
    UserAbort,
    /// Spoken name matched no contact
    ContactNotFound,
    /// A collaborator call failed
    ProviderFailure,
    /// Configuration or audio device initialization failed
    FatalStartup,
}

impl Error {
    /// Classify this error
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Config(_) | Self::Audio(_) => ErrorClass::FatalStartup,
            Self::NoInput => ErrorClass::NoInput,
            Self::UserAbort => ErrorClass::UserAbort,
            Self::ContactNotFound(_) => ErrorClass::ContactNotFound,
            Self::Stt(_)
            | Self::Tts(_)
            | Self::Provider(_)
            | Self::Unsupported(_)
            | Self::Io(_)
            | Self::Http(_)
            | Self::Serialization(_)
            | Self::Toml(_)
            | Self::TomlSer(_) => ErrorClass::ProviderFailure,
        }
    }

    /// Whether this error must halt the process
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self.class(), ErrorClass::FatalStartup)
    }
}
