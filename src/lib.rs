//! Vox - voice-driven personal assistant
//!
//! This library provides the core of the assistant:
//! - Intent routing over an ordered keyword rule table
//! - Multi-turn dialogue flows (message, media, search, screenshot)
//! - The dormant / active / terminated session loop
//! - Voice and action adapters behind narrow traits
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Collaborators                     │
//! │  Transcriber  │  Speaker  │  ActionProviders  │ ... │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                    SessionLoop                       │
//! │   Wake words  │  IntentRouter  │  DialogueController │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │               Commands and flows                     │
//! │  Wikipedia │ WhatsApp │ Weather │ Volume │ ...       │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod contacts;
pub mod daemon;
pub mod dialogue;
pub mod error;
pub mod intent;
pub mod providers;
pub mod session;
pub mod voice;

pub use config::Config;
pub use contacts::{Contact, ContactBook, ContactStore};
pub use daemon::{Daemon, IoMode, run_session};
pub use dialogue::{DialogueController, DialogueSession, FlowSpec, Stage};
pub use error::{Error, ErrorClass, Result};
pub use intent::{Intent, IntentRouter, Routed, WakeWordDetector, classify};
pub use providers::{ActionProviders, SystemProviders};
pub use session::{Collaborators, SessionLoop, SessionState};
pub use voice::{Speaker, Transcriber};
