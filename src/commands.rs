//! Single-shot commands
//!
//! Intents that need no follow-up questions run here: one provider call and
//! a spoken reply. A failed call is logged and answered with an apology for
//! that intent.

use crate::intent::{Intent, Routed};
use crate::providers::{ActionProviders, MediaCommand, VolumeAction, WikiLookup, site_for};
use crate::voice::Speaker;
use crate::{Error, Result};

/// Answer to "what can you do"
pub const CAPABILITIES_REPLY: &str = "I can help you with many things like searching Wikipedia, playing YouTube videos, sending WhatsApp messages, checking weather, battery status, taking screenshots, controlling volume, and much more!";

/// Answer to an unrecognized command
pub const UNKNOWN_REPLY: &str = "I didn't understand that command. Please try again or say 'what can you do' to see available commands.";

/// Run a single-shot command, speaking its reply or an apology
#[allow(clippy::future_not_send)]
pub async fn run(routed: &Routed, providers: &dyn ActionProviders, speaker: &mut dyn Speaker) {
    tracing::debug!(intent = %routed.intent, argument = ?routed.argument, "running command");

    if let Err(e) = execute(routed, providers, speaker).await {
        tracing::warn!(intent = %routed.intent, error = %e, "command failed");
        speaker.speak(apology(routed.intent)).await;
    }
}

#[allow(clippy::future_not_send)]
async fn execute(
    routed: &Routed,
    providers: &dyn ActionProviders,
    speaker: &mut dyn Speaker,
) -> Result<()> {
    let argument = routed.argument.as_deref();

    match routed.intent {
        Intent::SearchWikipedia => {
            let Some(query) = argument else {
                speaker.speak("Please specify what to search for.").await;
                return Ok(());
            };
            speaker.speak("Searching Wikipedia...").await;
            match providers.wikipedia(query).await? {
                WikiLookup::Summary(summary) => {
                    speaker.speak("According to Wikipedia:").await;
                    speaker.speak(&summary).await;
                }
                WikiLookup::Ambiguous => {
                    speaker
                        .speak("Multiple results found. Please be more specific.")
                        .await;
                }
                WikiLookup::NotFound => {
                    speaker.speak("No Wikipedia page found for that query.").await;
                }
            }
        }
        Intent::OpenSite => {
            let site = site_for(&routed.utterance)
                .ok_or_else(|| Error::Provider(format!("no known site in {:?}", routed.utterance)))?;
            providers.open_site(site).await?;
            speaker.speak(&format!("Opening {}", site.name)).await;
        }
        Intent::GetTime => {
            let now = providers.now();
            speaker
                .speak(&format!("The time is {}", now.format("%I:%M %p")))
                .await;
            speaker
                .speak(&format!("Today is {}", now.format("%A, %B %d, %Y")))
                .await;
        }
        Intent::MediaControl => {
            providers.media_control(MediaCommand::PlayPause).await?;
            speaker.speak("Paused").await;
        }
        Intent::TellJoke => {
            let joke = providers.joke().await?;
            speaker.speak(&joke).await;
        }
        Intent::GetWeather => {
            speaker.speak("Checking weather information...").await;
            let report = providers.weather(argument).await?;
            speaker
                .speak(&format!(
                    "The current temperature in {} is {}",
                    report.location, report.temperature
                ))
                .await;
        }
        Intent::GetBattery => match providers.battery().await? {
            Some(battery) => {
                speaker
                    .speak(&format!("Battery is at {} percent", battery.percent))
                    .await;
                speaker.speak(battery_remark(battery.percent)).await;
            }
            None => speaker.speak("Unable to get battery information.").await,
        },
        Intent::SetVolume => match VolumeAction::parse(&routed.utterance) {
            Some(action) => {
                providers.set_volume(action).await?;
                speaker.speak(volume_reply(action)).await;
            }
            None => speaker.speak("I didn't understand the volume command.").await,
        },
        Intent::SpeedTest => {
            speaker.speak("Testing internet speed. Please wait...").await;
            let report = providers.speed_test().await?;
            speaker
                .speak(&format!(
                    "Download speed is {:.2} megabits per second",
                    report.download_mbps
                ))
                .await;
            speaker
                .speak(&format!(
                    "Upload speed is {:.2} megabits per second",
                    report.upload_mbps
                ))
                .await;
        }
        Intent::Greet => {
            let reply = if routed.utterance.contains("how are you") {
                "I'm doing well, thank you for asking! How can I assist you today?"
            } else {
                "Hello! How can I help you?"
            };
            speaker.speak(reply).await;
        }
        Intent::CapabilityQuery => speaker.speak(CAPABILITIES_REPLY).await,
        Intent::Unknown => speaker.speak(UNKNOWN_REPLY).await,
        Intent::SendMessage
        | Intent::PlayMedia
        | Intent::WebSearch
        | Intent::TakeScreenshot
        | Intent::Sleep
        | Intent::Exit => {
            return Err(Error::Unsupported(format!(
                "{} is not a single-shot command",
                routed.intent
            )));
        }
    }

    Ok(())
}

/// Remark following the battery percentage
#[must_use]
pub const fn battery_remark(percent: u8) -> &'static str {
    match percent {
        75.. => "Battery level is excellent.",
        50..=74 => "Battery level is good.",
        25..=49 => "Battery level is moderate. Consider charging soon.",
        15..=24 => "Battery is getting low. Please charge.",
        _ => "Battery is very low. Please charge immediately.",
    }
}

const fn volume_reply(action: VolumeAction) -> &'static str {
    match action {
        VolumeAction::Up => "Volume increased",
        VolumeAction::Down => "Volume decreased",
        VolumeAction::Mute => "Volume muted",
    }
}

/// Apology spoken when an intent's provider call fails
#[must_use]
pub const fn apology(intent: Intent) -> &'static str {
    match intent {
        Intent::SearchWikipedia => "Sorry, I couldn't search Wikipedia right now.",
        Intent::OpenSite => "Sorry, I couldn't open that site.",
        Intent::GetTime => "Sorry, I couldn't get the current time.",
        Intent::MediaControl => "Sorry, I couldn't control playback.",
        Intent::TellJoke => "Sorry, I couldn't get a joke right now.",
        Intent::GetWeather => "Sorry, I couldn't get the weather information.",
        Intent::GetBattery => "Sorry, I couldn't check the battery status.",
        Intent::SetVolume => "Sorry, I couldn't control the volume.",
        Intent::SpeedTest => "Sorry, I couldn't test the internet speed.",
        _ => "Sorry, I encountered an error processing that command.",
    }
}
