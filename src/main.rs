use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use vox_assistant::config::{config_file_path, log_dir};
use vox_assistant::voice::{
    AudioCapture, AudioPlayback, DecodedAudio, Speaker, VoiceSpeaker, calculate_energy,
};
use vox_assistant::{Config, ContactBook, Daemon, IoMode, IntentRouter};

/// Log file name inside the log directory
const LOG_FILE: &str = "assistant.log";

/// Vox - voice-driven personal assistant
#[derive(Parser)]
#[command(name = "vox", version, about)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, env = "VOX_CONFIG")]
    config: Option<PathBuf>,

    /// Type commands instead of speaking them
    #[arg(long)]
    text: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
#[allow(clippy::enum_variant_names)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
    /// Show how an utterance would be routed
    Classify {
        /// Utterance words
        #[arg(required = true)]
        utterance: Vec<String>,
    },
    /// List loaded contacts
    Contacts,
    /// Print the config file path
    ConfigPath,
    /// Tail the log file
    Logs {
        /// Number of lines to show
        #[arg(short, long, default_value = "50")]
        lines: usize,
        /// Follow log output
        #[arg(short, long)]
        follow: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, &log_dir(cli.config.as_deref()));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Stderr output filtered by verbosity, plus a JSON log file
fn init_logging(verbose: u8, log_dir: &Path) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => "info,vox_assistant=info",
        1 => "info,vox_assistant=debug",
        2 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let (file_layer, guard) = match std::fs::create_dir_all(log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(EnvFilter::new("info,vox_assistant=debug"));
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!(
                "warning: logging to stderr only, cannot create {}: {e}",
                log_dir.display()
            );
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker().await,
            Command::TestTts { text } => test_tts(config_path, &text).await,
            Command::Classify { utterance } => {
                classify(&utterance.join(" "));
                Ok(())
            }
            Command::Contacts => list_contacts(config_path),
            Command::ConfigPath => print_config_path(config_path),
            Command::Logs { lines, follow } => {
                let config = Config::load(config_path)?;
                cmd_logs(&config.paths.logs, lines, follow)
            }
        };
    }

    let config = Config::load(config_path)?;
    tracing::debug!(source = %config.source.display(), "loaded configuration");

    let mode = if cli.text { IoMode::Text } else { IoMode::Voice };
    let daemon = Daemon::new(config, mode);

    if daemon.mode() == IoMode::Voice {
        tracing::info!("vox ready - say \"wake up\"");
    } else {
        tracing::info!("vox ready (text mode) - type \"wake up\"");
    }

    daemon.run().await?;
    Ok(())
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    capture.start()?;
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.take_buffer();
        let energy = calculate_energy(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: pactl info | grep 'Default Source'");
    println!("  3. Run: arecord -l (to list devices)");

    Ok(())
}

/// Test speaker output with a sine wave
#[allow(clippy::future_not_send)]
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let playback = AudioPlayback::new()?;

    let sample_rate = 24000_u32;
    let frequency = 440.0_f32;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..sample_rate * 2)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3
        })
        .collect();

    println!("Playing {} samples at {} Hz...", samples.len(), sample_rate);
    playback
        .play(&DecodedAudio {
            samples,
            sample_rate,
        })
        .await?;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");
    println!("If you didn't hear anything, check:");
    println!("  1. Run: pactl info | grep 'Default Sink'");
    println!("  2. Run: pactl list sinks short");

    Ok(())
}

/// Synthesize and play one sentence with the configured TTS backend
#[allow(clippy::future_not_send)]
async fn test_tts(config_path: Option<&Path>, text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let config = Config::load(config_path)?;
    let mut speaker = VoiceSpeaker::from_config(&config)?;
    speaker.speak(text).await;

    println!("\n---");
    println!("If you heard the speech, TTS is working!");
    Ok(())
}

fn classify(utterance: &str) {
    let routed = IntentRouter::new().route(utterance);
    println!("intent:   {}", routed.intent);
    println!("rule:     {}", routed.rule);
    match routed.argument {
        Some(argument) => println!("argument: {argument}"),
        None => println!("argument: -"),
    }
}

fn list_contacts(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;
    let book = ContactBook::load(&config.paths.contacts)?;

    if book.is_empty() {
        println!("No contacts in {}", config.paths.contacts.display());
        return Ok(());
    }

    for contact in book.contacts() {
        if contact.aliases.is_empty() {
            println!("{}  {}", contact.name, contact.phone);
        } else {
            println!(
                "{}  {}  (aka {})",
                contact.name,
                contact.phone,
                contact.aliases.join(", ")
            );
        }
    }
    Ok(())
}

fn print_config_path(config_path: Option<&Path>) -> anyhow::Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => config_file_path()
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?,
    };
    println!("{}", path.display());
    Ok(())
}

/// Tail the most recent log file
fn cmd_logs(log_dir: &Path, lines: usize, follow: bool) -> anyhow::Result<()> {
    let latest = std::fs::read_dir(log_dir)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", log_dir.display()))?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(LOG_FILE))
        })
        .max()
        .ok_or_else(|| anyhow::anyhow!("no log file in {}", log_dir.display()))?;

    let mut args = vec![format!("-n{lines}"), latest.display().to_string()];
    if follow {
        args.insert(0, "-f".to_string());
    }

    let status = std::process::Command::new("tail").args(&args).status()?;
    if !status.success() {
        anyhow::bail!("tail exited with {status}");
    }

    Ok(())
}
