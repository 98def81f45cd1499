//! Local machine control: battery, volume, media keys, screenshots

use std::path::{Path, PathBuf};

use super::{BatteryStatus, MediaCommand, VolumeAction};
use crate::{Error, Result};

const POWER_SUPPLY_DIR: &str = "/sys/class/power_supply";

/// Volume step for up/down, in percent
const VOLUME_STEP: u8 = 10;

/// Read the first battery the OS reports
///
/// # Errors
///
/// Returns error if the battery tool fails to run
pub async fn battery() -> Result<Option<BatteryStatus>> {
    if Path::new(POWER_SUPPLY_DIR).is_dir() {
        return Ok(read_sysfs_battery(Path::new(POWER_SUPPLY_DIR)));
    }

    if which::which("pmset").is_ok() {
        let output = run("pmset", &["-g", "batt"]).await?;
        return Ok(parse_pmset(&output));
    }

    Ok(None)
}

fn read_sysfs_battery(dir: &Path) -> Option<BatteryStatus> {
    let read = |path: PathBuf| std::fs::read_to_string(path).ok().map(|s| s.trim().to_string());

    std::fs::read_dir(dir).ok()?.flatten().find_map(|entry| {
        let path = entry.path();
        if read(path.join("type")).as_deref() != Some("Battery") {
            return None;
        }
        let percent = read(path.join("capacity"))?.parse::<u8>().ok()?.min(100);
        let charging = read(path.join("status")).is_some_and(|s| s == "Charging" || s == "Full");
        Some(BatteryStatus { percent, charging })
    })
}

/// Parse `pmset -g batt` output ("... 87%; charging; ...")
fn parse_pmset(output: &str) -> Option<BatteryStatus> {
    let line = output.lines().find(|l| l.contains('%'))?;
    let before = &line[..line.find('%')?];
    let digits: String = before
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let percent = digits.parse::<u8>().ok()?.min(100);
    let charging = line.contains("charging") && !line.contains("discharging");
    Some(BatteryStatus { percent, charging })
}

/// Adjust the default output volume
///
/// # Errors
///
/// Returns error if no supported mixer is installed or it fails
pub async fn set_volume(action: VolumeAction) -> Result<()> {
    if which::which("pactl").is_ok() {
        let step_up = format!("+{VOLUME_STEP}%");
        let step_down = format!("-{VOLUME_STEP}%");
        let args: [&str; 3] = match action {
            VolumeAction::Up => ["set-sink-volume", "@DEFAULT_SINK@", &step_up],
            VolumeAction::Down => ["set-sink-volume", "@DEFAULT_SINK@", &step_down],
            VolumeAction::Mute => ["set-sink-mute", "@DEFAULT_SINK@", "1"],
        };
        run("pactl", &args).await?;
        return Ok(());
    }

    if which::which("osascript").is_ok() {
        let script = match action {
            VolumeAction::Up => format!(
                "set volume output volume ((output volume of (get volume settings)) + {VOLUME_STEP})"
            ),
            VolumeAction::Down => format!(
                "set volume output volume ((output volume of (get volume settings)) - {VOLUME_STEP})"
            ),
            VolumeAction::Mute => "set volume with output muted".to_string(),
        };
        run("osascript", &["-e", &script]).await?;
        return Ok(());
    }

    Err(Error::Unsupported("no volume control (pactl or osascript) found".to_string()))
}

/// Send a media key to the active player
///
/// # Errors
///
/// Returns error if no supported player controller is installed or it fails
pub async fn media_control(command: MediaCommand) -> Result<()> {
    match command {
        MediaCommand::PlayPause => {
            if which::which("playerctl").is_ok() {
                run("playerctl", &["play-pause"]).await?;
            } else if which::which("osascript").is_ok() {
                run(
                    "osascript",
                    &["-e", "tell application \"System Events\" to key code 49"],
                )
                .await?;
            } else {
                return Err(Error::Unsupported(
                    "no media control (playerctl or osascript) found".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Capture the primary monitor into `dir/<name>.png`
///
/// # Errors
///
/// Returns error if capture or saving fails
pub async fn screenshot(dir: &Path, name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{name}.png"));

    let target = path.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let monitors = xcap::Monitor::all().map_err(|e| Error::Provider(e.to_string()))?;
        let monitor = monitors
            .iter()
            .find(|m| m.is_primary())
            .or_else(|| monitors.first())
            .ok_or_else(|| Error::Provider("no monitor found".to_string()))?;

        let image = monitor
            .capture_image()
            .map_err(|e| Error::Provider(format!("screen capture failed: {e}")))?;
        image
            .save(&target)
            .map_err(|e| Error::Provider(format!("failed to save screenshot: {e}")))
    })
    .await
    .map_err(|e| Error::Provider(e.to_string()))??;

    tracing::info!(path = %path.display(), "screenshot saved");
    Ok(path)
}

/// Run a helper program, returning its stdout
async fn run(program: &str, args: &[&str]) -> Result<String> {
    let output = tokio::process::Command::new(program)
        .args(args)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Provider(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pmset() {
        let output = "Now drawing from 'Battery Power'\n -InternalBattery-0 (id=1234)\t87%; discharging; 4:12 remaining present: true\n";
        assert_eq!(
            parse_pmset(output),
            Some(BatteryStatus {
                percent: 87,
                charging: false
            })
        );

        let output = " -InternalBattery-0 (id=1)\t100%; charging; 0:00 remaining";
        assert_eq!(parse_pmset(output).map(|b| b.charging), Some(true));
        assert!(parse_pmset("No batteries").is_none());
    }

    #[test]
    fn test_sysfs_battery() {
        let dir = tempfile::tempdir().unwrap();

        let ac = dir.path().join("AC");
        std::fs::create_dir(&ac).unwrap();
        std::fs::write(ac.join("type"), "Mains\n").unwrap();

        let bat = dir.path().join("BAT0");
        std::fs::create_dir(&bat).unwrap();
        std::fs::write(bat.join("type"), "Battery\n").unwrap();
        std::fs::write(bat.join("capacity"), "42\n").unwrap();
        std::fs::write(bat.join("status"), "Charging\n").unwrap();

        assert_eq!(
            read_sysfs_battery(dir.path()),
            Some(BatteryStatus {
                percent: 42,
                charging: true
            })
        );
    }

    #[test]
    fn test_sysfs_without_battery() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_sysfs_battery(dir.path()).is_none());
    }
}
