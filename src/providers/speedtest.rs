//! Internet throughput measurement against speed.cloudflare.com
//!
//! Runs to completion once started; there is no way to cancel a test in
//! flight.

use std::time::{Duration, Instant};

use super::SpeedReport;
use crate::Result;

const DOWNLOAD_BYTES: usize = 25_000_000;
const UPLOAD_BYTES: usize = 10_000_000;

/// Measure download then upload speed
///
/// # Errors
///
/// Returns error if either transfer fails
pub async fn measure(client: &reqwest::Client) -> Result<SpeedReport> {
    let started = Instant::now();
    let response = client
        .get("https://speed.cloudflare.com/__down")
        .query(&[("bytes", DOWNLOAD_BYTES)])
        .send()
        .await?
        .error_for_status()?;
    let downloaded = response.bytes().await?.len();
    let download_mbps = megabits_per_second(downloaded, started.elapsed());
    tracing::debug!(bytes = downloaded, download_mbps, "download measured");

    let started = Instant::now();
    client
        .post("https://speed.cloudflare.com/__up")
        .header("Content-Type", "application/octet-stream")
        .body(vec![0u8; UPLOAD_BYTES])
        .send()
        .await?
        .error_for_status()?;
    let upload_mbps = megabits_per_second(UPLOAD_BYTES, started.elapsed());
    tracing::debug!(bytes = UPLOAD_BYTES, upload_mbps, "upload measured");

    Ok(SpeedReport {
        download_mbps,
        upload_mbps,
    })
}

/// Throughput of `bytes` transferred over `elapsed`
#[must_use]
pub fn megabits_per_second(bytes: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let bits = bytes as f64 * 8.0;
    bits / secs / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_megabits_per_second() {
        let mbps = megabits_per_second(12_500_000, Duration::from_secs(1));
        assert!((mbps - 100.0).abs() < 1e-9);
        assert!(megabits_per_second(1000, Duration::ZERO).abs() < f64::EPSILON);
    }
}
