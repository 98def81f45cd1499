//! Opening URLs in the default browser

use crate::{Error, Result};

/// Open `url` in the default browser
///
/// # Errors
///
/// Returns error if no browser could be launched
pub async fn open_url(url: &str) -> Result<()> {
    let target = url::Url::parse(url).map_err(|e| Error::Provider(format!("invalid URL {url}: {e}")))?;
    tracing::info!(url = %target, "opening in browser");

    let target = target.to_string();
    tokio::task::spawn_blocking(move || open::that(&target))
        .await
        .map_err(|e| Error::Provider(e.to_string()))?
        .map_err(|e| Error::Provider(format!("failed to open browser: {e}")))
}
