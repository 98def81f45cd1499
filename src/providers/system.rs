//! Action providers backed by web services and the local OS

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::messaging::{self, WhatsAppClient};
use super::search::{self, SearchResult, WebSearch};
use super::{
    ActionProviders, BatteryStatus, MediaCommand, MediaService, Site, SpeedReport, VolumeAction,
    WeatherReport, WikiLookup, browser, device, jokes, speedtest, weather, wikipedia,
};
use crate::config::Config;
use crate::{Error, Result};

const USER_AGENT: &str = concat!("vox-assistant/", env!("CARGO_PKG_VERSION"));

/// Delay before a screenshot so the user can arrange the screen
const SCREENSHOT_DELAY: Duration = Duration::from_secs(3);

/// Real provider set
pub struct SystemProviders {
    client: reqwest::Client,
    transfer_client: reqwest::Client,
    search: Option<WebSearch>,
    whatsapp: Option<WhatsAppClient>,
    wiki_language: String,
    screenshots: PathBuf,
}

impl SystemProviders {
    /// Build providers from configuration
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.assistant.provider_timeout)
            .build()?;

        // Speed tests run as long as they take
        let transfer_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(config.assistant.provider_timeout)
            .build()?;

        let keys = &config.api_keys;
        let search = WebSearch::from_keys(keys.brave.as_ref(), keys.serper.as_ref());
        let whatsapp = match (&keys.whatsapp, &keys.whatsapp_phone_id) {
            (Some(token), Some(phone_id)) => Some(WhatsAppClient::new(
                SecretString::from(token.expose_secret().to_owned()),
                phone_id.clone(),
            )),
            _ => None,
        };

        tracing::debug!(
            search = search.is_some(),
            whatsapp = whatsapp.is_some(),
            "action providers configured"
        );

        Ok(Self {
            client,
            transfer_client,
            search,
            whatsapp,
            wiki_language: wiki_language(&config.assistant.language),
            screenshots: config.paths.screenshots.clone(),
        })
    }
}

#[async_trait]
impl ActionProviders for SystemProviders {
    async fn wikipedia(&self, query: &str) -> Result<WikiLookup> {
        wikipedia::lookup(&self.client, &self.wiki_language, query).await
    }

    async fn web_search(&self, query: &str) -> Result<Option<SearchResult>> {
        if let Some(search) = &self.search {
            let top = search.search(&self.client, query, 3).await?.into_iter().next();
            if let Some(result) = &top {
                browser::open_url(&result.url).await?;
            }
            return Ok(top);
        }

        browser::open_url(&search::google_url(query)).await?;
        Ok(None)
    }

    async fn open_site(&self, site: &Site) -> Result<()> {
        browser::open_url(site.url).await
    }

    async fn play_media(&self, service: MediaService, query: &str) -> Result<()> {
        browser::open_url(&service.search_url(query)).await
    }

    async fn send_message(&self, phone: &str, body: &str) -> Result<()> {
        match &self.whatsapp {
            Some(whatsapp) => whatsapp.send_text(&self.client, phone, body).await,
            None => messaging::open_chat(phone, body).await,
        }
    }

    async fn weather(&self, location: Option<&str>) -> Result<WeatherReport> {
        weather::current(&self.client, location).await
    }

    async fn battery(&self) -> Result<Option<BatteryStatus>> {
        device::battery().await
    }

    async fn screenshot(&self, name: &str) -> Result<PathBuf> {
        tokio::time::sleep(SCREENSHOT_DELAY).await;
        device::screenshot(&self.screenshots, name).await
    }

    async fn set_volume(&self, action: VolumeAction) -> Result<()> {
        device::set_volume(action).await
    }

    async fn media_control(&self, command: MediaCommand) -> Result<()> {
        device::media_control(command).await
    }

    async fn speed_test(&self) -> Result<SpeedReport> {
        speedtest::measure(&self.transfer_client).await
    }

    async fn joke(&self) -> Result<String> {
        jokes::random()
            .map(ToString::to_string)
            .ok_or_else(|| Error::Provider("no jokes available".to_string()))
    }
}

/// Wikipedia subdomain for a recognition language tag ("en-in" is "en")
fn wiki_language(tag: &str) -> String {
    let primary = tag.split(['-', '_']).next().unwrap_or_default().to_lowercase();
    if primary.is_empty() || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
        "en".to_string()
    } else {
        primary
    }
}
