//! Web search via Brave or Serper

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::Result;

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct BraveSearchResponse {
    web: Option<BraveWebResults>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResults {
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct SerperSearchResponse {
    organic: Option<Vec<SerperResult>>,
}

#[derive(Debug, Deserialize)]
struct SerperResult {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

/// Search API backend
pub enum WebSearch {
    Brave(SecretString),
    Serper(SecretString),
}

impl WebSearch {
    /// Pick a backend from whichever key is configured, Brave first
    #[must_use]
    pub fn from_keys(brave: Option<&SecretString>, serper: Option<&SecretString>) -> Option<Self> {
        let owned = |key: &SecretString| SecretString::from(key.expose_secret().to_owned());
        brave
            .map(|k| Self::Brave(owned(k)))
            .or_else(|| serper.map(|k| Self::Serper(owned(k))))
    }

    /// Top results for a query
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be parsed
    pub async fn search(
        &self,
        client: &reqwest::Client,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        match self {
            Self::Brave(key) => search_brave(client, key, query, limit).await,
            Self::Serper(key) => search_serper(client, key, query, limit).await,
        }
    }
}

async fn search_brave(
    client: &reqwest::Client,
    api_key: &SecretString,
    query: &str,
    limit: usize,
) -> Result<Vec<SearchResult>> {
    let response: BraveSearchResponse = client
        .get("https://api.search.brave.com/res/v1/web/search")
        .header("X-Subscription-Token", api_key.expose_secret())
        .query(&[("q", query), ("count", &limit.to_string())])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response
        .web
        .map(|web| {
            web.results
                .into_iter()
                .map(|r| SearchResult {
                    title: r.title,
                    url: r.url,
                    snippet: r.description,
                })
                .collect()
        })
        .unwrap_or_default())
}

async fn search_serper(
    client: &reqwest::Client,
    api_key: &SecretString,
    query: &str,
    limit: usize,
) -> Result<Vec<SearchResult>> {
    let response: SerperSearchResponse = client
        .post("https://google.serper.dev/search")
        .header("X-API-KEY", api_key.expose_secret())
        .json(&SerperRequest { q: query, num: limit })
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response
        .organic
        .unwrap_or_default()
        .into_iter()
        .map(|r| SearchResult {
            title: r.title,
            url: r.link,
            snippet: r.snippet,
        })
        .collect())
}

/// Google search page for a query
#[must_use]
pub fn google_url(query: &str) -> String {
    format!(
        "https://www.google.com/search?q={}",
        urlencoding::encode(query.trim())
    )
}
