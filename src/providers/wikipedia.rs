//! Wikipedia summaries via the MediaWiki and REST APIs

use serde::Deserialize;

use super::WikiLookup;
use crate::{Error, Result};

/// Sentences read out of a summary
const SUMMARY_SENTENCES: usize = 3;

#[derive(Debug, Deserialize)]
struct PageSummary {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    extract: String,
}

/// Resolve a query to the best matching title, then fetch its summary
///
/// # Errors
///
/// Returns error if either request fails
pub async fn lookup(client: &reqwest::Client, language: &str, query: &str) -> Result<WikiLookup> {
    let base = format!("https://{language}.wikipedia.org");

    // opensearch answers [query, [titles], [descriptions], [urls]]
    let found: serde_json::Value = client
        .get(format!("{base}/w/api.php"))
        .query(&[
            ("action", "opensearch"),
            ("search", query),
            ("limit", "1"),
            ("namespace", "0"),
            ("format", "json"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let Some(title) = first_title(&found) else {
        tracing::debug!(query, "no Wikipedia title matched");
        return Ok(WikiLookup::NotFound);
    };

    let response = client
        .get(format!(
            "{base}/api/rest_v1/page/summary/{}",
            urlencoding::encode(&title.replace(' ', "_"))
        ))
        .send()
        .await?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(WikiLookup::NotFound);
    }

    let summary: PageSummary = response.error_for_status()?.json().await?;
    tracing::debug!(title, kind = %summary.kind, "Wikipedia summary fetched");

    if summary.kind == "disambiguation" {
        return Ok(WikiLookup::Ambiguous);
    }

    let text = first_sentences(&summary.extract, SUMMARY_SENTENCES);
    if text.is_empty() {
        return Err(Error::Provider(format!("empty Wikipedia summary for {title}")));
    }

    Ok(WikiLookup::Summary(text))
}

fn first_title(opensearch: &serde_json::Value) -> Option<String> {
    opensearch
        .get(1)?
        .get(0)?
        .as_str()
        .map(ToString::to_string)
}

/// Leading `count` sentences of `text`
#[must_use]
pub fn first_sentences(text: &str, count: usize) -> String {
    let mut end = text.len();
    let mut seen = 0;

    for (i, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            let next = text[i + c.len_utf8()..].chars().next();
            if next.is_none_or(char::is_whitespace) {
                seen += 1;
                if seen == count {
                    end = i + c.len_utf8();
                    break;
                }
            }
        }
    }

    text[..end].trim().to_string()
}
