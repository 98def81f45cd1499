//! `WhatsApp` message delivery

use secrecy::{ExposeSecret, SecretString};

use super::browser;
use crate::{Error, Result};

/// `WhatsApp` Cloud API sender
pub struct WhatsAppClient {
    access_token: SecretString,
    phone_number_id: String,
}

impl WhatsAppClient {
    /// Create a sender for a business phone number
    #[must_use]
    pub const fn new(access_token: SecretString, phone_number_id: String) -> Self {
        Self {
            access_token,
            phone_number_id,
        }
    }

    /// Send a text message
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or is rejected
    pub async fn send_text(&self, client: &reqwest::Client, to: &str, text: &str) -> Result<()> {
        let url = format!(
            "https://graph.facebook.com/v18.0/{}/messages",
            self.phone_number_id
        );

        let body = serde_json::json!({
            "messaging_product": "whatsapp",
            "to": wire_number(to),
            "type": "text",
            "text": { "body": text }
        });

        let response = client
            .post(&url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Provider(format!("WhatsApp API error: {status} - {body}")));
        }

        tracing::debug!(to, "WhatsApp message sent");
        Ok(())
    }
}

/// Hand the message to `WhatsApp` in the browser with the text prefilled
///
/// # Errors
///
/// Returns error if the browser cannot be opened
pub async fn open_chat(to: &str, text: &str) -> Result<()> {
    let url = format!(
        "https://wa.me/{}?text={}",
        wire_number(to),
        urlencoding::encode(text)
    );
    browser::open_url(&url).await
}

/// Digits only, as both the Cloud API and wa.me expect
fn wire_number(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_number() {
        assert_eq!(wire_number("+1 (555) 010-2030"), "15550102030");
        assert_eq!(wire_number("+91 98765 43210"), "919876543210");
    }
}
