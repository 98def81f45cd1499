//! Contact book
//!
//! Contacts are loaded once at startup from a JSON file and never change
//! afterwards. A spoken name resolves by exact name first, then by alias,
//! both case-insensitively.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A messaging contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Primary name
    pub name: String,

    /// Phone identifier used for message delivery (e.g. "+15551234567")
    pub phone: String,

    /// Alternative spoken names
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Resolves spoken names to phone identifiers
pub trait ContactStore: Send + Sync {
    /// Resolve a case-insensitive name or alias to a phone identifier
    ///
    /// # Errors
    ///
    /// Returns `Error::ContactNotFound` if nothing matches
    fn resolve(&self, name: &str) -> Result<String>;
}

/// In-memory contact list
#[derive(Debug, Clone, Default)]
pub struct ContactBook {
    contacts: Vec<Contact>,
}

impl ContactBook {
    /// Create a contact book from a list of contacts
    #[must_use]
    pub const fn new(contacts: Vec<Contact>) -> Self {
        Self { contacts }
    }

    /// Load contacts from a JSON array file
    ///
    /// A missing file yields an empty book.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file exists but cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "contacts file not found");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

        let contacts: Vec<Contact> = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

        tracing::info!(path = %path.display(), count = contacts.len(), "loaded contacts");
        Ok(Self::new(contacts))
    }

    /// All contacts, in file order
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Number of contacts
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Whether the book is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Find a contact by name, then by alias
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Contact> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }

        self.contacts
            .iter()
            .find(|c| normalize_name(&c.name) == wanted)
            .or_else(|| {
                self.contacts
                    .iter()
                    .find(|c| c.aliases.iter().any(|a| normalize_name(a) == wanted))
            })
    }
}

impl ContactStore for ContactBook {
    fn resolve(&self, name: &str) -> Result<String> {
        self.find(name)
            .map(|c| {
                tracing::debug!(name, contact = %c.name, "contact resolved");
                c.phone.clone()
            })
            .ok_or_else(|| Error::ContactNotFound(name.trim().to_string()))
    }
}

/// Lowercase and strip surrounding whitespace and punctuation
///
/// Transcripts often end with a period ("alice.").
fn normalize_name(name: &str) -> String {
    name.trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> ContactBook {
        ContactBook::new(vec![
            Contact {
                name: "alice".to_string(),
                phone: "+1".to_string(),
                aliases: vec!["al".to_string()],
            },
            Contact {
                name: "Mom".to_string(),
                phone: "+2".to_string(),
                aliases: vec!["Mother".to_string(), "mum".to_string()],
            },
        ])
    }

    #[test]
    fn test_resolve_by_alias_case_insensitive() {
        assert_eq!(book().resolve("AL").unwrap(), "+1");
    }

    #[test]
    fn test_resolve_unknown() {
        let err = book().resolve("bob").unwrap_err();
        assert!(matches!(err, Error::ContactNotFound(ref n) if n == "bob"));
    }

    #[test]
    fn test_resolve_by_name() {
        assert_eq!(book().resolve("alice").unwrap(), "+1");
        assert_eq!(book().resolve("mom").unwrap(), "+2");
    }

    #[test]
    fn test_resolve_ignores_transcript_punctuation() {
        assert_eq!(book().resolve(" Mother. ").unwrap(), "+2");
    }

    #[test]
    fn test_empty_name_not_found() {
        assert!(book().resolve("  ").is_err());
    }

    #[test]
    fn test_name_wins_over_alias() {
        let book = ContactBook::new(vec![
            Contact {
                name: "sam".to_string(),
                phone: "+10".to_string(),
                aliases: vec!["max".to_string()],
            },
            Contact {
                name: "max".to_string(),
                phone: "+20".to_string(),
                aliases: vec![],
            },
        ]);
        assert_eq!(book.resolve("max").unwrap(), "+20");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let book = ContactBook::load(&dir.path().join("contacts.json")).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        std::fs::write(
            &path,
            r#"[{"name": "alice", "phone": "+1", "aliases": ["al"]}, {"name": "bob", "phone": "+3"}]"#,
        )
        .unwrap();

        let book = ContactBook::load(&path).unwrap();
        assert_eq!(book.len(), 2);
        assert!(book.contacts()[1].aliases.is_empty());
        assert_eq!(book.resolve("Bob").unwrap(), "+3");
    }

    #[test]
    fn test_load_malformed_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(ContactBook::load(&path), Err(Error::Config(_))));
    }
}
