//! The dream fields carried on a checkout session's metadata. Written when the
//! session is created and read back, verbatim, when the session completes.
use std::collections::HashMap;

use crate::constants::stripe::metadata as keys;

/// The typed contents of a checkout session's metadata bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DreamMetadata {
    pub title: String,
    pub description: String,
    pub author: String,
    pub country: String,
    pub language: Option<String>,
}

impl DreamMetadata {
    /// Flatten into the key/value bag attached to a checkout session. An absent
    /// language is sent as an empty string.
    pub fn to_metadata(&self) -> HashMap<String, String> {
        [
            (keys::TITLE, self.title.clone()),
            (keys::DESCRIPTION, self.description.clone()),
            (keys::AUTHOR, self.author.clone()),
            (keys::COUNTRY, self.country.clone()),
            (keys::LANGUAGE, self.language.clone().unwrap_or_default()),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
    }

    /// Read the fields back out of a metadata bag.
    ///
    /// Returns `None` when the title is absent or blank, since such a session
    /// can never become a dream. Every other field is optional: text fields
    /// default to empty, and an empty language is treated as absent. Values
    /// are kept exactly as received.
    pub fn from_metadata(bag: &HashMap<String, String>) -> Option<Self> {
        Self::read(|key| bag.get(key).map(String::as_str))
    }

    /// Like [`DreamMetadata::from_metadata`], for metadata still in its JSON
    /// form. Only string values are read; anything else counts as absent, and
    /// metadata which is not an object has no title.
    pub fn from_json(metadata: &serde_json::Value) -> Option<Self> {
        let bag = metadata.as_object()?;
        Self::read(|key| bag.get(key).and_then(serde_json::Value::as_str))
    }

    fn read<'a>(get: impl Fn(&str) -> Option<&'a str>) -> Option<Self> {
        let title = get(keys::TITLE).filter(|title| !title.trim().is_empty())?;
        let text = |key: &str| get(key).unwrap_or_default().to_owned();
        let language = text(keys::LANGUAGE);
        Some(Self {
            title: title.to_owned(),
            description: text(keys::DESCRIPTION),
            author: text(keys::AUTHOR),
            country: text(keys::COUNTRY),
            language: (!language.is_empty()).then_some(language),
        })
    }
}
