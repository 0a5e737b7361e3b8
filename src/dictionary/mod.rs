/*!
 * Dictionary providers for the resolution cascade.
 *
 * Every provider exposes the same dual projection over translation pairs:
 * by exact key and by exact original text. Original-text candidates keep
 * their version tag and are not collapsed at load time; the resolution
 * engine breaks ties when it looks them up.
 */

pub mod community;
pub mod personal;

pub use community::CommunityDictionary;
pub use personal::PersonalDictionary;

use std::collections::HashMap;

/// One candidate translation for an original text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginCandidate {
    /// Candidate translation
    pub translation: String,
    /// Version of the mod the candidate was recorded for
    pub version: Option<String>,
}

/// Key and original-text projections over translation pairs
#[derive(Debug, Clone, Default)]
pub struct DictionaryIndex {
    by_key: HashMap<String, String>,
    by_origin: HashMap<String, Vec<OriginCandidate>>,
}

impl DictionaryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key → translation pair; a later pair for the same key wins
    pub fn insert_key(&mut self, key: &str, translation: &str) {
        self.by_key.insert(key.to_string(), translation.to_string());
    }

    /// Record a candidate translation for an original text
    pub fn insert_origin(&mut self, origin: &str, translation: &str, version: Option<&str>) {
        self.by_origin
            .entry(origin.to_string())
            .or_default()
            .push(OriginCandidate {
                translation: translation.to_string(),
                version: version.map(str::to_string),
            });
    }

    /// Translation recorded for a key
    pub fn by_key(&self, key: &str) -> Option<&str> {
        self.by_key.get(key).map(String::as_str)
    }

    /// All candidates recorded for an original text, in load order
    pub fn by_origin(&self, origin: &str) -> &[OriginCandidate] {
        self.by_origin.get(origin).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of keys in the key projection
    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }

    /// Number of distinct original texts
    pub fn origin_count(&self) -> usize {
        self.by_origin.len()
    }

    /// Whether both projections are empty
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty() && self.by_origin.is_empty()
    }
}
