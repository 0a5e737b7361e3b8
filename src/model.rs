/*!
 * Shared data model for extraction and resolution.
 *
 * `ExtractionResult` is produced by the aggregator and consumed by the
 * resolution engine; `TranslationResult` is what the engine hands to the
 * batch client and the regenerator.
 */

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Serialization format of a language file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LangFormat {
    /// Structured key/value markup (`en_us.json`)
    Json,
    /// Flat `key=value` markup (`en_us.lang`)
    Lang,
}

impl LangFormat {
    /// File extension, also used as the namespace disambiguation suffix
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Lang => "lang",
        }
    }

    /// Detect the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "lang" => Some(Self::Lang),
            _ => None,
        }
    }
}

impl fmt::Display for LangFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// Which source produced the translation of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    /// Target-language file shipped inside the mod archive
    Bundled,
    /// Personal dictionary, matched by key
    PersonalKey,
    /// Personal dictionary, matched by original text
    PersonalOrigin,
    /// Original contains no Latin letters and is copied as-is
    Passthrough,
    /// Third-party translated resource pack
    PackKey,
    /// Community dictionary, matched by key
    CommunityKey,
    /// Community dictionary, matched by original text
    CommunityOrigin,
    /// Filled by the batch translation client
    Ai,
    /// Edited by hand after the decision pass
    Manual,
    /// No valid translation found
    Pending,
}

impl SourceTag {
    /// Short label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bundled => "bundled",
            Self::PersonalKey => "personal[key]",
            Self::PersonalOrigin => "personal[origin]",
            Self::Passthrough => "passthrough",
            Self::PackKey => "pack[key]",
            Self::CommunityKey => "community[key]",
            Self::CommunityOrigin => "community[origin]",
            Self::Ai => "ai",
            Self::Manual => "manual",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One resolved text key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    /// Namespace the key belongs to
    pub namespace: String,
    /// Text key
    pub key: String,
    /// Original-language value
    pub original: String,
    /// Resolved translation, `None` while pending
    pub translation: Option<String>,
    /// Cascade step (or later edit) that produced the translation
    pub source: SourceTag,
}

impl LanguageEntry {
    /// Create a pending entry
    pub fn pending(namespace: &str, key: &str, original: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            key: key.to_string(),
            original: original.to_string(),
            translation: None,
            source: SourceTag::Pending,
        }
    }

    /// Whether this entry still needs a translation
    pub fn is_pending(&self) -> bool {
        self.translation.as_deref().is_none_or(str::is_empty)
    }
}

/// Metadata about one namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceInfo {
    /// Namespace id, suffixed with the format when the namespace ships both formats
    pub name: String,
    /// Directory name under `assets/`
    pub asset_namespace: String,
    /// File name of the archive the namespace was first seen in
    pub archive_name: String,
    /// Serialization format
    pub format: LangFormat,
    /// Verbatim original file text, used as the regeneration template
    pub raw_text: String,
}

/// Aggregated language data for one run
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    /// Original-language dictionaries per namespace
    pub originals: IndexMap<String, IndexMap<String, String>>,
    /// Bundled target-language dictionaries per namespace
    pub bundled: IndexMap<String, IndexMap<String, String>>,
    /// Namespace metadata
    pub namespaces: IndexMap<String, NamespaceInfo>,
    /// Pooled third-party pack translations, keyed without namespace scoping
    pub pack_translations: HashMap<String, String>,
}

impl ExtractionResult {
    /// Number of namespaces
    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    /// Total number of original keys across namespaces
    pub fn key_count(&self) -> usize {
        self.originals.values().map(IndexMap::len).sum()
    }

    /// Whether any namespace holding `key` has exactly `value` as its original
    pub fn is_original_value(&self, key: &str, value: &str) -> bool {
        self.originals
            .values()
            .filter_map(|dict| dict.get(key))
            .any(|original| original == value)
    }
}

/// Per-run counters of which source won each key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceStats {
    counts: HashMap<SourceTag, usize>,
}

impl SourceStats {
    /// Record one entry
    pub fn record(&mut self, tag: SourceTag) {
        *self.counts.entry(tag).or_insert(0) += 1;
    }

    /// Move one entry from one tag to another
    pub fn reassign(&mut self, from: SourceTag, to: SourceTag) {
        if let Some(count) = self.counts.get_mut(&from) {
            *count = count.saturating_sub(1);
        }
        self.record(to);
    }

    /// Count for a tag
    pub fn count(&self, tag: SourceTag) -> usize {
        self.counts.get(&tag).copied().unwrap_or(0)
    }

    /// Total recorded entries
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Entries with a translation
    pub fn translated(&self) -> usize {
        self.total() - self.count(SourceTag::Pending)
    }

    /// One-line report, tags in cascade order
    pub fn summary(&self) -> String {
        let mut tags: Vec<_> = self.counts.iter().filter(|(_, count)| **count > 0).collect();
        tags.sort_by_key(|(tag, _)| **tag);
        let parts: Vec<String> = tags
            .iter()
            .map(|(tag, count)| format!("{}={}", tag.label(), count))
            .collect();
        format!("{}/{} translated ({})", self.translated(), self.total(), parts.join(", "))
    }
}

/// Resolved entries for every namespace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationResult {
    /// Ordered entries per namespace
    pub entries: IndexMap<String, Vec<LanguageEntry>>,
    /// Global source distribution
    pub stats: SourceStats,
}

impl TranslationResult {
    /// All entries that still need a translation, in namespace and key order
    pub fn pending(&self) -> Vec<&LanguageEntry> {
        self.entries
            .values()
            .flatten()
            .filter(|entry| entry.is_pending())
            .collect()
    }

    /// Set a translation after the decision pass. Returns false if the key is unknown.
    pub fn apply(&mut self, namespace: &str, key: &str, translation: &str, source: SourceTag) -> bool {
        let Some(entry) = self
            .entries
            .get_mut(namespace)
            .and_then(|entries| entries.iter_mut().find(|entry| entry.key == key))
        else {
            return false;
        };

        let previous = entry.source;
        entry.translation = Some(translation.to_string());
        entry.source = source;
        self.stats.reassign(previous, source);
        true
    }

    /// Ordered key → translation map for one namespace, pending keys omitted
    pub fn translation_map(&self, namespace: &str) -> IndexMap<String, String> {
        self.entries
            .get(namespace)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| !entry.is_pending())
                    .filter_map(|entry| {
                        entry
                            .translation
                            .as_ref()
                            .map(|translation| (entry.key.clone(), translation.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
