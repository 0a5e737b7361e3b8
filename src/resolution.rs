/*!
 * Resolution engine.
 *
 * For every text key, walks a fixed cascade of translation sources and keeps
 * the first candidate that passes the validity check:
 *
 * 1. bundled target-language value
 * 2. personal dictionary by key
 * 3. personal dictionary by original text (optional)
 * 4. passthrough of originals without Latin letters
 * 5. third-party pack pool by key
 * 6. community dictionary by key
 * 7. community dictionary by original text, with conflict resolution
 *
 * Each step answers `Option<String>`; a miss or an invalid candidate simply
 * moves on to the next step.
 */

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, info};

use crate::dictionary::{DictionaryIndex, OriginCandidate};
use crate::lang_file::key_order;
use crate::language_utils::{contains_latin, is_valid_translation};
use crate::model::{ExtractionResult, LanguageEntry, NamespaceInfo, SourceTag, TranslationResult};
use crate::version::{ModVersion, version_key};

/// Cascade steps in priority order
pub const CASCADE: [SourceTag; 7] = [
    SourceTag::Bundled,
    SourceTag::PersonalKey,
    SourceTag::PersonalOrigin,
    SourceTag::Passthrough,
    SourceTag::PackKey,
    SourceTag::CommunityKey,
    SourceTag::CommunityOrigin,
];

/// Options for a decision pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionOptions {
    /// Consult the personal dictionary by original text
    pub origin_lookup: bool,
}

impl Default for ResolutionOptions {
    fn default() -> Self {
        Self { origin_lookup: true }
    }
}

/// Everything the cascade needs to know about one key
struct KeyLookup<'a> {
    key: &'a str,
    original: &'a str,
    bundled: Option<&'a IndexMap<String, String>>,
    packs: &'a HashMap<String, String>,
}

/// Resolution engine over injected dictionaries
#[derive(Debug, Clone, Copy)]
pub struct ResolutionEngine<'a> {
    personal: &'a DictionaryIndex,
    community: &'a DictionaryIndex,
    options: ResolutionOptions,
}

impl<'a> ResolutionEngine<'a> {
    /// Create an engine over the personal and community dictionaries
    pub fn new(
        personal: &'a DictionaryIndex,
        community: &'a DictionaryIndex,
        options: ResolutionOptions,
    ) -> Self {
        Self {
            personal,
            community,
            options,
        }
    }

    /// Resolve every key of every namespace
    pub fn resolve(&self, extraction: &ExtractionResult) -> TranslationResult {
        let mut result = TranslationResult::default();

        for (namespace, originals) in &extraction.originals {
            let bundled = extraction.bundled.get(namespace);
            let keys = ordered_keys(extraction.namespaces.get(namespace), originals);

            let mut entries = Vec::with_capacity(keys.len());
            for key in keys {
                let Some(original) = originals.get(&key) else {
                    continue;
                };
                let lookup = KeyLookup {
                    key: &key,
                    original,
                    bundled,
                    packs: &extraction.pack_translations,
                };

                let (translation, source) = self.resolve_key(&lookup);
                result.stats.record(source);
                entries.push(LanguageEntry {
                    namespace: namespace.clone(),
                    key,
                    original: original.clone(),
                    translation,
                    source,
                });
            }

            result.entries.insert(namespace.clone(), entries);
        }

        info!("Resolution: {}", result.stats.summary());
        result
    }

    fn resolve_key(&self, lookup: &KeyLookup<'_>) -> (Option<String>, SourceTag) {
        for step in CASCADE {
            let Some(candidate) = self.candidate(step, lookup) else {
                continue;
            };
            if is_valid_translation(&candidate) {
                return (Some(candidate), step);
            }
            debug!("Rejected {} candidate for '{}': '{}'", step, lookup.key, candidate);
        }
        (None, SourceTag::Pending)
    }

    fn candidate(&self, step: SourceTag, lookup: &KeyLookup<'_>) -> Option<String> {
        match step {
            SourceTag::Bundled => lookup
                .bundled
                .and_then(|bundled| bundled.get(lookup.key))
                .filter(|value| !value.trim().is_empty())
                .cloned(),
            SourceTag::PersonalKey => self.personal.by_key(lookup.key).map(str::to_string),
            SourceTag::PersonalOrigin if self.options.origin_lookup => {
                pick_candidate(self.personal.by_origin(lookup.original)).map(str::to_string)
            }
            SourceTag::Passthrough if !contains_latin(lookup.original) => {
                Some(lookup.original.to_string())
            }
            SourceTag::PackKey => lookup.packs.get(lookup.key).cloned(),
            SourceTag::CommunityKey => self.community.by_key(lookup.key).map(str::to_string),
            SourceTag::CommunityOrigin => {
                pick_candidate(self.community.by_origin(lookup.original)).map(str::to_string)
            }
            _ => None,
        }
    }
}

/// Choose among conflicting translations of one original text.
///
/// Highest occurrence count wins; ties go to the translation carrying the
/// highest parsed version (unparseable versions lowest); remaining ties go to
/// the first candidate encountered.
pub fn pick_candidate(candidates: &[OriginCandidate]) -> Option<&str> {
    struct Group<'c> {
        translation: &'c str,
        count: usize,
        best_version: Option<ModVersion>,
    }

    let mut groups: Vec<Group<'_>> = Vec::new();
    for candidate in candidates {
        let version = version_key(candidate.version.as_deref());
        match groups.iter_mut().find(|g| g.translation == candidate.translation) {
            Some(group) => {
                group.count += 1;
                if version > group.best_version {
                    group.best_version = version;
                }
            }
            None => groups.push(Group {
                translation: &candidate.translation,
                count: 1,
                best_version: version,
            }),
        }
    }

    let mut best: Option<&Group<'_>> = None;
    for group in &groups {
        let better = match best {
            None => true,
            Some(current) => {
                (group.count, &group.best_version) > (current.count, &current.best_version)
            }
        };
        if better {
            best = Some(group);
        }
    }

    best.map(|group| group.translation)
}

/// Key order for a namespace: on-disk template order, then any keys the template missed
pub fn ordered_keys(info: Option<&NamespaceInfo>, originals: &IndexMap<String, String>) -> Vec<String> {
    let mut keys: Vec<String> = info
        .map(|info| key_order(&info.raw_text, info.format))
        .unwrap_or_default()
        .into_iter()
        .filter(|key| originals.contains_key(key))
        .collect();

    if keys.is_empty() && !originals.is_empty() {
        debug!(
            "Could not recover key order for '{}', using dictionary order",
            info.map(|i| i.name.as_str()).unwrap_or("?")
        );
    }

    if keys.len() < originals.len() {
        let present: std::collections::HashSet<String> = keys.iter().cloned().collect();
        keys.extend(originals.keys().filter(|key| !present.contains(*key)).cloned());
    }

    keys
}
