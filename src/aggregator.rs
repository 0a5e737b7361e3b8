/*!
 * Aggregation of per-archive language data into namespaced corpora.
 *
 * Every archive contributes original-language dictionaries and, optionally,
 * bundled target-language dictionaries. Third-party translated packs are
 * pooled separately without namespace scoping.
 */

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::archive_scanner::{ArchiveScanner, LangFileEntry, LocaleRole};
use crate::errors::ExtractionError;
use crate::lang_file::extract_pairs;
use crate::model::{ExtractionResult, LangFormat, NamespaceInfo};

/// Merges scanner output into one `ExtractionResult`
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    scanner: ArchiveScanner,
}

impl Aggregator {
    /// Create an aggregator using the given scanner
    pub fn new(scanner: ArchiveScanner) -> Self {
        Self { scanner }
    }

    /// Aggregate mod archives and third-party translated packs.
    ///
    /// Unreadable archives are logged and skipped. Finding no namespace at all
    /// is an error for the run.
    pub fn aggregate(
        &self,
        archives: &[PathBuf],
        packs: &[PathBuf],
    ) -> Result<ExtractionResult, ExtractionError> {
        let scanned: Vec<Vec<LangFileEntry>> = archives
            .iter()
            .filter_map(|archive| match self.scanner.scan(archive) {
                Ok(entries) => Some(entries),
                Err(e) => {
                    warn!("Skipping archive: {}", e);
                    None
                }
            })
            .collect();

        let mut result = merge_archives(scanned);

        if result.namespaces.is_empty() {
            return Err(ExtractionError::NoNamespaces(archives.len()));
        }

        self.merge_packs(&mut result, packs);

        info!(
            "Aggregated {} namespace(s), {} key(s), {} pack translation(s)",
            result.namespace_count(),
            result.key_count(),
            result.pack_translations.len()
        );

        Ok(result)
    }

    /// Pool translations from third-party packs.
    ///
    /// Packs are merged in reverse order so that earlier-listed packs win,
    /// and values identical to the known original are dropped.
    pub fn merge_packs(&self, result: &mut ExtractionResult, packs: &[PathBuf]) {
        let mut pool: HashMap<String, String> = HashMap::new();
        let mut copies = 0usize;

        for pack in packs.iter().rev() {
            let entries = match self.scanner.scan(pack) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Skipping translated pack: {}", e);
                    continue;
                }
            };

            for entry in entries.into_iter().filter(|e| e.role == LocaleRole::Translated) {
                for (key, value) in extract_pairs(&entry.text, entry.format) {
                    if result.is_original_value(&key, &value) {
                        copies += 1;
                        continue;
                    }
                    pool.insert(key, value);
                }
            }
        }

        if copies > 0 {
            debug!("Ignored {} pack value(s) identical to the original", copies);
        }
        result.pack_translations = pool;
    }
}

/// Asset namespaces that ship original files in both formats, across all archives
pub fn split_namespaces(archives: &[Vec<LangFileEntry>]) -> HashSet<String> {
    let mut formats: HashMap<&str, HashSet<LangFormat>> = HashMap::new();
    for entry in archives.iter().flatten().filter(|e| e.role == LocaleRole::Original) {
        formats
            .entry(entry.asset_namespace.as_str())
            .or_default()
            .insert(entry.format);
    }
    formats
        .into_iter()
        .filter(|(_, set)| set.len() > 1)
        .map(|(namespace, _)| namespace.to_string())
        .collect()
}

/// Merge every archive's language files, in archive order.
///
/// Whether a namespace is split by format is settled over the whole set
/// first, so each output file path belongs to exactly one namespace.
pub fn merge_archives(archives: Vec<Vec<LangFileEntry>>) -> ExtractionResult {
    let split = split_namespaces(&archives);
    let mut result = ExtractionResult::default();
    for entries in archives {
        merge_archive(&mut result, entries, &split);
    }
    result
}

/// Merge the language files of one archive into the result
fn merge_archive(result: &mut ExtractionResult, entries: Vec<LangFileEntry>, split: &HashSet<String>) {
    for entry in &entries {
        let id = namespace_id(&entry.asset_namespace, entry.format, split.contains(&entry.asset_namespace));
        let pairs = extract_pairs(&entry.text, entry.format);

        match entry.role {
            LocaleRole::Original => merge_original(result, &id, entry, pairs),
            LocaleRole::Translated => merge_bundled(result, &id, entry, pairs),
        }
    }
}

fn merge_bundled(
    result: &mut ExtractionResult,
    id: &str,
    entry: &LangFileEntry,
    pairs: IndexMap<String, String>,
) {
    let bundled = result.bundled.entry(id.to_string()).or_default();
    for (key, value) in pairs {
        if let Some(previous) = bundled.get(&key) {
            if *previous != value {
                debug!(
                    "{}: bundled '{}' redefined by {} ('{}' -> '{}')",
                    id, key, entry.archive_name, previous, value
                );
            }
        }
        bundled.insert(key, value);
    }
}

fn merge_original(
    result: &mut ExtractionResult,
    id: &str,
    entry: &LangFileEntry,
    pairs: IndexMap<String, String>,
) {
    if !result.namespaces.contains_key(id) {
        debug!("New namespace '{}' from {} ({})", id, entry.archive_name, entry.path);
        result.namespaces.insert(
            id.to_string(),
            NamespaceInfo {
                name: id.to_string(),
                asset_namespace: entry.asset_namespace.clone(),
                archive_name: entry.archive_name.clone(),
                format: entry.format,
                raw_text: entry.text.clone(),
            },
        );
    }

    let originals = result.originals.entry(id.to_string()).or_default();
    for (key, value) in pairs {
        if let Some(previous) = originals.get(&key) {
            if *previous != value {
                debug!(
                    "{}: '{}' redefined by {} ('{}' -> '{}')",
                    id, key, entry.archive_name, previous, value
                );
            }
        }
        originals.insert(key, value);
    }
}

/// Namespace id, suffixed with the format when the namespace ships both formats
pub fn namespace_id(asset_namespace: &str, format: LangFormat, split: bool) -> String {
    if split {
        format!("{}_{}", asset_namespace, format.suffix())
    } else {
        asset_namespace.to_string()
    }
}
