/*!
 * Archive scanning.
 *
 * Enumerates mod archives (`.jar` / `.zip`) and unpacked resource-pack
 * directories, and yields the text of every language file found under the
 * `assets/<namespace>/lang/` convention. Entries that cannot be decoded are
 * logged and skipped; only an archive that cannot be opened at all is
 * reported back to the caller.
 */

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use log::{debug, trace, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use walkdir::WalkDir;

use crate::errors::ExtractionError;
use crate::language_utils::normalize_locale;
use crate::model::LangFormat;

// @const: assets/<namespace>/lang/<locale>.<ext>, matched anywhere in the entry path
static LANG_PATH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|/)assets/([^/]+)/lang/([^/]+)\.([a-z0-9]+)$").unwrap()
});

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Whether a language file holds original text or a translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleRole {
    /// Source-language file (`en_us`)
    Original,
    /// Target-language file shipped with the archive or pack
    Translated,
}

/// One decoded language file
#[derive(Debug, Clone)]
pub struct LangFileEntry {
    /// File name of the archive or directory the entry came from
    pub archive_name: String,
    /// Path of the entry inside the archive
    pub path: String,
    /// Namespace directory under `assets/`
    pub asset_namespace: String,
    /// Original or translated
    pub role: LocaleRole,
    /// Serialization format
    pub format: LangFormat,
    /// Decoded text
    pub text: String,
}

/// Scanner for language files inside archives and directories
#[derive(Debug, Clone)]
pub struct ArchiveScanner {
    original_locale: String,
    target_locale: String,
}

impl Default for ArchiveScanner {
    fn default() -> Self {
        Self::new("en_us", "zh_cn")
    }
}

impl ArchiveScanner {
    /// Create a scanner for the given original and target locales
    pub fn new(original_locale: &str, target_locale: &str) -> Self {
        Self {
            original_locale: normalize_locale(original_locale),
            target_locale: normalize_locale(target_locale),
        }
    }

    /// Classify an entry path, returning namespace, role and format for language files
    pub fn classify(&self, entry_path: &str) -> Option<(String, LocaleRole, LangFormat)> {
        let normalized = entry_path.replace('\\', "/");
        let caps = LANG_PATH_REGEX.captures(&normalized)?;

        let namespace = caps.get(1)?.as_str().to_string();
        let locale = normalize_locale(caps.get(2)?.as_str());
        let format = LangFormat::from_extension(caps.get(3)?.as_str())?;

        let role = if locale == self.original_locale {
            LocaleRole::Original
        } else if locale == self.target_locale {
            LocaleRole::Translated
        } else {
            return None;
        };

        Some((namespace, role, format))
    }

    /// Scan an archive file or a directory
    pub fn scan(&self, path: &Path) -> Result<Vec<LangFileEntry>, ExtractionError> {
        if path.is_dir() {
            self.scan_directory(path)
        } else {
            self.scan_archive(path)
        }
    }

    /// Scan a ZIP-family archive
    pub fn scan_archive(&self, path: &Path) -> Result<Vec<LangFileEntry>, ExtractionError> {
        let archive_name = display_name(path);
        let file = File::open(path).map_err(|e| archive_error(path, e))?;
        let mut archive =
            zip::ZipArchive::new(BufReader::new(file)).map_err(|e| archive_error(path, e))?;

        let mut entries = Vec::new();
        for index in 0..archive.len() {
            let mut zip_entry = match archive.by_index(index) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry #{} in {}: {}", index, archive_name, e);
                    continue;
                }
            };
            if zip_entry.is_dir() {
                continue;
            }

            let entry_path = zip_entry.name().to_string();
            let Some((asset_namespace, role, format)) = self.classify(&entry_path) else {
                continue;
            };

            let mut bytes = Vec::with_capacity(zip_entry.size() as usize);
            if let Err(e) = zip_entry.read_to_end(&mut bytes) {
                warn!("Failed to read {} in {}: {}", entry_path, archive_name, e);
                continue;
            }

            let Some(text) = decode_text(&bytes) else {
                warn!("Skipping {} in {}: not valid UTF-8", entry_path, archive_name);
                continue;
            };

            trace!("Found {} ({:?}, {}) in {}", entry_path, role, format, archive_name);
            entries.push(LangFileEntry {
                archive_name: archive_name.clone(),
                path: entry_path,
                asset_namespace,
                role,
                format,
                text,
            });
        }

        debug!("{}: {} language file(s)", archive_name, entries.len());
        Ok(entries)
    }

    /// Scan an unpacked resource pack directory
    pub fn scan_directory(&self, root: &Path) -> Result<Vec<LangFileEntry>, ExtractionError> {
        let archive_name = display_name(root);
        let mut entries = Vec::new();

        for dir_entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let dir_entry = match dir_entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable path in {}: {}", archive_name, e);
                    continue;
                }
            };
            if !dir_entry.file_type().is_file() {
                continue;
            }

            let relative = dir_entry
                .path()
                .strip_prefix(root)
                .unwrap_or(dir_entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            let Some((asset_namespace, role, format)) = self.classify(&relative) else {
                continue;
            };

            let bytes = match std::fs::read(dir_entry.path()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Failed to read {:?}: {}", dir_entry.path(), e);
                    continue;
                }
            };
            let Some(text) = decode_text(&bytes) else {
                warn!("Skipping {:?}: not valid UTF-8", dir_entry.path());
                continue;
            };

            entries.push(LangFileEntry {
                archive_name: archive_name.clone(),
                path: relative,
                asset_namespace,
                role,
                format,
                text,
            });
        }

        debug!("{}: {} language file(s)", archive_name, entries.len());
        Ok(entries)
    }
}

/// Find mod archives in a directory, sorted by path
pub fn collect_archives<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut archives: Vec<PathBuf> = WalkDir::new(dir.as_ref())
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .map(|ext| {
                    let ext = ext.to_string_lossy().to_lowercase();
                    ext == "jar" || ext == "zip"
                })
                .unwrap_or(false)
        })
        .collect();
    archives.sort();
    archives
}

/// Decode UTF-8 text, permitting a leading byte-order mark
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).ok()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn archive_error(path: &Path, error: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Archive {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}
