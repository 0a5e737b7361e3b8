/*!
 * Personal dictionary.
 *
 * A user-maintained JSON file of (key, original, translation) triples. The
 * store is constructed explicitly and passed to whoever needs it: it loads
 * on construction and writes the file back after every mutation.
 */

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::DictionaryIndex;
use crate::errors::DictionaryError;

/// One personal translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalEntry {
    /// Text key
    pub key: String,
    /// Original text the translation was made for
    #[serde(default)]
    pub origin: String,
    /// Translation
    pub translation: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersonalFile {
    #[serde(default)]
    entries: Vec<PersonalEntry>,
}

/// File-backed personal dictionary
#[derive(Debug)]
pub struct PersonalDictionary {
    path: PathBuf,
    entries: IndexMap<String, PersonalEntry>,
}

impl PersonalDictionary {
    /// Load the dictionary at `path`; a missing file yields an empty dictionary
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DictionaryError> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| DictionaryError::Io {
                path: path.clone(),
                source,
            })?;
            let file: PersonalFile = if content.trim().is_empty() {
                PersonalFile::default()
            } else {
                serde_json::from_str(&content).map_err(|source| DictionaryError::Format {
                    path: path.clone(),
                    source,
                })?
            };
            file.entries
                .into_iter()
                .map(|entry| (entry.key.clone(), entry))
                .collect()
        } else {
            debug!("No personal dictionary at {:?}, starting empty", path);
            IndexMap::new()
        };

        info!("Loaded {} personal dictionary entries", entries.len());
        Ok(Self { path, entries })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a key
    pub fn get(&self, key: &str) -> Option<&PersonalEntry> {
        self.entries.get(key)
    }

    /// All entries in insertion order
    pub fn entries(&self) -> impl Iterator<Item = &PersonalEntry> {
        self.entries.values()
    }

    /// Add or replace the translation of a key and save
    pub fn insert(&mut self, key: &str, origin: &str, translation: &str) -> Result<(), DictionaryError> {
        self.entries.insert(
            key.to_string(),
            PersonalEntry {
                key: key.to_string(),
                origin: origin.to_string(),
                translation: translation.to_string(),
            },
        );
        self.save()
    }

    /// Remove a key and save. Returns whether the key existed.
    pub fn remove(&mut self, key: &str) -> Result<bool, DictionaryError> {
        let removed = self.entries.shift_remove(key).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Key and original-text projections
    pub fn index(&self) -> DictionaryIndex {
        let mut index = DictionaryIndex::new();
        for entry in self.entries.values() {
            if entry.translation.trim().is_empty() {
                continue;
            }
            index.insert_key(&entry.key, &entry.translation);
            if !entry.origin.is_empty() {
                index.insert_origin(&entry.origin, &entry.translation, None);
            }
        }
        index
    }

    fn save(&self) -> Result<(), DictionaryError> {
        let io_error = |source| DictionaryError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }
        }

        let file = PersonalFile {
            entries: self.entries.values().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|source| DictionaryError::Format {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(io_error)?;

        debug!("Saved {} personal entries to {:?}", self.entries.len(), self.path);
        Ok(())
    }
}
