/*!
 * Resource pack assembly.
 *
 * Collects the manifest, the optional icon and the regenerated language
 * files into a sorted entry list, writes them into a temporary sibling of the
 * destination and moves the result into place in one rename. Archive output
 * uses fixed timestamps and sorted entries, so identical input produces
 * identical bytes.
 */

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::errors::BuildError;
use crate::file_utils::FileManager;
use crate::model::LangFormat;

/// Output shape of the pack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Plain directory tree
    Directory,
    /// Single ZIP archive
    #[default]
    Archive,
}

/// Pack identity and layout
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Directory or archive name, without extension
    pub name: String,
    /// Manifest description
    pub description: String,
    /// Manifest pack format number
    pub pack_format: u32,
    /// Optional icon copied as `pack.png`
    pub icon: Option<PathBuf>,
    /// Locale the language files are written for
    pub target_locale: String,
    /// Output shape
    pub mode: OutputMode,
}

/// One regenerated language file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackFile {
    /// Directory name under `assets/`
    pub asset_namespace: String,
    /// Serialization format, decides the extension
    pub format: LangFormat,
    /// File content
    pub content: String,
}

/// Pack builder
#[derive(Debug, Clone)]
pub struct PackBuilder {
    options: PackOptions,
}

impl PackBuilder {
    /// Create a builder
    pub fn new(options: PackOptions) -> Self {
        Self { options }
    }

    /// Pretty-printed `pack.mcmeta`
    pub fn manifest(&self) -> Result<String, BuildError> {
        let manifest = json!({
            "pack": {
                "pack_format": self.options.pack_format,
                "description": self.options.description,
            }
        });
        Ok(serde_json::to_string_pretty(&manifest)?)
    }

    /// Entry path of a language file inside the pack
    pub fn lang_path(&self, asset_namespace: &str, format: LangFormat) -> String {
        format!(
            "assets/{}/lang/{}.{}",
            asset_namespace,
            self.options.target_locale,
            format.suffix()
        )
    }

    /// Sorted entry path → bytes map of the whole pack
    pub fn entries(&self, files: &[PackFile]) -> Result<BTreeMap<String, Vec<u8>>, BuildError> {
        let mut entries = BTreeMap::new();
        entries.insert("pack.mcmeta".to_string(), self.manifest()?.into_bytes());

        if let Some(icon) = &self.options.icon {
            entries.insert("pack.png".to_string(), fs::read(icon)?);
        }

        for file in files {
            let path = self.lang_path(&file.asset_namespace, file.format);
            if entries.contains_key(&path) {
                return Err(BuildError::DuplicateEntry(path));
            }
            entries.insert(path, file.content.clone().into_bytes());
        }

        Ok(entries)
    }

    /// Build the pack inside `output_dir`, returning the final path
    pub fn build(&self, output_dir: &Path, files: &[PackFile]) -> Result<PathBuf, BuildError> {
        fs::create_dir_all(output_dir)?;
        let entries = self.entries(files)?;

        let path = match self.options.mode {
            OutputMode::Directory => self.build_directory(output_dir, &entries)?,
            OutputMode::Archive => self.build_archive(output_dir, &entries)?,
        };

        info!("Wrote pack with {} entries to {:?}", entries.len(), path);
        Ok(path)
    }

    fn build_directory(
        &self,
        output_dir: &Path,
        entries: &BTreeMap<String, Vec<u8>>,
    ) -> Result<PathBuf, BuildError> {
        let staging = tempfile::Builder::new()
            .prefix(".modlang-")
            .tempdir_in(output_dir)?;

        for (name, bytes) in entries {
            let path = staging.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, bytes)?;
        }

        let target = FileManager::unique_path(output_dir.join(&self.options.name));
        debug!("Moving staged pack to {:?}", target);
        fs::rename(staging.path(), &target).map_err(|e| BuildError::Finalize {
            path: target.clone(),
            reason: e.to_string(),
        })?;

        Ok(target)
    }

    fn build_archive(
        &self,
        output_dir: &Path,
        entries: &BTreeMap<String, Vec<u8>>,
    ) -> Result<PathBuf, BuildError> {
        let mut staging = tempfile::Builder::new()
            .prefix(".modlang-")
            .suffix(".zip")
            .tempfile_in(output_dir)?;

        write_archive(staging.as_file_mut(), entries)?;
        staging.as_file_mut().sync_all()?;

        let target =
            FileManager::unique_path(output_dir.join(format!("{}.zip", self.options.name)));
        debug!("Moving staged archive to {:?}", target);
        staging.persist(&target).map_err(|e| BuildError::Finalize {
            path: target.clone(),
            reason: e.error.to_string(),
        })?;

        Ok(target)
    }
}

/// Write sorted entries as a deterministic deflate archive
pub fn write_archive<W: Write + std::io::Seek>(
    writer: W,
    entries: &BTreeMap<String, Vec<u8>>,
) -> Result<(), BuildError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    let mut zip = ZipWriter::new(writer);
    for (name, bytes) in entries {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(bytes)?;
    }
    zip.finish()?;
    Ok(())
}
