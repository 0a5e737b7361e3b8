use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: Filesystem helpers for pack discovery and output placement

pub struct FileManager;

impl FileManager {
    // @returns: Whether the path names an existing directory
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @generates: First free path, suffixing " (1)", " (2)" ... before the extension
    pub fn unique_path<P: AsRef<Path>>(path: P) -> PathBuf {
        let path = path.as_ref();
        if !path.exists() {
            return path.to_path_buf();
        }

        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        (1..)
            .map(|n| parent.join(format!("{} ({}){}", stem, n, extension)))
            .find(|candidate| !candidate.exists())
            .unwrap_or_else(|| path.to_path_buf())
    }

    /// Files under `dir` whose extension matches one of `extensions`
    /// (case-insensitive), sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extensions: &[&str], recursive: bool) -> Result<Vec<PathBuf>> {
        let depth = if recursive { usize::MAX } else { 1 };
        let mut found = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).max_depth(depth) {
            let entry = entry.with_context(|| format!("Cannot list {:?}", dir.as_ref()))?;
            let matches = entry
                .path()
                .extension()
                .map(|ext| extensions.iter().any(|wanted| ext.to_string_lossy().eq_ignore_ascii_case(wanted)))
                .unwrap_or(false);
            if matches && entry.path().is_file() {
                found.push(entry.into_path());
            }
        }

        found.sort();
        Ok(found)
    }
}
