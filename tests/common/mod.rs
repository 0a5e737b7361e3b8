/*!
 * Common test utilities for the modlang test suite
 */

use anyhow::Result;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

use modlang::app_config::Config;
use modlang::pack_builder::OutputMode;

/// Routes library logging to the test output; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a mod archive holding the given `(entry path, content)` pairs
pub fn create_mod_archive(dir: &Path, filename: &str, entries: &[(&str, &str)]) -> Result<PathBuf> {
    let path = dir.join(filename);
    let mut writer = zip::ZipWriter::new(File::create(&path)?);
    let options = SimpleFileOptions::default();

    for (name, content) in entries {
        writer.start_file(*name, options)?;
        writer.write_all(content.as_bytes())?;
    }
    writer.finish()?;
    Ok(path)
}

/// Creates a community dictionary store with `(key, origin, translation, version)` rows
pub fn create_community_store(
    dir: &Path,
    rows: &[(&str, &str, &str, Option<&str>)],
) -> Result<PathBuf> {
    let path = dir.join("community.db");
    let conn = rusqlite::Connection::open(&path)?;
    conn.execute_batch(
        "CREATE TABLE dict (key TEXT, origin_name TEXT, trans_name TEXT, version TEXT);",
    )?;
    for (key, origin, translation, version) in rows {
        conn.execute(
            "INSERT INTO dict (key, origin_name, trans_name, version) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![key, origin, translation, version],
        )?;
    }
    Ok(path)
}

/// A config rooted in `root`: mods in `root/mods`, output in `root/out`,
/// a personal dictionary in `root/personal.json` and directory output
pub fn test_config(root: &Path) -> Result<Config> {
    let mods_dir = root.join("mods");
    fs::create_dir_all(&mods_dir)?;

    let mut config = Config::default();
    config.paths.mods_dir = mods_dir;
    config.paths.output_dir = root.join("out");
    config.paths.personal_dictionary = root.join("personal.json");
    config.pack.output_mode = OutputMode::Directory;
    config.translation.api_keys_env = "MODLANG_TEST_KEYS_UNSET".to_string();
    Ok(config)
}
