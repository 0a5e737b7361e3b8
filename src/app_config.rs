use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;
use crate::language_utils::validate_locale;
use crate::pack_builder::OutputMode;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Locale of the original text (`en_us`)
    #[serde(default = "default_original_locale")]
    pub original_locale: String,

    /// Locale to produce (`zh_cn`)
    #[serde(default = "default_target_locale")]
    pub target_locale: String,

    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Decision pass settings
    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Output pack settings
    #[serde(default)]
    pub pack: PackConfig,

    /// Machine translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Input and output locations
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PathsConfig {
    // @field: Directory scanned for mod archives
    #[serde(default = "default_mods_dir")]
    pub mods_dir: PathBuf,

    // @field: Directory of third-party resource packs (archives or folders)
    #[serde(default)]
    pub packs_dir: Option<PathBuf>,

    // @field: Directory the pack is written into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    // @field: Read-only community dictionary store
    #[serde(default)]
    pub community_dictionary: Option<PathBuf>,

    // @field: Table name inside the community store
    #[serde(default = "default_community_table")]
    pub community_table: String,

    // @field: Personal dictionary file
    #[serde(default = "default_personal_dictionary")]
    pub personal_dictionary: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            mods_dir: default_mods_dir(),
            packs_dir: None,
            output_dir: default_output_dir(),
            community_dictionary: None,
            community_table: default_community_table(),
            personal_dictionary: default_personal_dictionary(),
        }
    }
}

/// Decision pass settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResolutionConfig {
    /// Look up the personal dictionary by original text as well as by key
    #[serde(default = "default_true")]
    pub personal_origin_lookup: bool,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            personal_origin_lookup: true,
        }
    }
}

/// Output pack settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PackConfig {
    /// Pack name, used for the output directory or archive
    #[serde(default = "default_pack_name")]
    pub name: String,

    /// Manifest description
    #[serde(default = "default_pack_description")]
    pub description: String,

    /// Manifest pack format number
    #[serde(default = "default_pack_format")]
    pub pack_format: u32,

    /// Optional pack icon
    #[serde(default)]
    pub icon: Option<PathBuf>,

    /// Directory or archive output
    #[serde(default)]
    pub output_mode: OutputMode,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            name: default_pack_name(),
            description: default_pack_description(),
            pack_format: default_pack_format(),
            icon: None,
            output_mode: OutputMode::default(),
        }
    }
}

/// Machine translation configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translate keys the dictionaries could not resolve
    #[serde(default)]
    pub enabled: bool,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// API keys, rotated between requests
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Environment variable holding additional comma-separated keys
    #[serde(default = "default_api_keys_env")]
    pub api_keys_env: String,

    /// Strings per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Source characters per request
    #[serde(default = "default_max_batch_chars")]
    pub max_batch_chars: usize,

    /// Concurrent requests
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Attempts per batch
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Cache results within the run
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Cache entry lifetime in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Cooldown after a rate limit or verification failure
    #[serde(default = "default_rate_limit_cooldown_secs")]
    pub rate_limit_cooldown_secs: u64,

    /// Cooldown after an unusable answer
    #[serde(default = "default_malformed_cooldown_secs")]
    pub malformed_cooldown_secs: u64,

    /// First backoff after a network failure, doubled on each repeat
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,

    /// Backoff ceiling
    #[serde(default = "default_backoff_cap_secs")]
    pub backoff_cap_secs: u64,

    /// System prompt override
    /// Placeholders: {source_language}, {target_language}
    #[serde(default)]
    pub prompt_template: Option<String>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_openai_endpoint(),
            model: default_openai_model(),
            api_keys: Vec::new(),
            api_keys_env: default_api_keys_env(),
            batch_size: default_batch_size(),
            max_batch_chars: default_max_batch_chars(),
            workers: default_workers(),
            max_attempts: default_max_attempts(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            cache_enabled: true,
            cache_ttl_secs: default_cache_ttl_secs(),
            rate_limit_cooldown_secs: default_rate_limit_cooldown_secs(),
            malformed_cooldown_secs: default_malformed_cooldown_secs(),
            backoff_base_secs: default_backoff_base_secs(),
            backoff_cap_secs: default_backoff_cap_secs(),
            prompt_template: None,
        }
    }
}

impl TranslationConfig {
    /// Configured keys followed by the keys from the environment, blanks and repeats dropped
    pub fn resolved_api_keys(&self) -> Vec<String> {
        let mut keys: IndexSet<String> = self
            .api_keys
            .iter()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .collect();

        if !self.api_keys_env.is_empty() {
            if let Ok(value) = std::env::var(&self.api_keys_env) {
                keys.extend(
                    value
                        .split(',')
                        .map(|key| key.trim().to_string())
                        .filter(|key| !key.is_empty()),
                );
            }
        }

        keys.into_iter().collect()
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_original_locale() -> String {
    "en_us".to_string()
}

fn default_target_locale() -> String {
    "zh_cn".to_string()
}

fn default_mods_dir() -> PathBuf {
    PathBuf::from("mods")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_community_table() -> String {
    crate::dictionary::community::DEFAULT_TABLE.to_string()
}

/// Default personal dictionary location under the user's local data directory
pub fn default_personal_dictionary() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("modlang")
        .join("personal_dictionary.json")
}

fn default_pack_name() -> String {
    "Modlang Translations".to_string()
}

fn default_pack_description() -> String {
    "Translated mod text generated by modlang".to_string()
}

fn default_pack_format() -> u32 {
    15
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_keys_env() -> String {
    "MODLANG_API_KEYS".to_string()
}

fn default_batch_size() -> usize {
    40
}

fn default_max_batch_chars() -> usize {
    4000
}

fn default_workers() -> usize {
    4
}

fn default_max_attempts() -> usize {
    3
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_rate_limit_cooldown_secs() -> u64 {
    60
}

fn default_malformed_cooldown_secs() -> u64 {
    5
}

fn default_backoff_base_secs() -> u64 {
    2
}

fn default_backoff_cap_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate locales
        for (setting, locale) in [
            ("original_locale", &self.original_locale),
            ("target_locale", &self.target_locale),
        ] {
            validate_locale(locale).map_err(|e| ConfigError::InvalidSetting {
                setting,
                reason: e.to_string(),
            })?;
        }
        if self.original_locale == self.target_locale {
            return Err(ConfigError::InvalidSetting {
                setting: "target_locale",
                reason: "must differ from original_locale".to_string(),
            });
        }

        // Validate input paths
        require_dir("Mods directory", &self.paths.mods_dir)?;
        if let Some(packs_dir) = &self.paths.packs_dir {
            require_dir("Packs directory", packs_dir)?;
        }
        if let Some(store) = &self.paths.community_dictionary {
            require_file("Community dictionary", store)?;
        }
        if let Some(icon) = &self.pack.icon {
            require_file("Pack icon", icon)?;
        }

        // Validate pack settings
        let name = self.pack.name.trim();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ConfigError::InvalidSetting {
                setting: "pack.name",
                reason: format!("'{}' is not a usable file name", self.pack.name),
            });
        }
        if self.pack.pack_format == 0 {
            return Err(ConfigError::InvalidSetting {
                setting: "pack.pack_format",
                reason: "must be at least 1".to_string(),
            });
        }

        // Validate translation settings only when they are used
        if self.translation.enabled {
            for (setting, value) in [
                ("translation.batch_size", self.translation.batch_size),
                ("translation.workers", self.translation.workers),
                ("translation.max_attempts", self.translation.max_attempts),
            ] {
                if value == 0 {
                    return Err(ConfigError::InvalidSetting {
                        setting,
                        reason: "must be at least 1".to_string(),
                    });
                }
            }
            if self.translation.resolved_api_keys().is_empty() {
                return Err(ConfigError::InvalidSetting {
                    setting: "translation.api_keys",
                    reason: format!(
                        "translation is enabled but no API key is configured (set api_keys or {})",
                        self.translation.api_keys_env
                    ),
                });
            }
        }

        Ok(())
    }
}

fn require_dir(what: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ConfigError::MissingPath {
            what,
            path: path.to_path_buf(),
        })
    }
}

fn require_file(what: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::MissingPath {
            what,
            path: path.to_path_buf(),
        })
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            original_locale: default_original_locale(),
            target_locale: default_target_locale(),
            paths: PathsConfig::default(),
            resolution: ResolutionConfig::default(),
            pack: PackConfig::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
