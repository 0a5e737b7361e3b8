/*!
 * Tests for configuration loading and validation
 */

use std::fs;

use modlang::app_config::{Config, LogLevel};
use modlang::errors::ConfigError;
use modlang::pack_builder::OutputMode;

use crate::common;

#[test]
fn test_config_default_shouldTargetSimplifiedChinese() {
    let config = Config::default();
    assert_eq!(config.original_locale, "en_us");
    assert_eq!(config.target_locale, "zh_cn");
    assert_eq!(config.pack.output_mode, OutputMode::Archive);
    assert_eq!(config.paths.community_table, "dict");
    assert!(config.paths.personal_dictionary.ends_with("personal_dictionary.json"));
}

#[test]
fn test_config_roundTrip_throughFile_shouldKeepValues() {
    let dir = common::create_temp_dir().unwrap();
    let mut config = common::test_config(dir.path()).unwrap();
    config.target_locale = "zh_tw".to_string();
    config.translation.api_keys = vec!["sk-one".to_string(), "sk-two".to_string()];
    config.log_level = LogLevel::Debug;

    let path = dir.path().join("modlang.json");
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    let loaded: Config = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(loaded.target_locale, "zh_tw");
    assert_eq!(loaded.translation.api_keys.len(), 2);
    assert_eq!(loaded.paths.mods_dir, config.paths.mods_dir);
    assert_eq!(loaded.pack.output_mode, OutputMode::Directory);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_validate_withMissingCommunityStore_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let mut config = common::test_config(dir.path()).unwrap();
    config.paths.community_dictionary = Some(dir.path().join("missing.db"));

    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingPath { what: "Community dictionary", .. })
    ));
}

#[test]
fn test_validate_withUnusablePackName_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let mut config = common::test_config(dir.path()).unwrap();
    config.pack.name = "a/b".to_string();

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidSetting { setting: "pack.name", .. })
    ));
}

#[test]
fn test_resolvedApiKeys_shouldDropBlanksAndDuplicates() {
    let mut config = Config::default();
    config.translation.api_keys_env = "MODLANG_TEST_KEYS_UNSET".to_string();
    config.translation.api_keys = vec![
        "sk-one".to_string(),
        " ".to_string(),
        "sk-one".to_string(),
        "sk-two".to_string(),
    ];

    assert_eq!(config.translation.resolved_api_keys(), vec!["sk-one", "sk-two"]);
}
