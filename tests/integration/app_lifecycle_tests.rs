/*!
 * Full runs of the application controller
 */

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use modlang::app_config::Config;
use modlang::app_controller::Controller;
use modlang::dictionary::PersonalDictionary;
use modlang::model::SourceTag;
use modlang::providers::MockProvider;
use modlang::translation::{ApiKeyPool, BatchOptions, BatchTranslator, CooldownPolicy, TranslationCache};

use crate::common;

fn prepare(root: &Path) -> Config {
    let mut config = common::test_config(root).unwrap();
    common::create_mod_archive(
        &config.paths.mods_dir,
        "first.jar",
        &[("assets/modA/lang/en_us.json", r#"{"a":"Hello"}"#)],
    )
    .unwrap();
    common::create_mod_archive(
        &config.paths.mods_dir,
        "second.jar",
        &[("assets/modA/lang/en_us.json", r#"{"b":"World"}"#)],
    )
    .unwrap();
    let store = common::create_community_store(root, &[("a", "Hello", "你好", Some("1.0"))]).unwrap();
    config.paths.community_dictionary = Some(store);
    config
}

fn mock_translator(provider: &MockProvider) -> BatchTranslator {
    BatchTranslator::new(
        Arc::new(provider.clone()),
        Arc::new(ApiKeyPool::new(vec!["key-1".to_string()], CooldownPolicy::default())),
        TranslationCache::new(true, Duration::from_secs(60)),
        BatchOptions::default(),
    )
}

fn output_file(pack: &Path) -> String {
    fs::read_to_string(pack.join("assets/modA/lang/zh_cn.json")).unwrap()
}

#[tokio::test]
async fn test_run_withoutTranslation_shouldWriteDictionaryResults() {
    let dir = common::create_temp_dir().unwrap();
    let config = prepare(dir.path());

    let report = Controller::with_config(config).unwrap().without_progress().run().await;

    assert!(report.success, "{}", report.message);
    assert_eq!(report.stats.count(SourceTag::CommunityKey), 1);
    assert_eq!(report.stats.count(SourceTag::Pending), 1);

    let pack = report.output_path.unwrap();
    assert_eq!(pack, dir.path().join("out").join("Modlang Translations"));
    assert!(pack.join("pack.mcmeta").is_file());
    assert_eq!(output_file(&pack), r#"{"a":"你好"}"#);
}

#[tokio::test]
async fn test_run_withTranslation_shouldFillPendingKeys() {
    common::init_test_logging();
    let dir = common::create_temp_dir().unwrap();
    let mut config = prepare(dir.path());
    config.translation.enabled = true;
    config.translation.api_keys = vec!["key-1".to_string()];

    let provider = MockProvider::working();
    let report = Controller::with_config(config)
        .unwrap()
        .with_translator(mock_translator(&provider))
        .without_progress()
        .run()
        .await;

    assert!(report.success, "{}", report.message);
    assert_eq!(provider.request_count(), 1);
    assert_eq!(report.stats.count(SourceTag::Ai), 1);
    assert_eq!(report.stats.count(SourceTag::Pending), 0);
    assert_eq!(
        output_file(&report.output_path.unwrap()),
        "{\"a\":\"你好\",\n  \"b\": \"译World\"\n}"
    );
}

#[tokio::test]
async fn test_run_cancelled_shouldKeepDictionaryResults() {
    let dir = common::create_temp_dir().unwrap();
    let mut config = prepare(dir.path());
    config.translation.enabled = true;
    config.translation.api_keys = vec!["key-1".to_string()];

    let provider = MockProvider::working();
    let controller = Controller::with_config(config)
        .unwrap()
        .with_translator(mock_translator(&provider))
        .without_progress();
    controller.cancellation().cancel();

    let report = controller.run().await;
    assert!(report.success, "{}", report.message);
    assert_eq!(provider.request_count(), 0);
    assert_eq!(report.stats.count(SourceTag::Pending), 1);
    assert_eq!(output_file(&report.output_path.unwrap()), r#"{"a":"你好"}"#);
}

#[tokio::test]
async fn test_run_withPersonalEntry_shouldOverrideCommunity() {
    let dir = common::create_temp_dir().unwrap();
    let config = prepare(dir.path());
    let mut personal = PersonalDictionary::load(&config.paths.personal_dictionary).unwrap();
    personal.insert("a", "Hello", "哈喽").unwrap();
    personal.insert("x", "World", "世界").unwrap();

    let report = Controller::with_config(config).unwrap().without_progress().run().await;

    assert!(report.success, "{}", report.message);
    assert_eq!(report.stats.count(SourceTag::PersonalKey), 1);
    assert_eq!(report.stats.count(SourceTag::PersonalOrigin), 1);
    assert_eq!(
        output_file(&report.output_path.unwrap()),
        "{\"a\":\"哈喽\",\n  \"b\": \"世界\"\n}"
    );
}

#[tokio::test]
async fn test_run_twice_shouldNotOverwriteEarlierPack() {
    let dir = common::create_temp_dir().unwrap();
    let config = prepare(dir.path());

    let first = Controller::with_config(config.clone()).unwrap().without_progress().run().await;
    let second = Controller::with_config(config).unwrap().without_progress().run().await;

    let first = first.output_path.unwrap();
    let second = second.output_path.unwrap();
    assert_ne!(first, second);
    assert!(second.ends_with("Modlang Translations (1)"));
    assert!(first.join("pack.mcmeta").is_file());
}

#[tokio::test]
async fn test_run_whenLaterArchiveAddsLangFormat_shouldWriteBothFiles() {
    let dir = common::create_temp_dir().unwrap();
    let mut config = common::test_config(dir.path()).unwrap();
    common::create_mod_archive(
        &config.paths.mods_dir,
        "one.jar",
        &[("assets/modA/lang/en_us.json", r#"{"a":"Apple"}"#)],
    )
    .unwrap();
    common::create_mod_archive(
        &config.paths.mods_dir,
        "two.jar",
        &[
            ("assets/modA/lang/en_us.json", r#"{"b":"Berry"}"#),
            ("assets/modA/lang/en_us.lang", "c=Cherry\n"),
        ],
    )
    .unwrap();
    let store = common::create_community_store(
        dir.path(),
        &[("a", "Apple", "苹果", None), ("b", "Berry", "浆果", None), ("c", "Cherry", "樱桃", None)],
    )
    .unwrap();
    config.paths.community_dictionary = Some(store);

    let report = Controller::with_config(config).unwrap().without_progress().run().await;

    assert!(report.success, "{}", report.message);
    assert_eq!(report.stats.count(SourceTag::CommunityKey), 3);
    let pack = report.output_path.unwrap();
    let json = output_file(&pack);
    assert!(json.contains("苹果"), "{}", json);
    assert!(json.contains("浆果"), "{}", json);
    let lang = fs::read_to_string(pack.join("assets/modA/lang/zh_cn.lang")).unwrap();
    assert!(lang.contains("樱桃"), "{}", lang);
}

#[test]
fn test_run_withEmptyModsDir_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let config = common::test_config(dir.path()).unwrap();

    let report = tokio_test::block_on(async {
        Controller::with_config(config).unwrap().without_progress().run().await
    });
    assert!(!report.success);
    assert!(report.output_path.is_none());
}
