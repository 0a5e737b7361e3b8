/*!
 * Tests for the source cascade
 */

use indexmap::IndexMap;

use modlang::dictionary::DictionaryIndex;
use modlang::model::{ExtractionResult, LangFormat, NamespaceInfo, SourceTag};
use modlang::resolution::{ResolutionEngine, ResolutionOptions};

fn extraction(pairs: &[(&str, &str)]) -> ExtractionResult {
    let mut result = ExtractionResult::default();
    let originals: IndexMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let raw_text = serde_json::to_string(&originals).unwrap();

    result.namespaces.insert(
        "moda".to_string(),
        NamespaceInfo {
            name: "moda".to_string(),
            asset_namespace: "moda".to_string(),
            archive_name: "moda.jar".to_string(),
            format: LangFormat::Json,
            raw_text,
        },
    );
    result.originals.insert("moda".to_string(), originals);
    result
}

fn resolve_one(
    extraction: &ExtractionResult,
    personal: &DictionaryIndex,
    community: &DictionaryIndex,
    options: ResolutionOptions,
    key: &str,
) -> (Option<String>, SourceTag) {
    let result = ResolutionEngine::new(personal, community, options).resolve(extraction);
    let entry = result.entries["moda"]
        .iter()
        .find(|entry| entry.key == key)
        .cloned()
        .unwrap();
    (entry.translation, entry.source)
}

#[test]
fn test_resolve_withBundledValue_shouldWinOverEverything() {
    let mut data = extraction(&[("a", "Hello")]);
    data.bundled.insert(
        "moda".to_string(),
        IndexMap::from([("a".to_string(), "捆绑".to_string())]),
    );
    let mut personal = DictionaryIndex::new();
    personal.insert_key("a", "个人");
    let mut community = DictionaryIndex::new();
    community.insert_key("a", "社区");

    let (translation, source) = resolve_one(&data, &personal, &community, ResolutionOptions::default(), "a");
    assert_eq!(translation.as_deref(), Some("捆绑"));
    assert_eq!(source, SourceTag::Bundled);
}

#[test]
fn test_resolve_withPersonalKey_shouldBeatCommunity() {
    let data = extraction(&[("a", "Hello")]);
    let mut personal = DictionaryIndex::new();
    personal.insert_key("a", "个人");
    let mut community = DictionaryIndex::new();
    community.insert_key("a", "社区");

    let (translation, source) = resolve_one(&data, &personal, &community, ResolutionOptions::default(), "a");
    assert_eq!(translation.as_deref(), Some("个人"));
    assert_eq!(source, SourceTag::PersonalKey);
}

#[test]
fn test_resolve_withOriginLookupDisabled_shouldSkipPersonalOrigin() {
    let data = extraction(&[("a", "Hello")]);
    let mut personal = DictionaryIndex::new();
    personal.insert_origin("Hello", "你好", None);
    let mut community = DictionaryIndex::new();
    community.insert_key("a", "社区");

    let enabled = resolve_one(&data, &personal, &community, ResolutionOptions::default(), "a");
    assert_eq!(enabled.1, SourceTag::PersonalOrigin);

    let disabled = resolve_one(
        &data,
        &personal,
        &community,
        ResolutionOptions { origin_lookup: false },
        "a",
    );
    assert_eq!(disabled.0.as_deref(), Some("社区"));
    assert_eq!(disabled.1, SourceTag::CommunityKey);
}

#[test]
fn test_resolve_withoutLatinLetters_shouldPassThrough() {
    let data = extraction(&[("a", "★ 100%")]);
    let empty = DictionaryIndex::new();

    let (translation, source) = resolve_one(&data, &empty, &empty, ResolutionOptions::default(), "a");
    assert_eq!(translation.as_deref(), Some("★ 100%"));
    assert_eq!(source, SourceTag::Passthrough);
}

#[test]
fn test_resolve_withPackTranslation_shouldBeatCommunity() {
    let mut data = extraction(&[("a", "Hello")]);
    data.pack_translations.insert("a".to_string(), "资源包".to_string());
    let empty = DictionaryIndex::new();
    let mut community = DictionaryIndex::new();
    community.insert_key("a", "社区");

    let (translation, source) = resolve_one(&data, &empty, &community, ResolutionOptions::default(), "a");
    assert_eq!(translation.as_deref(), Some("资源包"));
    assert_eq!(source, SourceTag::PackKey);
}

#[test]
fn test_resolve_withLatinOnlyCandidate_shouldStayPending() {
    let data = extraction(&[("a", "Hello")]);
    let empty = DictionaryIndex::new();
    let mut community = DictionaryIndex::new();
    community.insert_key("a", "Hello");

    let (translation, source) = resolve_one(&data, &empty, &community, ResolutionOptions::default(), "a");
    assert_eq!(translation, None);
    assert_eq!(source, SourceTag::Pending);
}

#[test]
fn test_resolve_withInvalidEarlyCandidate_shouldFallThrough() {
    let data = extraction(&[("a", "Hello")]);
    let mut personal = DictionaryIndex::new();
    personal.insert_key("a", "Hello again");
    let mut community = DictionaryIndex::new();
    community.insert_origin("Hello", "你好", Some("1.0"));

    let (translation, source) = resolve_one(&data, &personal, &community, ResolutionOptions::default(), "a");
    assert_eq!(translation.as_deref(), Some("你好"));
    assert_eq!(source, SourceTag::CommunityOrigin);
}

#[test]
fn test_resolve_withConflictingOrigins_shouldPreferFrequency() {
    let data = extraction(&[("a", "Ruby")]);
    let empty = DictionaryIndex::new();
    let mut community = DictionaryIndex::new();
    community.insert_origin("Ruby", "红宝石", Some("1.0"));
    community.insert_origin("Ruby", "红玉", Some("9.0"));
    community.insert_origin("Ruby", "红宝石", Some("0.1"));

    let (translation, _) = resolve_one(&data, &empty, &empty.clone(), ResolutionOptions::default(), "a");
    assert_eq!(translation, None);

    let (translation, source) = resolve_one(&data, &empty, &community, ResolutionOptions::default(), "a");
    assert_eq!(translation.as_deref(), Some("红宝石"));
    assert_eq!(source, SourceTag::CommunityOrigin);
}

#[test]
fn test_resolve_shouldKeepTemplateOrderAndCountSources() {
    let data = extraction(&[("b", "World"), ("a", "Hello"), ("c", "123")]);
    let empty = DictionaryIndex::new();
    let mut community = DictionaryIndex::new();
    community.insert_key("a", "你好");

    let result = ResolutionEngine::new(&empty, &community, ResolutionOptions::default()).resolve(&data);
    let keys: Vec<&str> = result.entries["moda"].iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["b", "a", "c"]);

    assert_eq!(result.stats.total(), 3);
    assert_eq!(result.stats.count(SourceTag::CommunityKey), 1);
    assert_eq!(result.stats.count(SourceTag::Passthrough), 1);
    assert_eq!(result.stats.count(SourceTag::Pending), 1);
    assert_eq!(result.pending().len(), 1);
}

#[test]
fn test_resolve_twiceOnSameInputs_shouldGiveIdenticalResults() {
    let mut data = extraction(&[
        ("a", "Hello"),
        ("b", "World"),
        ("c", "Stone"),
        ("d", "Ruby"),
        ("e", "木头"),
        ("f", "Nothing known"),
    ]);
    data.bundled.insert(
        "moda".to_string(),
        IndexMap::from([("a".to_string(), "捆绑".to_string())]),
    );
    data.pack_translations.insert("d".to_string(), "红宝石".to_string());
    let mut personal = DictionaryIndex::new();
    personal.insert_origin("World", "世界", None);
    let mut community = DictionaryIndex::new();
    community.insert_key("c", "石头");
    community.insert_origin("Stone", "岩石", Some("1.0"));
    community.insert_origin("Stone", "石头", Some("2.0"));

    let engine = ResolutionEngine::new(&personal, &community, ResolutionOptions::default());
    let first = engine.resolve(&data);
    let second = engine.resolve(&data);

    assert_eq!(first, second);
    assert_eq!(first.stats.total(), 6);
    assert_eq!(first.stats.count(SourceTag::Pending), 1);
}
