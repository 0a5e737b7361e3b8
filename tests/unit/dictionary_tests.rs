/*!
 * Tests for the personal and community dictionaries
 */

use modlang::dictionary::{CommunityDictionary, PersonalDictionary};
use modlang::errors::DictionaryError;

use crate::common;

#[test]
fn test_communityDictionary_open_shouldSkipBlankTranslations() {
    let dir = common::create_temp_dir().unwrap();
    let store = common::create_community_store(
        dir.path(),
        &[
            ("a", "Hello", "你好", Some("1.0")),
            ("b", "World", "  ", None),
            ("", "Ruby", "红宝石", Some("2.1")),
        ],
    )
    .unwrap();

    let dict = CommunityDictionary::open(&store, "dict").unwrap();
    assert_eq!(dict.row_count(), 2);

    let index = dict.index();
    assert_eq!(index.by_key("a"), Some("你好"));
    assert_eq!(index.by_key("b"), None);
    assert_eq!(index.by_origin("Ruby").len(), 1);
    assert_eq!(index.by_origin("Ruby")[0].version.as_deref(), Some("2.1"));
}

#[test]
fn test_communityDictionary_withRepeatedKey_shouldKeepLastRow() {
    let dir = common::create_temp_dir().unwrap();
    let store = common::create_community_store(
        dir.path(),
        &[("a", "Hello", "哈喽", None), ("a", "Hello", "你好", None)],
    )
    .unwrap();

    let index = CommunityDictionary::open(&store, "dict").unwrap().into_index();
    assert_eq!(index.by_key("a"), Some("你好"));
    assert_eq!(index.by_origin("Hello").len(), 2);
}

#[test]
fn test_communityDictionary_withWrongTable_shouldError() {
    let dir = common::create_temp_dir().unwrap();
    let store = common::create_community_store(dir.path(), &[]).unwrap();

    assert!(matches!(
        CommunityDictionary::open(&store, "terms"),
        Err(DictionaryError::Store(_))
    ));
}

#[test]
fn test_personalDictionary_insert_shouldReplaceExistingKey() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("personal.json");

    let mut dict = PersonalDictionary::load(&path).unwrap();
    dict.insert("item.moda.ruby", "Ruby", "红玉").unwrap();
    dict.insert("item.moda.ruby", "Ruby", "红宝石").unwrap();

    let reloaded = PersonalDictionary::load(&path).unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.index().by_key("item.moda.ruby"), Some("红宝石"));
}
