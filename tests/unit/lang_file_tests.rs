/*!
 * Tests for span scanning and format-preserving regeneration
 */

use indexmap::IndexMap;

use modlang::lang_file::{extract_pairs, key_order};
use modlang::model::LangFormat;
use modlang::regenerator::{regenerate, regenerate_robust};

fn translations(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

const JSON_TEMPLATE: &str = r#"{
    // odd but common in mod files
    "item.moda.ruby":    "Ruby",

    "item.moda.sapphire" : "Sapphire",
    "tooltip.moda.count": "Has %d \"gems\""
}
"#;

const LANG_TEMPLATE: &str = "# Mod A\n\nitem.moda.ruby=Ruby\n  item.moda.sapphire = Sapphire\n\n# end\n";

#[test]
fn test_extractPairs_withCommentedJson_shouldStillFindPairs() {
    let pairs = extract_pairs(JSON_TEMPLATE, LangFormat::Json);
    assert_eq!(pairs.len(), 3);
    assert_eq!(pairs["tooltip.moda.count"], "Has %d \"gems\"");
    assert_eq!(
        key_order(JSON_TEMPLATE, LangFormat::Json),
        vec!["item.moda.ruby", "item.moda.sapphire", "tooltip.moda.count"]
    );
}

#[test]
fn test_regenerate_json_shouldKeepCommentsAndSpacing() {
    let output = regenerate(
        JSON_TEMPLATE,
        LangFormat::Json,
        &translations(&[("item.moda.ruby", "红宝石")]),
    );

    assert!(output.contains("// odd but common in mod files"));
    assert!(output.contains(r#""item.moda.ruby":"红宝石","#));
    assert!(output.contains(r#""item.moda.sapphire" : "Sapphire""#));
    assert!(output.ends_with("}\n"));
}

#[test]
fn test_regenerate_lang_shouldKeepCommentsAndBlankLines() {
    let output = regenerate(
        LANG_TEMPLATE,
        LangFormat::Lang,
        &translations(&[("item.moda.sapphire", "蓝宝石")]),
    );

    assert_eq!(
        output,
        "# Mod A\n\nitem.moda.ruby=Ruby\n  item.moda.sapphire = 蓝宝石\n\n# end\n"
    );
}

#[test]
fn test_regenerate_lang_withMultilineValue_shouldFlatten() {
    let output = regenerate(
        "a=A\n",
        LangFormat::Lang,
        &translations(&[("a", "第一行\n第二行")]),
    );
    assert_eq!(output, "a = 第一行\\n第二行\n");
}

#[test]
fn test_regenerateRobust_withAllKeysPresent_shouldMatchRegenerate() {
    let map = translations(&[("item.moda.ruby", "红宝石"), ("item.moda.sapphire", "蓝宝石")]);
    assert_eq!(
        regenerate_robust(JSON_TEMPLATE, LangFormat::Json, &map),
        regenerate(JSON_TEMPLATE, LangFormat::Json, &map)
    );
}

#[test]
fn test_regenerateRobust_json_shouldProduceParsableOutput() {
    let map = translations(&[("a", "你好"), ("b", "世界")]);
    let output = regenerate_robust("{\"a\":\"Hello\"}", LangFormat::Json, &map);

    let parsed: IndexMap<String, String> = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed, map);
}

#[test]
fn test_regenerateRobust_withEmptyTranslation_shouldNotAppend() {
    let map = translations(&[("b", "")]);
    assert_eq!(regenerate_robust("a=A\n", LangFormat::Lang, &map), "a=A\n");
}
