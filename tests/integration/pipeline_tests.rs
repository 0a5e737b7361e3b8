/*!
 * Extraction, resolution, regeneration and pack output wired together
 */

use std::fs;
use std::io::Read;

use modlang::aggregator::Aggregator;
use modlang::archive_scanner::{ArchiveScanner, collect_archives};
use modlang::dictionary::{CommunityDictionary, DictionaryIndex};
use modlang::model::{LangFormat, SourceTag};
use modlang::pack_builder::{OutputMode, PackBuilder, PackFile, PackOptions};
use modlang::regenerator::regenerate_robust;
use modlang::resolution::{ResolutionEngine, ResolutionOptions};

use crate::common;

#[test]
fn test_pipeline_twoArchivesSameNamespace_shouldMergeAndResolveByCommunityKey() {
    let dir = common::create_temp_dir().unwrap();
    let mods = dir.path().join("mods");
    fs::create_dir_all(&mods).unwrap();
    common::create_mod_archive(&mods, "first.jar", &[("assets/modA/lang/en_us.json", r#"{"a":"Hello"}"#)])
        .unwrap();
    common::create_mod_archive(&mods, "second.jar", &[("assets/modA/lang/en_us.json", r#"{"b":"World"}"#)])
        .unwrap();
    let store = common::create_community_store(dir.path(), &[("a", "", "你好", None)]).unwrap();

    let archives = collect_archives(&mods);
    assert_eq!(archives.len(), 2);

    let extraction = Aggregator::new(ArchiveScanner::default())
        .aggregate(&archives, &[])
        .unwrap();
    assert_eq!(extraction.namespace_count(), 1);
    assert_eq!(extraction.key_count(), 2);

    let personal = DictionaryIndex::new();
    let community = CommunityDictionary::open(&store, "dict").unwrap().into_index();
    let result = ResolutionEngine::new(&personal, &community, ResolutionOptions::default()).resolve(&extraction);

    let entries = &result.entries["modA"];
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].key, "a");
    assert_eq!(entries[0].translation.as_deref(), Some("你好"));
    assert_eq!(entries[0].source, SourceTag::CommunityKey);
    assert_eq!(entries[1].key, "b");
    assert!(entries[1].is_pending());
    assert_eq!(entries[1].source, SourceTag::Pending);
}

#[test]
fn test_pipeline_withBundledAndPack_shouldPreferBundled() {
    let dir = common::create_temp_dir().unwrap();
    let mods = dir.path().join("mods");
    let packs = dir.path().join("packs");
    fs::create_dir_all(&mods).unwrap();
    fs::create_dir_all(&packs).unwrap();

    common::create_mod_archive(
        &mods,
        "gems.jar",
        &[
            ("assets/gems/lang/en_us.lang", "gem.ruby=Ruby\ngem.opal=Opal\ngem.jade=Jade\n"),
            ("assets/gems/lang/zh_cn.lang", "gem.ruby=红宝石\n"),
        ],
    )
    .unwrap();
    common::create_mod_archive(
        &packs,
        "community-pack.zip",
        &[("assets/gems/lang/zh_cn.lang", "gem.ruby=红玉\ngem.opal=蛋白石\ngem.jade=Jade\n")],
    )
    .unwrap();

    let extraction = Aggregator::new(ArchiveScanner::default())
        .aggregate(&collect_archives(&mods), &[packs.join("community-pack.zip")])
        .unwrap();
    // identical to the original, so dropped from the pool
    assert!(!extraction.pack_translations.contains_key("gem.jade"));

    let empty = DictionaryIndex::new();
    let result = ResolutionEngine::new(&empty, &empty, ResolutionOptions::default()).resolve(&extraction);
    let translations = result.translation_map("gems");
    assert_eq!(translations["gem.ruby"], "红宝石");
    assert_eq!(translations["gem.opal"], "蛋白石");
    assert!(!translations.contains_key("gem.jade"));
    assert_eq!(result.stats.count(SourceTag::Bundled), 1);
    assert_eq!(result.stats.count(SourceTag::PackKey), 1);
}

#[test]
fn test_pipeline_archiveOutput_shouldContainRegeneratedFiles() {
    let dir = common::create_temp_dir().unwrap();
    let template = "{\n  \"a\": \"Hello\",\n  \"b\": \"World\"\n}\n";
    let translations = [("a".to_string(), "你好".to_string())].into_iter().collect();
    let content = regenerate_robust(template, LangFormat::Json, &translations);

    let builder = PackBuilder::new(PackOptions {
        name: "Test Pack".to_string(),
        description: "Translations".to_string(),
        pack_format: 15,
        icon: None,
        target_locale: "zh_cn".to_string(),
        mode: OutputMode::Archive,
    });
    let path = builder
        .build(
            dir.path(),
            &[PackFile {
                asset_namespace: "modA".to_string(),
                format: LangFormat::Json,
                content,
            }],
        )
        .unwrap();
    assert_eq!(path, dir.path().join("Test Pack.zip"));

    let mut archive = zip::ZipArchive::new(fs::File::open(&path).unwrap()).unwrap();
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    assert!(names.contains(&"pack.mcmeta".to_string()));

    let mut text = String::new();
    archive
        .by_name("assets/modA/lang/zh_cn.json")
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    assert_eq!(text, "{\n  \"a\":\"你好\",\n  \"b\": \"World\"\n}\n");

    // no staging leftovers next to the pack
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(".modlang-"))
        .collect();
    assert!(leftovers.is_empty());
}
