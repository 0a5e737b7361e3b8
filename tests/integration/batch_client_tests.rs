/*!
 * Batch client behaviour against mock providers
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use modlang::providers::MockProvider;
use modlang::providers::mock::KeyFailure;
use modlang::translation::{
    ApiKeyPool, BatchOptions, BatchTranslator, CancellationFlag, CooldownPolicy, TranslationCache,
};

use crate::common;

fn strings(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|text| text.to_string()).collect()
}

fn translator(provider: &MockProvider, keys: &[&str], options: BatchOptions) -> BatchTranslator {
    let pool = ApiKeyPool::new(strings(keys), CooldownPolicy::default())
        .with_poll_interval(Duration::from_millis(5));
    BatchTranslator::new(
        Arc::new(provider.clone()),
        Arc::new(pool),
        TranslationCache::new(true, Duration::from_secs(3600)),
        options,
    )
}

#[tokio::test]
async fn test_translateAll_withRateLimitedFirstKey_shouldCompleteWithOtherKeys() {
    common::init_test_logging();
    let provider = MockProvider::working().with_key_failure("key-1", KeyFailure::RateLimited);
    let translator = translator(
        &provider,
        &["key-1", "key-2", "key-3"],
        BatchOptions {
            batch_size: 2,
            workers: 1,
            ..BatchOptions::default()
        },
    );
    let started = Instant::now();

    let texts = strings(&["Hello", "World", "Ruby", "Opal"]);
    let results = translator.translate_all(&texts, &CancellationFlag::new(), |_, _| {}).await;

    assert_eq!(
        results,
        vec![
            Some("译Hello".to_string()),
            Some("译World".to_string()),
            Some("译Ruby".to_string()),
            Some("译Opal".to_string()),
        ]
    );

    let used = provider.keys_used();
    assert_eq!(used[0], "key-1");
    assert_eq!(used.iter().filter(|key| key.as_str() == "key-1").count(), 1);
    assert!(used[1..].iter().all(|key| key == "key-2" || key == "key-3"));

    // key-1 stays out of rotation until its rate-limit cooldown ends
    let until = translator.pool().cooldown_until("key-1").unwrap();
    assert!(until > Instant::now());
    assert!(until >= started + Duration::from_secs(50));
    assert!(translator.pool().cooldown_until("key-2").is_none());
    assert_eq!(translator.pool().available_count(), 2);
}

#[tokio::test]
async fn test_translateAll_sameStringTwice_shouldIssueOneRequest() {
    let provider = MockProvider::working();
    let translator = translator(&provider, &["key-1"], BatchOptions::default());
    let cancel = CancellationFlag::new();

    let first = translator.translate_all(&strings(&["Hello"]), &cancel, |_, _| {}).await;
    let second = translator.translate_all(&strings(&["Hello"]), &cancel, |_, _| {}).await;

    assert_eq!(first, second);
    assert_eq!(provider.request_count(), 1);
    let (hits, misses, _) = translator.cache().stats();
    assert_eq!((hits, misses), (1, 1));
}

#[tokio::test]
async fn test_translateAll_withManyBatches_shouldKeepInputOrder() {
    let provider = MockProvider::working().with_delay(Duration::from_millis(5));
    let translator = translator(
        &provider,
        &["key-1", "key-2", "key-3", "key-4"],
        BatchOptions {
            batch_size: 3,
            workers: 4,
            ..BatchOptions::default()
        },
    );

    let texts: Vec<String> = (0..20).map(|i| format!("Line {}", i)).collect();
    let results = translator.translate_all(&texts, &CancellationFlag::new(), |_, _| {}).await;

    assert_eq!(results.len(), 20);
    for (text, result) in texts.iter().zip(&results) {
        assert_eq!(result.as_deref(), Some(format!("译{}", text).as_str()));
    }
    assert_eq!(provider.request_count(), 7);
}

#[tokio::test]
async fn test_translateAll_withFencedAnswers_shouldStillParse() {
    let provider = MockProvider::fenced();
    let translator = translator(&provider, &["key-1"], BatchOptions::default());

    let results = translator
        .translate_all(&strings(&["Hello", "World"]), &CancellationFlag::new(), |_, _| {})
        .await;
    assert_eq!(
        results,
        vec![Some("译Hello".to_string()), Some("译World".to_string())]
    );
}

#[tokio::test]
async fn test_translateAll_withEveryKeyFailing_shouldFallBackToSource() {
    let provider = MockProvider::failing();
    let translator = translator(
        &provider,
        &["key-1", "key-2", "key-3"],
        BatchOptions {
            max_attempts: 3,
            ..BatchOptions::default()
        },
    );

    let texts = strings(&["Hello", "World"]);
    let results = translator.translate_all(&texts, &CancellationFlag::new(), |_, _| {}).await;

    assert_eq!(results, vec![Some("Hello".to_string()), Some("World".to_string())]);
    assert_eq!(provider.request_count(), 3);
    // fallbacks are not cached
    assert!(translator.cache().is_empty());
}

#[tokio::test]
async fn test_translateAll_cancelledBeforeStart_shouldReturnNoneForEveryItem() {
    let provider = MockProvider::working();
    let translator = translator(&provider, &["key-1"], BatchOptions::default());
    let cancel = CancellationFlag::new();
    cancel.cancel();

    let results = translator
        .translate_all(&strings(&["Hello", "World", "Hello"]), &cancel, |_, _| {})
        .await;
    assert_eq!(results, vec![None, None, None]);
    assert_eq!(provider.request_count(), 0);
}
