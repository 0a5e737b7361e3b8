/*!
 * Batch translation processing.
 *
 * Pending strings are split into batches and dispatched by a fixed-size
 * worker pool. Within a batch, identical strings are sent once, cached
 * strings are not sent at all, and a failed attempt is retried with a freshly
 * acquired credential. After the last attempt, whatever is still missing
 * falls back to its source text, so no item is ever dropped.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};

use super::CancellationFlag;
use super::cache::TranslationCache;
use super::key_pool::{ApiKeyPool, CooldownPolicy, FailureClass, mask_key};
use super::prompts::PromptTemplate;
use super::response::parse_response;
use crate::app_config::Config;
use crate::language_utils::locale_display_name;
use crate::providers::{ChatMessage, ChatRequest, OpenAI, Provider};

/// Tuning of the batch client
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Strings per request
    pub batch_size: usize,
    /// Source characters per request
    pub max_chars: usize,
    /// Concurrent requests
    pub workers: usize,
    /// Attempts per batch before falling back to source text
    pub max_attempts: usize,
    /// Model name sent to the provider
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Source language name used in the prompt
    pub source_language: String,
    /// Target language name used in the prompt
    pub target_language: String,
    /// Target locale, part of the cache key
    pub target_locale: String,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 40,
            max_chars: 4000,
            workers: 4,
            max_attempts: 3,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            source_language: "English".to_string(),
            target_language: "Simplified Chinese".to_string(),
            target_locale: "zh_cn".to_string(),
        }
    }
}

/// Batch translator for pending strings
pub struct BatchTranslator {
    /// Translation endpoint
    provider: Arc<dyn Provider>,

    /// Credential pool shared by all workers
    pool: Arc<ApiKeyPool>,

    /// Result cache shared by all workers
    cache: TranslationCache,

    /// System prompt
    template: PromptTemplate,

    /// Tuning
    options: BatchOptions,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(
        provider: Arc<dyn Provider>,
        pool: Arc<ApiKeyPool>,
        cache: TranslationCache,
        options: BatchOptions,
    ) -> Self {
        Self {
            provider,
            pool,
            cache,
            template: PromptTemplate::default(),
            options,
        }
    }

    /// Build a translator talking to the configured OpenAI-compatible endpoint
    pub fn from_config(config: &Config) -> Result<Self> {
        let translation = &config.translation;

        let policy = CooldownPolicy {
            rate_limit: Duration::from_secs(translation.rate_limit_cooldown_secs),
            malformed: Duration::from_secs(translation.malformed_cooldown_secs),
            transient_base: Duration::from_secs(translation.backoff_base_secs),
            transient_cap: Duration::from_secs(translation.backoff_cap_secs),
            ..CooldownPolicy::default()
        };
        let pool = ApiKeyPool::new(translation.resolved_api_keys(), policy);
        let provider = OpenAI::new(
            translation.endpoint.clone(),
            Duration::from_secs(translation.timeout_secs),
        );
        let cache = TranslationCache::new(
            translation.cache_enabled,
            Duration::from_secs(translation.cache_ttl_secs),
        );

        let options = BatchOptions {
            batch_size: translation.batch_size,
            max_chars: translation.max_batch_chars,
            workers: translation.workers,
            max_attempts: translation.max_attempts,
            model: translation.model.clone(),
            temperature: translation.temperature,
            source_language: locale_display_name(&config.original_locale)?,
            target_language: locale_display_name(&config.target_locale)?,
            target_locale: config.target_locale.clone(),
        };

        let mut translator = Self::new(Arc::new(provider), Arc::new(pool), cache, options);
        if let Some(template) = &translation.prompt_template {
            translator = translator.with_template(PromptTemplate::new(template));
        }
        Ok(translator)
    }

    /// Replace the instruction template
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Tuning in effect
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Shared credential pool
    pub fn pool(&self) -> &Arc<ApiKeyPool> {
        &self.pool
    }

    /// Shared result cache
    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Translate a flat list of strings, keeping its order
    pub async fn translate_all(
        &self,
        texts: &[String],
        cancel: &CancellationFlag,
        progress_callback: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> Vec<Option<String>> {
        let batches = split_into_batches(texts, self.options.batch_size, self.options.max_chars);
        self.translate_batches(&batches, cancel, progress_callback)
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Translate batches concurrently; results come back in batch order
    pub async fn translate_batches(
        &self,
        batches: &[Vec<String>],
        cancel: &CancellationFlag,
        progress_callback: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> Vec<Vec<Option<String>>> {
        let total_batches = batches.len();
        let processed_batches = Arc::new(AtomicUsize::new(0));
        let workers = self.options.workers.max(1);

        info!(
            "Translating {} batch(es) with {} worker(s)",
            total_batches, workers
        );

        let mut results = stream::iter(batches.iter().enumerate())
            .map(|(batch_index, batch)| {
                let processed_batches = processed_batches.clone();
                let progress_callback = progress_callback.clone();

                async move {
                    let start_time = Instant::now();
                    let result = self.translate_batch(batch, cancel).await;

                    let current = processed_batches.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(current, total_batches);
                    debug!(
                        "Batch {} of {} finished in {:?}",
                        batch_index + 1,
                        total_batches,
                        start_time.elapsed()
                    );

                    (batch_index, result)
                }
            })
            .buffer_unordered(workers)
            .collect::<Vec<_>>()
            .await;

        // Sort results by batch index to maintain original order
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }

    /// Translate one batch. Every item is `None` if the run was cancelled.
    pub async fn translate_batch(&self, batch: &[String], cancel: &CancellationFlag) -> Vec<Option<String>> {
        if batch.is_empty() {
            return Vec::new();
        }
        if cancel.is_cancelled() {
            return vec![None; batch.len()];
        }

        // Deduplicate: `unique[i]` is sent once, `positions[j]` points into it
        let mut unique: Vec<&str> = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let positions: Vec<usize> = batch
            .iter()
            .map(|text| {
                *seen.entry(text.as_str()).or_insert_with(|| {
                    unique.push(text.as_str());
                    unique.len() - 1
                })
            })
            .collect();

        let mut resolved: Vec<Option<String>> = unique
            .iter()
            .map(|text| self.cache.get(text, &self.options.target_locale))
            .collect();

        let residue: Vec<usize> = (0..unique.len()).filter(|&i| resolved[i].is_none()).collect();
        if !residue.is_empty() {
            let texts: Vec<&str> = residue.iter().map(|&i| unique[i]).collect();
            match self.dispatch(&texts, cancel).await {
                Some(translations) => {
                    for (slot, translation) in residue.iter().zip(translations) {
                        match translation {
                            Some(text) => {
                                self.cache.store(unique[*slot], &self.options.target_locale, &text);
                                resolved[*slot] = Some(text);
                            }
                            None => resolved[*slot] = Some(unique[*slot].to_string()),
                        }
                    }
                }
                None => return vec![None; batch.len()],
            }
        }

        positions
            .into_iter()
            .map(|position| resolved[position].clone())
            .collect()
    }

    /// Send the residue, retrying with fresh credentials.
    ///
    /// Returns `None` when cancelled; otherwise one entry per text, `None`
    /// where no attempt produced a usable translation.
    async fn dispatch(&self, texts: &[&str], cancel: &CancellationFlag) -> Option<Vec<Option<String>>> {
        let request = ChatRequest::new(self.options.model.clone())
            .temperature(self.options.temperature)
            .add_message(ChatMessage::user(self.template.compose(
                &self.options.source_language,
                &self.options.target_language,
                texts,
            )));

        for attempt in 1..=self.options.max_attempts.max(1) {
            if cancel.is_cancelled() {
                return None;
            }

            let Some(key) = self.pool.acquire(cancel).await else {
                if cancel.is_cancelled() {
                    return None;
                }
                warn!("No credentials configured, falling back to source text");
                break;
            };

            if cancel.is_cancelled() {
                self.pool.release(&key);
                return None;
            }

            match self.provider.complete(&key, request.clone()).await {
                Ok(response) => {
                    if let Some(usage) = &response.usage {
                        debug!(
                            "{} string(s) cost {} prompt + {} completion token(s)",
                            texts.len(),
                            usage.prompt_tokens,
                            usage.completion_tokens
                        );
                    }
                    let parsed = parse_response(response.text(), texts.len());
                    if parsed.matched() == 0 {
                        warn!(
                            "Attempt {}/{} with {}: unusable answer{}",
                            attempt,
                            self.options.max_attempts,
                            mask_key(&key),
                            if parsed.apology { " (refusal)" } else { "" }
                        );
                        self.pool.penalize(&key, FailureClass::MalformedResponse);
                        continue;
                    }

                    self.pool.release(&key);
                    if parsed.matched() < texts.len() {
                        debug!(
                            "Answer covered {} of {} strings, the rest keep their source text",
                            parsed.matched(),
                            texts.len()
                        );
                    }
                    return Some(parsed.translations);
                }
                Err(e) => {
                    let class = FailureClass::from_provider_error(&e);
                    warn!(
                        "Attempt {}/{} with {} failed: {}",
                        attempt,
                        self.options.max_attempts,
                        mask_key(&key),
                        e
                    );
                    self.pool.penalize(&key, class);
                }
            }
        }

        warn!(
            "Giving up on a batch of {} string(s), keeping source text",
            texts.len()
        );
        Some(vec![None; texts.len()])
    }
}

/// Split strings into batches bounded by count and total characters.
///
/// A single string longer than `max_chars` still gets a batch of its own.
pub fn split_into_batches(texts: &[String], batch_size: usize, max_chars: usize) -> Vec<Vec<String>> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_chars = 0;

    for text in texts {
        let chars = text.chars().count();
        if !current.is_empty() && (current.len() >= batch_size || current_chars + chars > max_chars) {
            batches.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        current.push(text.clone());
        current_chars += chars;
    }
    if !current.is_empty() {
        batches.push(current);
    }

    batches
}
