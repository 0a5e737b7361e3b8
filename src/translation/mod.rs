/*!
 * Resilient batch translation of pending strings.
 *
 * - `batch`: batching, worker pool, retries and fallback
 * - `cache`: time-limited result cache
 * - `key_pool`: rotating credential pool with cooldowns
 * - `prompts`: instruction template and request payload
 * - `response`: reconciliation of answers with requests
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// Re-export main types for easier usage
pub use self::batch::{BatchOptions, BatchTranslator, split_into_batches};
pub use self::cache::TranslationCache;
pub use self::key_pool::{ApiKeyPool, CooldownPolicy, FailureClass};
pub use self::prompts::PromptTemplate;

// Submodules
pub mod batch;
pub mod cache;
pub mod key_pool;
pub mod prompts;
pub mod response;

/// Shared cancellation signal; clones observe the same flag
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// A flag that is not set
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
