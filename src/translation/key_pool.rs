/*!
 * Rotating pool of API credentials.
 *
 * Each credential moves through `Available → InUse → Available` on success
 * or `InUse → Cooling → Available` on failure. Cooling credentials are
 * re-admitted lazily on the next acquisition attempt once their cooldown has
 * passed; there is no timer thread. The collection itself is never exposed:
 * callers only acquire, release and penalize.
 */

use std::time::{Duration, Instant};

use log::{debug, warn};
use parking_lot::Mutex;
use rand::Rng;

use super::CancellationFlag;
use crate::errors::ProviderError;

/// Why a request failed, deciding how long its credential cools down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// Provider signalled a rate limit
    RateLimited,
    /// Credential rejected or needs account verification
    AccountVerification,
    /// Response arrived but could not be used
    MalformedResponse,
    /// Network or server failure
    Transient,
}

impl FailureClass {
    /// Classify a provider error
    pub fn from_provider_error(error: &ProviderError) -> Self {
        match error {
            ProviderError::RateLimitExceeded(_) => Self::RateLimited,
            ProviderError::AuthenticationError(_) => Self::AccountVerification,
            ProviderError::ParseError(_) => Self::MalformedResponse,
            ProviderError::ApiError { status_code: 429, .. } => Self::RateLimited,
            ProviderError::ApiError {
                status_code: 401 | 403,
                ..
            } => Self::AccountVerification,
            _ => Self::Transient,
        }
    }
}

/// Cooldown durations per failure class
#[derive(Debug, Clone, PartialEq)]
pub struct CooldownPolicy {
    /// Fixed cooldown after a rate limit or verification failure
    pub rate_limit: Duration,
    /// Fixed cooldown after an unusable response
    pub malformed: Duration,
    /// First transient cooldown, doubled on each consecutive failure
    pub transient_base: Duration,
    /// Ceiling of the transient backoff
    pub transient_cap: Duration,
    /// Random extra fraction added to transient cooldowns (0.0 disables)
    pub jitter: f64,
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self {
            rate_limit: Duration::from_secs(60),
            malformed: Duration::from_secs(5),
            transient_base: Duration::from_secs(2),
            transient_cap: Duration::from_secs(60),
            jitter: 0.1,
        }
    }
}

impl CooldownPolicy {
    /// Cooldown for a failure, given the credential's consecutive failure count (≥ 1)
    pub fn cooldown(&self, class: FailureClass, consecutive_failures: u32) -> Duration {
        match class {
            FailureClass::RateLimited | FailureClass::AccountVerification => self.rate_limit,
            FailureClass::MalformedResponse => self.malformed,
            FailureClass::Transient => {
                let exponent = consecutive_failures.saturating_sub(1).min(16);
                let backoff = self
                    .transient_base
                    .saturating_mul(1u32 << exponent)
                    .min(self.transient_cap);
                if self.jitter > 0.0 {
                    let extra = rand::rng().random_range(0.0..=self.jitter);
                    backoff.mul_f64(1.0 + extra).min(self.transient_cap)
                } else {
                    backoff
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyStatus {
    Available,
    InUse,
    Cooling(Instant),
}

#[derive(Debug)]
struct KeyState {
    key: String,
    status: KeyStatus,
    consecutive_failures: u32,
}

#[derive(Debug)]
struct PoolState {
    keys: Vec<KeyState>,
    cursor: usize,
}

impl PoolState {
    fn readmit_expired(&mut self, now: Instant) {
        for state in &mut self.keys {
            if let KeyStatus::Cooling(until) = state.status {
                if until <= now {
                    debug!("Credential {} re-admitted", mask_key(&state.key));
                    state.status = KeyStatus::Available;
                }
            }
        }
    }

    fn find_mut(&mut self, key: &str) -> Option<&mut KeyState> {
        self.keys.iter_mut().find(|state| state.key == key)
    }
}

/// Shared credential pool
#[derive(Debug)]
pub struct ApiKeyPool {
    state: Mutex<PoolState>,
    policy: CooldownPolicy,
    poll_interval: Duration,
}

impl ApiKeyPool {
    /// Create a pool; duplicate and blank keys are dropped
    pub fn new(keys: Vec<String>, policy: CooldownPolicy) -> Self {
        let mut states: Vec<KeyState> = Vec::with_capacity(keys.len());
        for key in keys {
            let key = key.trim().to_string();
            if key.is_empty() || states.iter().any(|s| s.key == key) {
                continue;
            }
            states.push(KeyState {
                key,
                status: KeyStatus::Available,
                consecutive_failures: 0,
            });
        }

        Self {
            state: Mutex::new(PoolState {
                keys: states,
                cursor: 0,
            }),
            policy,
            poll_interval: Duration::from_millis(100),
        }
    }

    /// Override how often a blocked acquisition re-checks the pool
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Number of credentials in the pool
    pub fn len(&self) -> usize {
        self.state.lock().keys.len()
    }

    /// Whether the pool has no credentials at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take an available credential without waiting, rotating through the pool
    pub fn try_acquire(&self) -> Option<String> {
        let mut state = self.state.lock();
        state.readmit_expired(Instant::now());

        let count = state.keys.len();
        for offset in 0..count {
            let index = (state.cursor + offset) % count;
            if state.keys[index].status == KeyStatus::Available {
                state.keys[index].status = KeyStatus::InUse;
                state.cursor = (index + 1) % count;
                return Some(state.keys[index].key.clone());
            }
        }
        None
    }

    /// Wait for a credential. Returns `None` once cancelled or if the pool is empty.
    pub async fn acquire(&self, cancel: &CancellationFlag) -> Option<String> {
        loop {
            if cancel.is_cancelled() || self.is_empty() {
                return None;
            }
            if let Some(key) = self.try_acquire() {
                return Some(key);
            }

            let wait = self
                .next_readmission()
                .map(|until| until.saturating_duration_since(Instant::now()))
                .unwrap_or(self.poll_interval)
                .min(self.poll_interval)
                .max(Duration::from_millis(1));
            tokio::time::sleep(wait).await;
        }
    }

    /// Return a credential after a successful request
    pub fn release(&self, key: &str) {
        let mut state = self.state.lock();
        if let Some(entry) = state.find_mut(key) {
            entry.status = KeyStatus::Available;
            entry.consecutive_failures = 0;
        }
    }

    /// Return a credential after a failed request and start its cooldown
    pub fn penalize(&self, key: &str, class: FailureClass) {
        let mut state = self.state.lock();
        let Some(entry) = state.find_mut(key) else {
            return;
        };

        entry.consecutive_failures = entry.consecutive_failures.saturating_add(1);
        let cooldown = self.policy.cooldown(class, entry.consecutive_failures);
        entry.status = KeyStatus::Cooling(Instant::now() + cooldown);

        warn!(
            "Credential {} cooling down for {:?} ({:?}, failure #{})",
            mask_key(&entry.key),
            cooldown,
            class,
            entry.consecutive_failures
        );
    }

    /// Credentials that could be acquired right now
    pub fn available_count(&self) -> usize {
        let now = Instant::now();
        self.state
            .lock()
            .keys
            .iter()
            .filter(|state| match state.status {
                KeyStatus::Available => true,
                KeyStatus::InUse => false,
                KeyStatus::Cooling(until) => until <= now,
            })
            .count()
    }

    /// End of a credential's active cooldown, if it has one
    pub fn cooldown_until(&self, key: &str) -> Option<Instant> {
        let now = Instant::now();
        let state = self.state.lock();
        state
            .keys
            .iter()
            .find(|state| state.key == key)
            .and_then(|state| match state.status {
                KeyStatus::Cooling(until) if until > now => Some(until),
                _ => None,
            })
    }

    fn next_readmission(&self) -> Option<Instant> {
        self.state
            .lock()
            .keys
            .iter()
            .filter_map(|state| match state.status {
                KeyStatus::Cooling(until) => Some(until),
                _ => None,
            })
            .min()
    }
}

/// Shorten a credential for log output
pub fn mask_key(key: &str) -> String {
    let visible: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("…{}", visible)
}
