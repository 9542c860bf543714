//! Failure classification and the resilient call executor
//!
//! Retrying is split in two steps. [`FailureClass::classify`] turns a failure
//! message into a category, and [`RetryPolicy::backoff`] decides from the
//! category and attempt number whether to wait and how long. Adding a
//! category touches only those two functions; [`ResilientExecutor::execute`]
//! stays unchanged.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Category of an oracle failure, derived from its message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureClass {
    /// Rate limit or quota bucket exhausted; refills with time
    Quota,
    /// Server overload or network trouble
    Transient,
    /// Content-safety rejection; an identical payload gets the same verdict
    Safety,
    /// Credential rejected
    Authentication,
    /// Anything else
    Unknown,
}

const SAFETY_MARKERS: &[&str] = &["blocked", "safety"];
const AUTH_MARKERS: &[&str] = &[
    "401",
    "403",
    "api key",
    "api_key",
    "unauthenticated",
    "permission denied",
];
const QUOTA_MARKERS: &[&str] = &[
    "429",
    "quota",
    "rate limit",
    "resource_exhausted",
    "too many requests",
];
const TRANSIENT_MARKERS: &[&str] = &[
    "500",
    "502",
    "503",
    "504",
    "overloaded",
    "unavailable",
    "fetch",
    "network",
    "connection",
    "timed out",
    "timeout",
];

/// Whether `text` mentions `marker` as a word
///
/// The marker must start at a word boundary ("fetch" does not match
/// "prefetch"). Numeric markers must also end at one, so a status code like
/// "500" does not match "1500 pages".
pub(crate) fn mentions(text: &str, marker: &str) -> bool {
    let numeric = marker.bytes().all(|b| b.is_ascii_digit());
    text.match_indices(marker).any(|(start, _)| {
        let end = start + marker.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric)
            && !(numeric && after.is_some_and(char::is_alphanumeric))
    })
}

impl FailureClass {
    /// Classify a failure by inspecting its message
    ///
    /// Credential markers win over safety markers, so a 403 that says a
    /// referer is "blocked" is still an authentication failure.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        let has = |markers: &[&str]| markers.iter().any(|m| mentions(&lower, m));

        if has(AUTH_MARKERS) {
            FailureClass::Authentication
        } else if has(SAFETY_MARKERS) {
            FailureClass::Safety
        } else if has(QUOTA_MARKERS) {
            FailureClass::Quota
        } else if has(TRANSIENT_MARKERS) {
            FailureClass::Transient
        } else {
            FailureClass::Unknown
        }
    }

    /// Get the class name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClass::Quota => "quota",
            FailureClass::Transient => "transient",
            FailureClass::Safety => "safety",
            FailureClass::Authentication => "authentication",
            FailureClass::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backoff schedule per failure class
///
/// All durations are in milliseconds so the policy reads naturally from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Hard cap on attempts for any class
    pub max_attempts: u32,

    /// First quota backoff; doubles each attempt
    pub quota_base_ms: u64,

    /// Quota backoff plateau
    pub quota_ceiling_ms: u64,

    /// Attempt cap for transient failures
    pub max_transient_attempts: u32,

    /// Transient backoff per attempt number (linear)
    pub transient_base_ms: u64,

    /// Unclassified failures are retried while `attempt <= unknown_retries`
    pub unknown_retries: u32,

    /// Fixed delay before retrying an unclassified failure
    pub unknown_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 15,
            quota_base_ms: 10_000,
            quota_ceiling_ms: 60_000,
            max_transient_attempts: 6,
            transient_base_ms: 2_000,
            unknown_retries: 2,
            unknown_delay_ms: 1_000,
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt, or `None` to give up
    ///
    /// `attempt` is the 1-based number of the attempt that just failed.
    pub fn backoff(&self, class: FailureClass, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }

        match class {
            FailureClass::Quota => {
                let shift = attempt.saturating_sub(1).min(20);
                let ms = self
                    .quota_base_ms
                    .saturating_mul(1u64 << shift)
                    .min(self.quota_ceiling_ms);
                Some(Duration::from_millis(ms))
            }
            FailureClass::Transient => {
                if attempt >= self.max_transient_attempts {
                    None
                } else {
                    Some(Duration::from_millis(
                        self.transient_base_ms.saturating_mul(u64::from(attempt)),
                    ))
                }
            }
            FailureClass::Safety | FailureClass::Authentication => None,
            FailureClass::Unknown => {
                if attempt <= self.unknown_retries {
                    Some(Duration::from_millis(self.unknown_delay_ms))
                } else {
                    None
                }
            }
        }
    }

    /// Validate the policy
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("retry.max_attempts must be greater than 0".to_string());
        }
        if self.quota_ceiling_ms < self.quota_base_ms {
            return Err("retry.quota_ceiling_ms cannot be below retry.quota_base_ms".to_string());
        }
        Ok(())
    }
}

/// Suspends the current task; injectable so backoff schedules can be observed
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for the given duration
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Final failure after the retry policy gave up
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (class: {class}, attempts: {attempts})")]
pub struct OracleFailure {
    /// Classification of the last failure
    pub class: FailureClass,
    /// Number of attempts made
    pub attempts: u32,
    /// Message of the last failure
    pub message: String,
}

/// Runs one oracle call with classification-driven retries
#[derive(Clone)]
pub struct ResilientExecutor {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl ResilientExecutor {
    /// Create an executor with an explicit sleeper
    pub fn new(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    /// Create an executor that sleeps on the tokio timer
    pub fn with_tokio(policy: RetryPolicy) -> Self {
        Self::new(policy, Arc::new(TokioSleeper))
    }

    /// The active policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op` until it succeeds or the policy gives up
    ///
    /// # Errors
    ///
    /// Returns the last failure, classified, once no further attempt is
    /// allowed.
    pub async fn execute<T, E, F, Fut>(&self, mut op: F) -> Result<T, OracleFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            debug!("Oracle attempt {}", attempt);

            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!("Oracle call succeeded on attempt {}", attempt);
                    }
                    return Ok(value);
                }
                Err(e) => {
                    let message = e.to_string();
                    let class = FailureClass::classify(&message);

                    match self.policy.backoff(class, attempt) {
                        Some(delay) => {
                            warn!(
                                "Oracle attempt {} failed ({}): {}; retrying in {:?}",
                                attempt, class, message, delay
                            );
                            self.sleeper.sleep(delay).await;
                        }
                        None => {
                            warn!(
                                "Oracle call giving up after {} attempt(s) ({}): {}",
                                attempt, class, message
                            );
                            return Err(OracleFailure {
                                class,
                                attempts: attempt,
                                message,
                            });
                        }
                    }
                }
            }
        }
    }
}
