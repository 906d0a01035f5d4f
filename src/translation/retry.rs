/*!
 * Retry and quota policy for single translation units.
 *
 * Each unit runs through an explicit state machine:
 * `Pending -> Attempt(n) -> { Done | Attempt(n + 1) }`.
 * Timeouts and transient errors spend the per-unit attempt budget with
 * exponential backoff. Quota errors pause every unit through the shared
 * `QuotaGate` and do not spend the budget; once the gate is exhausted every
 * unit still waiting fails with `FailureReason::QuotaExhausted`.
 */

use std::fmt;
use std::time::Duration;

use log::{debug, warn};
use parking_lot::Mutex;
use rand::Rng;
use tokio::time::Instant;

use crate::errors::{FailureKind, TranslationError};
use crate::translation::client::Translator;

/// Backoff policy for timeouts and transient errors
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per unit, including the first
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    /// Upper bound of the random delay added to each backoff
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_millis(30_000),
            jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (1-based), without jitter
    pub fn base_delay(&self, attempt: u32) -> Duration {
        exponential(self.base_backoff, self.max_backoff, attempt)
    }

    /// Delay before the attempt following `attempt`, jitter included
    pub fn backoff(&self, attempt: u32) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
        };
        self.base_delay(attempt) + jitter
    }
}

/// Global throttling policy for quota errors
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaPolicy {
    pub base_pause: Duration,
    pub max_pause: Duration,
    /// Consecutive quota errors that exhaust the batch
    pub failure_threshold: u32,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            base_pause: Duration::from_millis(10_000),
            max_pause: Duration::from_millis(120_000),
            failure_threshold: 5,
        }
    }
}

impl QuotaPolicy {
    /// Pause after the `consecutive`-th quota error in a row
    pub fn pause(&self, consecutive: u32) -> Duration {
        exponential(self.base_pause, self.max_pause, consecutive)
    }
}

fn exponential(base: Duration, cap: Duration, step: u32) -> Duration {
    let exponent = step.saturating_sub(1).min(20);
    base.saturating_mul(1u32 << exponent).min(cap)
}

#[derive(Debug, Default)]
struct QuotaState {
    consecutive: u32,
    paused_until: Option<Instant>,
    exhausted: bool,
}

/// Pause shared by every unit of a batch
#[derive(Debug, Default)]
pub struct QuotaGate {
    policy: QuotaPolicy,
    state: Mutex<QuotaState>,
}

impl QuotaGate {
    pub fn new(policy: QuotaPolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(QuotaState::default()),
        }
    }

    /// Wait out any active pause; false once the quota is exhausted
    pub async fn wait_ready(&self) -> bool {
        loop {
            let until = {
                let state = self.state.lock();
                if state.exhausted {
                    return false;
                }
                state.paused_until
            };

            match until {
                Some(until) if until > Instant::now() => tokio::time::sleep_until(until).await,
                _ => return true,
            }
        }
    }

    /// Record a quota error; returns true when the batch is now exhausted
    pub fn record_quota_error(&self) -> bool {
        let mut state = self.state.lock();
        if state.exhausted {
            return true;
        }

        state.consecutive += 1;
        if state.consecutive >= self.policy.failure_threshold {
            state.exhausted = true;
            warn!(
                "Quota exhausted after {} consecutive quota errors; remaining units keep their original text",
                state.consecutive
            );
            return true;
        }

        let pause = self.policy.pause(state.consecutive);
        let until = Instant::now() + pause;
        state.paused_until = Some(state.paused_until.map_or(until, |current| current.max(until)));
        warn!(
            "Quota exceeded ({} of {}), pausing all requests for {:?}",
            state.consecutive, self.policy.failure_threshold, pause
        );
        false
    }

    /// A successful call ends the run of consecutive quota errors
    pub fn record_success(&self) {
        self.state.lock().consecutive = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.state.lock().exhausted
    }
}

/// Why a unit ended `Failed`
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// Timeouts or transient errors used up every attempt
    RetriesExhausted { attempts: u32, last_error: TranslationError },
    /// The service rejected the text in a way retrying cannot fix
    Permanent(String),
    /// The batch hit its quota threshold before this unit finished
    QuotaExhausted,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetriesExhausted { attempts, last_error } => {
                write!(f, "gave up after {} attempts: {}", attempts, last_error)
            }
            Self::Permanent(message) => write!(f, "permanent error: {}", message),
            Self::QuotaExhausted => write!(f, "quota exhausted"),
        }
    }
}

/// Terminal result of one unit
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOutcome {
    pub result: Result<String, FailureReason>,
    /// Calls made to the translator, quota retries included
    pub calls: u32,
}

/// Per-unit retry state
#[derive(Debug)]
enum AttemptState {
    Pending,
    Attempt(u32),
    Done(UnitOutcome),
}

/// What to do after a failed attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorAction {
    /// Sleep, then make the next attempt
    Retry { after: Duration },
    /// Repeat the same attempt once the quota gate opens
    AwaitQuota,
    Fail(FailureReason),
}

/// Decide the transition out of a failed attempt `attempt` (1-based)
pub fn on_error(attempt: u32, error: &TranslationError, policy: &RetryPolicy) -> ErrorAction {
    match error.kind() {
        FailureKind::QuotaExceeded => ErrorAction::AwaitQuota,
        FailureKind::Timeout | FailureKind::Transient => {
            if attempt >= policy.max_attempts {
                ErrorAction::Fail(FailureReason::RetriesExhausted {
                    attempts: attempt,
                    last_error: error.clone(),
                })
            } else {
                ErrorAction::Retry {
                    after: policy.backoff(attempt),
                }
            }
        }
        FailureKind::Permanent => ErrorAction::Fail(FailureReason::Permanent(error.to_string())),
    }
}

/// Drive one unit from `Pending` to `Done`
pub async fn translate_with_retry(
    translator: &dyn Translator,
    text: &str,
    target_language: &str,
    policy: &RetryPolicy,
    gate: &QuotaGate,
) -> UnitOutcome {
    let mut calls = 0;
    let mut state = AttemptState::Pending;

    loop {
        state = match state {
            AttemptState::Pending => AttemptState::Attempt(1),

            AttemptState::Attempt(attempt) => {
                if !gate.wait_ready().await {
                    AttemptState::Done(UnitOutcome {
                        result: Err(FailureReason::QuotaExhausted),
                        calls,
                    })
                } else {
                    calls += 1;
                    match translator.translate(text, target_language).await {
                        Ok(translated) => {
                            gate.record_success();
                            AttemptState::Done(UnitOutcome {
                                result: Ok(translated),
                                calls,
                            })
                        }
                        Err(error) => match on_error(attempt, &error, policy) {
                            ErrorAction::Retry { after } => {
                                warn!(
                                    "Attempt {}/{} failed ({}), retrying in {:?}",
                                    attempt, policy.max_attempts, error, after
                                );
                                tokio::time::sleep(after).await;
                                AttemptState::Attempt(attempt + 1)
                            }
                            ErrorAction::AwaitQuota => {
                                if gate.record_quota_error() {
                                    AttemptState::Done(UnitOutcome {
                                        result: Err(FailureReason::QuotaExhausted),
                                        calls,
                                    })
                                } else {
                                    AttemptState::Attempt(attempt)
                                }
                            }
                            ErrorAction::Fail(reason) => {
                                debug!("Attempt {} failed terminally: {}", attempt, reason);
                                AttemptState::Done(UnitOutcome {
                                    result: Err(reason),
                                    calls,
                                })
                            }
                        },
                    }
                }
            }

            AttemptState::Done(outcome) => return outcome,
        };
    }
}
