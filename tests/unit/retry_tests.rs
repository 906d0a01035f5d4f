/*!
 * Tests for the per-unit retry state machine under quota throttling
 */

use std::time::Duration;

use slidelingo::errors::TranslationError;
use slidelingo::translation::retry::{translate_with_retry, FailureReason, QuotaGate, QuotaPolicy, RetryPolicy};

use crate::common::mock_translators::ScriptedTranslator;

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_backoff: Duration::from_millis(100),
        max_backoff: Duration::from_millis(1000),
        jitter: Duration::ZERO,
    }
}

fn quota(threshold: u32) -> QuotaPolicy {
    QuotaPolicy {
        base_pause: Duration::from_secs(1),
        max_pause: Duration::from_secs(4),
        failure_threshold: threshold,
    }
}

#[test]
fn test_quota_policy_pause_shouldGrowExponentially() {
    let policy = quota(5);
    assert_eq!(policy.pause(1), Duration::from_secs(1));
    assert_eq!(policy.pause(2), Duration::from_secs(2));
    assert_eq!(policy.pause(3), Duration::from_secs(4));
    assert_eq!(policy.pause(4), Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn test_translate_with_retry_withTransientThenSuccess_shouldRetry() {
    let translator = ScriptedTranslator::new("fr:").script(
        "Growth",
        vec![Err(TranslationError::Transient("503".into()))],
    );
    let gate = QuotaGate::new(quota(5));

    let outcome = translate_with_retry(&translator, "Growth", "fr", &fast_policy(), &gate).await;

    assert_eq!(outcome.result, Ok("fr:Growth".to_string()));
    assert_eq!(outcome.calls, 2);
    let calls = translator.calls_for("Growth");
    assert!(calls[1].at - calls[0].at >= Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn test_translate_with_retry_withQuotaErrors_shouldNotSpendAttempts() {
    let translator = ScriptedTranslator::new("fr:").script(
        "Growth",
        vec![
            Err(TranslationError::QuotaExceeded("429".into())),
            Err(TranslationError::QuotaExceeded("429".into())),
            Err(TranslationError::Transient("503".into())),
            Err(TranslationError::Transient("503".into())),
        ],
    );
    let gate = QuotaGate::new(quota(5));

    let outcome = translate_with_retry(&translator, "Growth", "fr", &fast_policy(), &gate).await;

    // Two quota errors, two transient failures, then the third real attempt
    assert_eq!(outcome.result, Ok("fr:Growth".to_string()));
    assert_eq!(outcome.calls, 5);
}

#[tokio::test(start_paused = true)]
async fn test_translate_with_retry_withQuotaThreshold_shouldExhaust() {
    let translator = ScriptedTranslator::new("fr:").script(
        "Growth",
        vec![Err(TranslationError::QuotaExceeded("429".into())); 3],
    );
    let gate = QuotaGate::new(quota(3));

    let outcome = translate_with_retry(&translator, "Growth", "fr", &fast_policy(), &gate).await;

    assert_eq!(outcome.result, Err(FailureReason::QuotaExhausted));
    assert_eq!(outcome.calls, 3);
    assert!(gate.is_exhausted());
}

#[tokio::test(start_paused = true)]
async fn test_translate_with_retry_withExhaustedGate_shouldNotCall() {
    let translator = ScriptedTranslator::new("fr:");
    let gate = QuotaGate::new(quota(1));
    assert!(gate.record_quota_error());

    let outcome = translate_with_retry(&translator, "Growth", "fr", &fast_policy(), &gate).await;

    assert_eq!(outcome.result, Err(FailureReason::QuotaExhausted));
    assert_eq!(outcome.calls, 0);
    assert_eq!(translator.call_count(), 0);
}

#[test]
fn test_failure_reason_display_shouldDescribeCause() {
    let reason = FailureReason::RetriesExhausted {
        attempts: 3,
        last_error: TranslationError::Timeout(Duration::from_secs(30)),
    };
    assert_eq!(reason.to_string(), "gave up after 3 attempts: Translation timed out after 30s");
    assert_eq!(FailureReason::QuotaExhausted.to_string(), "quota exhausted");
}
