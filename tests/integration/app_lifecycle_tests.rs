/*!
 * Full document lifecycle through the controller
 */

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use slidelingo::document::{extract_units, Paragraph, Run, Shape, Slide};
use slidelingo::errors::TranslationError;
use slidelingo::translation::cache::{cache_path_for, document_identity, fingerprint};
use slidelingo::{CacheStore, Controller, Presentation, RunSummary, Verbosity};

use crate::common::mock_translators::{QuotaAfter, ScriptedTranslator};
use crate::common::{self, SAMPLE_TEXTS};

/// Texts of the translated document in extraction order
fn output_texts(path: &Path) -> Vec<String> {
    let deck = Presentation::open(path).unwrap();
    extract_units(&deck).unwrap().into_iter().map(|u| u.source_text).collect()
}

#[tokio::test(start_paused = true)]
async fn test_run_withPartialCache_shouldTranslateOnlyMisses() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::write_deck(dir.path(), "review.json", &common::sample_deck()).unwrap();

    let cache_path = cache_path_for(&input, "fr", None);
    let identity = document_identity(&input);
    let seeded = CacheStore::new(true);
    for text in &SAMPLE_TEXTS[..7] {
        seeded.put(fingerprint(text, "fr", &identity), format!("cached:{}", text));
    }
    seeded.flush(&cache_path).unwrap();

    let translator = Arc::new(ScriptedTranslator::new("fr:").script(
        SAMPLE_TEXTS[7],
        vec![Err(TranslationError::Timeout(Duration::from_secs(30)))],
    ));
    let controller = Controller::with_config(common::mock_config())
        .unwrap()
        .with_translator(translator.clone());

    let summary = controller
        .run_until(&input, None, Verbosity::Quiet, std::future::pending::<()>())
        .await
        .unwrap();

    assert_eq!((summary.cached, summary.translated, summary.failed), (7, 3, 0));
    assert!(!summary.has_failures());
    assert_eq!(translator.call_count(), 4);

    let output = summary.output_path.unwrap();
    assert_eq!(output, dir.path().join("review_translated_fr.json"));
    let texts = output_texts(&output);
    assert_eq!(texts[0], format!("cached:{}", SAMPLE_TEXTS[0]));
    assert_eq!(texts[7], format!("fr:{}", SAMPLE_TEXTS[7]));

    assert_eq!(CacheStore::load(&cache_path).len(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_run_withQuotaExhaustion_shouldKeepSourceTextForRemainingUnits() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::write_deck(dir.path(), "review.json", &common::sample_deck()).unwrap();

    let mut config = common::mock_config();
    config.batch.concurrent_requests = 1;
    config.batch.quota_failure_threshold = 3;
    let translator = Arc::new(QuotaAfter::new(5));
    let controller = Controller::with_config(config).unwrap().with_translator(translator.clone());

    let summary = controller
        .run_until(&input, None, Verbosity::Quiet, std::future::pending::<()>())
        .await
        .unwrap();

    assert!(summary.quota_exhausted);
    assert!(summary.has_failures());
    assert_eq!((summary.translated, summary.failed), (5, 5));
    assert_eq!(translator.call_count(), 8);

    let texts = output_texts(summary.output_path.as_ref().unwrap());
    for (index, text) in SAMPLE_TEXTS.iter().enumerate() {
        if index < 5 {
            assert_eq!(texts[index], format!("fr:{}", text));
        } else {
            assert_eq!(texts[index], *text);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_run_twice_shouldReuseCacheAndProduceIdenticalOutput() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::write_deck(dir.path(), "review.json", &common::sample_deck()).unwrap();

    let first = Arc::new(ScriptedTranslator::new("fr:"));
    let summary = Controller::with_config(common::mock_config())
        .unwrap()
        .with_translator(first.clone())
        .run_until(&input, None, Verbosity::Quiet, std::future::pending::<()>())
        .await
        .unwrap();
    let output = summary.output_path.unwrap();
    let first_output = std::fs::read_to_string(&output).unwrap();
    assert_eq!(first.call_count(), SAMPLE_TEXTS.len());

    let second = Arc::new(ScriptedTranslator::new("other:"));
    let summary = Controller::with_config(common::mock_config())
        .unwrap()
        .with_translator(second.clone())
        .run_until(&input, None, Verbosity::Quiet, std::future::pending::<()>())
        .await
        .unwrap();

    assert_eq!(second.call_count(), 0);
    assert_eq!(summary.cached, SAMPLE_TEXTS.len());
    assert_eq!(std::fs::read_to_string(&output).unwrap(), first_output);
}

#[tokio::test(start_paused = true)]
async fn test_run_withInterrupt_shouldResumeFromCache() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::write_deck(dir.path(), "review.json", &common::sample_deck()).unwrap();

    let mut config = common::mock_config();
    config.batch.concurrent_requests = 1;
    config.batch.flush_every = 1;

    let first = Arc::new(ScriptedTranslator::new("v1:").with_delay(Duration::from_secs(1)));
    let result = Controller::with_config(config.clone())
        .unwrap()
        .with_translator(first.clone())
        .run_until(
            &input,
            None,
            Verbosity::Quiet,
            tokio::time::sleep(Duration::from_millis(3500)),
        )
        .await;

    assert!(result.is_err());
    let output = dir.path().join("review_translated_fr.json");
    assert!(!output.exists());
    let cache_path = cache_path_for(&input, "fr", None);
    assert_eq!(CacheStore::load(&cache_path).len(), 3);

    let second = Arc::new(ScriptedTranslator::new("v2:"));
    let summary = Controller::with_config(config)
        .unwrap()
        .with_translator(second.clone())
        .run_until(&input, None, Verbosity::Quiet, std::future::pending::<()>())
        .await
        .unwrap();

    assert_eq!(second.call_count(), 7);
    assert_eq!((summary.cached, summary.translated), (3, 7));

    let texts = output_texts(&output);
    for (index, text) in SAMPLE_TEXTS.iter().enumerate() {
        let prefix = if index < 3 { "v1:" } else { "v2:" };
        assert_eq!(texts[index], format!("{}{}", prefix, text));
    }
}

#[tokio::test]
async fn test_run_withNoTranslatableText_shouldWriteNothing() {
    let dir = common::create_temp_dir().unwrap();
    let deck = Presentation {
        slides: vec![Slide {
            shapes: vec![
                Shape::default(),
                Shape::with_paragraphs(vec![Paragraph::from_runs(vec![Run::new("  ")])]),
            ],
            ..Default::default()
        }],
        ..Default::default()
    };
    let input = common::write_deck(dir.path(), "blank.json", &deck).unwrap();

    let translator = Arc::new(ScriptedTranslator::new("fr:"));
    let summary = Controller::with_config(common::mock_config())
        .unwrap()
        .with_translator(translator.clone())
        .run_until(&input, None, Verbosity::Quiet, std::future::pending::<()>())
        .await
        .unwrap();

    assert_eq!(summary.total, 0);
    assert!(summary.output_path.is_none());
    assert!(!summary.has_failures());
    assert_eq!(translator.call_count(), 0);
    assert!(!dir.path().join("blank_translated_fr.json").exists());
}

#[tokio::test]
async fn test_run_withOutputEqualToInput_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::write_deck(dir.path(), "review.json", &common::sample_deck()).unwrap();
    let original = std::fs::read_to_string(&input).unwrap();

    let result = Controller::with_config(common::mock_config())
        .unwrap()
        .run_until(&input, Some(input.clone()), Verbosity::Quiet, std::future::pending::<()>())
        .await;

    assert!(result.is_err());
    assert_eq!(std::fs::read_to_string(&input).unwrap(), original);
}

#[tokio::test]
async fn test_run_withOutputSpelledDifferentlyThanInput_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::write_deck(dir.path(), "review.json", &common::sample_deck()).unwrap();
    let original = std::fs::read_to_string(&input).unwrap();
    let output = dir.path().join(".").join("review.json");

    let result = Controller::with_config(common::mock_config())
        .unwrap()
        .run_until(&input, Some(output), Verbosity::Quiet, std::future::pending::<()>())
        .await;

    assert!(result.is_err());
    assert_eq!(std::fs::read_to_string(&input).unwrap(), original);
}

#[tokio::test]
async fn test_run_withMissingInput_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let controller = Controller::with_config(common::mock_config()).unwrap();

    let result = controller
        .run_until(
            &dir.path().join("missing.json"),
            None,
            Verbosity::Quiet,
            std::future::pending::<()>(),
        )
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_run_withMockProvider_shouldWritePseudoTranslation() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::write_deck(dir.path(), "review.json", &common::sample_deck()).unwrap();
    let mut config = common::mock_config();
    config.cache.enabled = false;

    let summary = Controller::with_config(config)
        .unwrap()
        .run_until(&input, None, Verbosity::Quiet, std::future::pending::<()>())
        .await
        .unwrap();

    assert_eq!(summary.translated, SAMPLE_TEXTS.len());
    assert_eq!(
        summary.to_string(),
        format!("Summary: 0 cached, {} translated, 0 failed", SAMPLE_TEXTS.len())
    );
    let texts = output_texts(summary.output_path.as_ref().unwrap());
    assert_eq!(texts[4], "[fr] Region");
    assert!(!cache_path_for(&input, "fr", None).exists());
}

#[test]
fn test_run_summary_display_withWriteFailures_shouldReportThem() {
    let summary = RunSummary {
        total: 5,
        cached: 2,
        translated: 2,
        failed: 1,
        write_failures: 1,
        ..RunSummary::default()
    };
    assert_eq!(summary.to_string(), "Summary: 2 cached, 2 translated, 1 failed, 1 not written");
}
