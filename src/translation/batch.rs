/*!
 * Batch translation processing.
 *
 * Runs every pending unit of a document through the cache and the
 * translator. Cache hits resolve first without a network call; the rest are
 * dispatched in submission order under a concurrency ceiling. The loop that
 * consumes completions is the only writer of unit state and of the cache.
 */

use std::path::Path;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};

use crate::document::{ContentUnit, UnitAddress, UnitStatus};

use super::cache::{fingerprint, CacheStore};
use super::client::Translator;
use super::retry::{translate_with_retry, FailureReason, QuotaGate, QuotaPolicy, RetryPolicy};

/// Tuning for a batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    /// Maximum number of concurrent requests
    pub max_concurrent_requests: usize,
    pub retry: RetryPolicy,
    pub quota: QuotaPolicy,
    /// Persist the cache after this many new translations
    pub flush_every: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 4,
            retry: RetryPolicy::default(),
            quota: QuotaPolicy::default(),
            flush_every: 10,
        }
    }
}

/// Emitted once for every unit that reaches a terminal status
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionEvent {
    /// Position of the unit in the slice handed to the batch
    pub index: usize,
    pub address: UnitAddress,
    pub status: UnitStatus,
    /// Translator calls spent on the unit
    pub calls: u32,
}

/// Outcome of a batch
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchReport {
    pub total: usize,
    pub cached: usize,
    pub translated: usize,
    pub failed: usize,
    /// The quota threshold was reached and remaining units were failed
    pub quota_exhausted: bool,
    /// Failed units in address order
    pub failures: Vec<(UnitAddress, FailureReason)>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.quota_exhausted
    }
}

/// Batch translator for the content units of one document
pub struct BatchTranslator {
    /// The translator to call for cache misses
    translator: Arc<dyn Translator>,

    cache: CacheStore,

    options: BatchOptions,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(translator: Arc<dyn Translator>, cache: CacheStore, options: BatchOptions) -> Self {
        Self {
            translator,
            cache,
            options,
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Translate every pending unit in place.
    ///
    /// When `cache_path` is set the cache is flushed there every
    /// `flush_every` new translations and once at the end; a failed flush is
    /// logged and does not stop the batch.
    pub async fn translate_units(
        &self,
        units: &mut [ContentUnit],
        target_language: &str,
        document_identity: &str,
        cache_path: Option<&Path>,
        mut on_event: impl FnMut(&CompletionEvent),
    ) -> BatchReport {
        let mut report = BatchReport {
            total: units.len(),
            ..Default::default()
        };

        let keys: Vec<String> = units
            .iter()
            .map(|unit| fingerprint(&unit.source_text, target_language, document_identity))
            .collect();

        let mut pending = Vec::new();
        for (index, unit) in units.iter_mut().enumerate() {
            if unit.status != UnitStatus::Pending {
                continue;
            }
            match self.cache.get(&keys[index]) {
                Some(translation) => {
                    unit.translated_text = Some(translation);
                    unit.status = UnitStatus::Cached;
                    report.cached += 1;
                    on_event(&CompletionEvent {
                        index,
                        address: unit.address,
                        status: unit.status,
                        calls: 0,
                    });
                }
                None => pending.push((index, unit.source_text.clone())),
            }
        }

        if pending.is_empty() {
            debug!("All {} units resolved from cache", report.cached);
            return report;
        }

        info!(
            "{} units cached, {} to translate with up to {} concurrent requests",
            report.cached,
            pending.len(),
            self.options.max_concurrent_requests
        );

        let gate = QuotaGate::new(self.options.quota.clone());
        let translator: &dyn Translator = self.translator.as_ref();
        let retry = &self.options.retry;
        let gate_ref = &gate;

        let mut completions = stream::iter(pending)
            .map(move |(index, text)| async move {
                let outcome = translate_with_retry(translator, &text, target_language, retry, gate_ref).await;
                (index, outcome)
            })
            .buffer_unordered(self.options.max_concurrent_requests.max(1));

        let mut since_flush = 0;
        while let Some((index, outcome)) = completions.next().await {
            let unit = &mut units[index];

            match outcome.result {
                Ok(translation) => {
                    self.cache.put(keys[index].clone(), translation.clone());
                    unit.translated_text = Some(translation);
                    unit.status = UnitStatus::Translated;
                    report.translated += 1;
                    since_flush += 1;
                }
                Err(reason) => {
                    error!("Keeping original text for {}: {}", unit.address, reason);
                    unit.translated_text = None;
                    unit.status = UnitStatus::Failed;
                    report.failed += 1;
                    report.failures.push((unit.address, reason));
                }
            }

            on_event(&CompletionEvent {
                index,
                address: unit.address,
                status: unit.status,
                calls: outcome.calls,
            });

            if since_flush >= self.options.flush_every.max(1) {
                self.flush_to(cache_path);
                since_flush = 0;
            }
        }

        report.quota_exhausted = gate.is_exhausted();
        report.failures.sort_by_key(|(address, _)| *address);
        self.flush_to(cache_path);

        report
    }

    fn flush_to(&self, cache_path: Option<&Path>) {
        if let Some(path) = cache_path {
            if let Err(e) = self.cache.flush(path) {
                warn!("Failed to save translation cache: {:#}", e);
            }
        }
    }
}
