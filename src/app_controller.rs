use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::document::{apply_units, extract_units, Presentation, UnitAddress};
use crate::file_utils::FileManager;
use crate::translation::cache::{cache_path_for, document_identity};
use crate::translation::{
    build_translator, BatchTranslator, CacheStore, FailureReason, ProgressMode, ProgressReporter, Translator,
};

// @module: Application controller for slide translation

/// How much the run reports while it works
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only, no progress bar
    Quiet,
    /// Progress bar and summary
    #[default]
    Normal,
    /// Per-unit progress lines and an enumeration of failures
    Verbose,
}

impl Verbosity {
    fn progress_mode(self) -> ProgressMode {
        match self {
            Self::Quiet => ProgressMode::Hidden,
            Self::Normal => ProgressMode::Bar,
            Self::Verbose => ProgressMode::Lines,
        }
    }
}

/// Result of translating one document
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    pub total: usize,
    pub cached: usize,
    pub translated: usize,
    pub failed: usize,
    /// Units whose text could not be written back
    pub write_failures: usize,
    pub quota_exhausted: bool,
    /// Translation failures in address order
    pub failures: Vec<(UnitAddress, FailureReason)>,
    /// Written document; absent when nothing was translatable
    pub output_path: Option<PathBuf>,
}

impl RunSummary {
    /// True when any unit kept its original text or could not be written
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.write_failures > 0 || self.quota_exhausted
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Summary: {} cached, {} translated, {} failed",
            self.cached, self.translated, self.failed
        )?;
        if self.write_failures > 0 {
            write!(f, ", {} not written", self.write_failures)?;
        }
        Ok(())
    }
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Translator override, built from config when unset
    translator: Option<Arc<dyn Translator>>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            translator: None,
        })
    }

    /// Use the given translator instead of the configured provider
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate one document; Ctrl-C stops the run and keeps the cache
    pub async fn run(&self, input_file: &Path, output_file: Option<PathBuf>, verbosity: Verbosity) -> Result<RunSummary> {
        self.run_until(input_file, output_file, verbosity, tokio::signal::ctrl_c()).await
    }

    /// Translate one document, stopping early when `interrupt` resolves.
    ///
    /// An interrupted run flushes the cache, writes no output and returns an
    /// error; running again resumes from the cache.
    pub async fn run_until<F>(
        &self,
        input_file: &Path,
        output_file: Option<PathBuf>,
        verbosity: Verbosity,
        interrupt: F,
    ) -> Result<RunSummary>
    where
        F: Future,
    {
        let start_time = Instant::now();
        let target_language = self.config.target_language.as_str();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let mut presentation = Presentation::open(input_file)
            .with_context(|| format!("Failed to read document {:?}", input_file))?;
        let mut units = extract_units(&presentation)
            .with_context(|| format!("Failed to extract text from {:?}", input_file))?;

        if units.is_empty() {
            warn!("No translatable text found in {:?}, nothing to do", input_file);
            return Ok(RunSummary::default());
        }

        let output_path =
            output_file.unwrap_or_else(|| FileManager::generate_output_path(input_file, target_language));
        if FileManager::same_file(&output_path, input_file) {
            return Err(anyhow!("Output path must differ from the input document: {:?}", output_path));
        }

        info!(
            "Extracted {} text units from {} slides of {:?}",
            units.len(),
            presentation.slides.len(),
            input_file
        );

        let cache_path = self
            .config
            .cache
            .enabled
            .then(|| cache_path_for(input_file, target_language, self.config.cache.cache_dir.as_deref()));
        let cache = match &cache_path {
            Some(path) => CacheStore::load(path),
            None => CacheStore::new(false),
        };

        let translator = match &self.translator {
            Some(translator) => Arc::clone(translator),
            None => build_translator(&self.config.translation)?,
        };
        let batch = BatchTranslator::new(translator, cache.clone(), self.config.batch.to_options());

        info!(
            "🚀 slidelingo: {} - {} -> {}",
            self.config.translation.provider.display_name(),
            self.config.translation.model,
            target_language
        );

        let identity = document_identity(input_file);
        let mut reporter = ProgressReporter::new(units.len(), verbosity.progress_mode());

        let outcome = tokio::select! {
            report = batch.translate_units(
                &mut units,
                target_language,
                &identity,
                cache_path.as_deref(),
                |event| reporter.on_event(event),
            ) => Some(report),
            _ = interrupt => None,
        };
        reporter.finish();

        let Some(report) = outcome else {
            if let Some(path) = &cache_path {
                cache
                    .flush(path)
                    .with_context(|| format!("Failed to save translation cache {:?}", path))?;
                info!("Saved {} cached translations to {:?}", cache.len(), path);
            }
            return Err(anyhow!(
                "Interrupted after {} of {} units; run again to resume from the cache",
                reporter.tracker().completed(),
                units.len()
            ));
        };

        let write_summary = apply_units(&mut presentation, &units);
        presentation
            .save(&output_path)
            .with_context(|| format!("Failed to write document {:?}", output_path))?;
        info!("Success: {:?}", output_path);

        let summary = RunSummary {
            total: report.total,
            cached: report.cached,
            translated: report.translated,
            failed: report.failed,
            write_failures: write_summary.failures.len(),
            quota_exhausted: report.quota_exhausted,
            failures: report.failures,
            output_path: Some(output_path),
        };

        // Quiet runs hide info logs but still print the final result
        if verbosity == Verbosity::Quiet {
            println!("{}", summary);
        } else {
            info!("{}", summary);
        }
        if summary.quota_exhausted {
            error!("Translation quota exhausted; untranslated units kept their original text");
        }
        if summary.write_failures > 0 {
            error!("{} units could not be written back to the document", summary.write_failures);
        }
        if verbosity == Verbosity::Verbose {
            for (address, reason) in &summary.failures {
                warn!("Failed: {} ({})", address, reason);
            }
            for (address, e) in &write_summary.failures {
                warn!("Not written: {} ({})", address, e);
            }
        }

        let (hits, misses, hit_rate) = cache.stats();
        debug!(
            "Cache: {} hits, {} misses ({:.0}% hit rate), processed in {:?}",
            hits,
            misses,
            hit_rate * 100.0,
            start_time.elapsed()
        );

        Ok(summary)
    }
}
