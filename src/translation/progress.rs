/*!
 * Progress and ETA tracking for a batch.
 *
 * `ProgressTracker` is a pure accumulator over completion events.
 * `ProgressReporter` renders it with an `indicatif` bar, per-unit log lines,
 * or not at all.
 */

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{error, info};

use crate::document::UnitStatus;
use crate::translation::batch::CompletionEvent;

/// Point-in-time view of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
    pub percentage: f64,
    /// Terminal units per second since the start
    pub rate: f64,
    /// Absent until the first unit completes
    pub eta: Option<Duration>,
}

/// Accumulates completion events
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: usize,
    completed: usize,
    cached: usize,
    translated: usize,
    failed: usize,
    start: Instant,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self::with_start(total, Instant::now())
    }

    pub fn with_start(total: usize, start: Instant) -> Self {
        Self {
            total,
            completed: 0,
            cached: 0,
            translated: 0,
            failed: 0,
            start,
        }
    }

    /// Record a terminal unit now
    pub fn record(&mut self, status: UnitStatus) -> ProgressSnapshot {
        self.record_at(status, Instant::now())
    }

    /// Record a terminal unit at `now`; completions past `total` are ignored
    pub fn record_at(&mut self, status: UnitStatus, now: Instant) -> ProgressSnapshot {
        if self.completed < self.total && status.is_terminal() {
            self.completed += 1;
            match status {
                UnitStatus::Cached => self.cached += 1,
                UnitStatus::Translated => self.translated += 1,
                UnitStatus::Failed => self.failed += 1,
                UnitStatus::Pending => {}
            }
        }
        self.snapshot_at(now)
    }

    pub fn snapshot_at(&self, now: Instant) -> ProgressSnapshot {
        let elapsed = now.saturating_duration_since(self.start).as_secs_f64();

        let percentage = if self.total == 0 {
            100.0
        } else {
            100.0 * self.completed as f64 / self.total as f64
        };

        let rate = if elapsed > 0.0 { self.completed as f64 / elapsed } else { 0.0 };

        let remaining = self.total - self.completed;
        let eta = if self.completed == 0 {
            None
        } else if remaining == 0 {
            Some(Duration::ZERO)
        } else if rate > 0.0 {
            Some(Duration::from_secs_f64(remaining as f64 / rate))
        } else {
            None
        };

        ProgressSnapshot {
            completed: self.completed,
            total: self.total,
            percentage,
            rate,
            eta,
        }
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Counts as (cached, translated, failed)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.cached, self.translated, self.failed)
    }
}

/// How progress is shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// Nothing (quiet runs)
    Hidden,
    /// An interactive bar
    Bar,
    /// One log line per unit (verbose runs)
    Lines,
}

/// Renders a tracker as units complete
pub struct ProgressReporter {
    tracker: ProgressTracker,
    bar: ProgressBar,
    mode: ProgressMode,
}

impl ProgressReporter {
    pub fn new(total: usize, mode: ProgressMode) -> Self {
        let bar = match mode {
            ProgressMode::Bar => ProgressBar::new(total as u64),
            ProgressMode::Hidden | ProgressMode::Lines => ProgressBar::with_draw_target(
                Some(total as u64),
                ProgressDrawTarget::hidden(),
            ),
        };
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} units ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));

        Self {
            tracker: ProgressTracker::new(total),
            bar,
            mode,
        }
    }

    pub fn on_event(&mut self, event: &CompletionEvent) {
        let snapshot = self.tracker.record(event.status);
        self.bar.set_position(snapshot.completed as u64);
        self.bar.set_message(format_rate(&snapshot));

        if self.mode == ProgressMode::Lines {
            let line = format!(
                "[{}/{}] {} {} ({:.1}%)",
                snapshot.completed, snapshot.total, event.address, event.status, snapshot.percentage
            );
            if event.status == UnitStatus::Failed {
                error!("{}", line);
            } else {
                info!("{}", line);
            }
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }
}

fn format_rate(snapshot: &ProgressSnapshot) -> String {
    match snapshot.eta {
        Some(eta) => format!("{:.1} units/s, ETA {}s", snapshot.rate, eta.as_secs()),
        None => format!("{:.1} units/s", snapshot.rate),
    }
}
