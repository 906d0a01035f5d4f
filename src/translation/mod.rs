/*!
 * Translation orchestration for slide documents.
 *
 * - `cache`: persistent, content-addressed translation cache
 * - `client`: single-call translator over a provider, owns the timeout
 * - `retry`: per-unit retry state machine and global quota throttling
 * - `batch`: concurrent batch engine over a document's content units
 * - `progress`: progress, rate and ETA tracking
 */

// Re-export main types for easier usage
pub use self::batch::{BatchOptions, BatchReport, BatchTranslator, CompletionEvent};
pub use self::cache::CacheStore;
pub use self::client::{build_translator, TranslationClient, Translator};
pub use self::progress::{ProgressMode, ProgressReporter, ProgressSnapshot, ProgressTracker};
pub use self::retry::{FailureReason, QuotaPolicy, RetryPolicy};

// Submodules
pub mod batch;
pub mod cache;
pub mod client;
pub mod progress;
pub mod retry;
