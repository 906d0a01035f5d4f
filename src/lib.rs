/*!
 * # slidelingo - slide deck translation with AI
 *
 * A Rust library for translating the text of slide documents while keeping
 * their structure and run formatting.
 *
 * ## Features
 *
 * - Extract paragraph and table cell text as addressable units
 * - Translate through Google Gemini, or an offline mock provider
 * - Resumable, content-addressed translation cache
 * - Concurrent batch translation with timeout, retry and quota throttling
 * - Progress with rate and ETA
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: Slide tree model, unit extraction and write-back
 * - `translation`: Translation orchestration:
 *   - `translation::cache`: Persistent translation cache
 *   - `translation::client`: Single-call translation adapter
 *   - `translation::retry`: Retry state machine and quota gate
 *   - `translation::batch`: Concurrent batch engine
 *   - `translation::progress`: Progress and ETA tracking
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Translation service clients:
 *   - `providers::gemini`: Gemini API client
 *   - `providers::mock`: Offline mock provider
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunSummary, Verbosity};
pub use document::{ContentUnit, Presentation, UnitAddress, UnitStatus};
pub use errors::{DocumentError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, normalize_to_part2t};
pub use translation::{BatchTranslator, CacheStore, Translator};
