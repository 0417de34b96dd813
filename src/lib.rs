/*!
 * # scripttm - translation memory for game script text
 *
 * A Rust library that keeps every Japanese script line of a game together
 * with its known English translations, fills the gaps with a local machine
 * translator and re-exports per-script translation files.
 *
 * ## Features
 *
 * - Persistent translation memory with manual, official and machine fields
 * - Fixed resolution policy: manual > official > machine
 * - Ingestion of script caches, loose scripts, legacy caches and UI term tables
 * - Tag-preserving machine translation through Sugoi or any
 *   OpenAI-compatible chat completion server
 * - Export as per-script text files, BSON or zstd-compressed MessagePack
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `memory`: Line records and the translation memory store
 * - `sources`: Script sources of a run (script cache, loose files, memory)
 * - `ingest`: Startup ingestion of side sources
 * - `translation`: Resolve-or-translate service and post-processing
 * - `providers`: Translation backend clients
 * - `export`: Grouping, routing and serialization of exports
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
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
pub mod errors;
pub mod export;
pub mod file_utils;
pub mod ingest;
pub mod memory;
pub mod providers;
pub mod sources;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{ExportError, ProviderError, StoreError};
pub use memory::{LineRecord, TranslationKind, TranslationMemory};
pub use translation::TranslationService;
