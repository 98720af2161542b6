/*!
 * # modlocai - Mod Localization with AI
 *
 * A Rust library for translating the strings of game mod plugins using AI.
 *
 * ## Features
 *
 * - Discover plugins (`.esp`, `.esm`, `.esl`) in a mods directory or from a
 *   mod manager profile's load order
 * - Extract strings through an external extractor into CSV tables
 * - Translate strings using various AI providers:
 *   - OpenAI API (and LM Studio's compatible server)
 *   - Anthropic API
 *   - Ollama (local LLM)
 * - Token-budget batching with record-type specific prompts
 * - Retries that resend only the strings a model left out
 * - Incremental runs based on plugin modification times
 * - Dynamic String Distributor (DSD) JSON output
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: Run modes and the multi-plugin driver
 * - `plugin`: String tables, extraction and DSD conversion
 * - `translation`: Batch translation:
 *   - `translation::tokenizer`: Token counting
 *   - `translation::batch`: Token-budget batching
 *   - `translation::cache`: Per-plugin translation cache
 *   - `translation::retry`: Retry with id reconciliation
 *   - `translation::prompts`: Record-type prompts
 *   - `translation::orchestrator`: Translation of one plugin
 * - `load_order`: Load-order plugin resolution
 * - `snapshot`: Plugin modification-time snapshot
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for various LLM providers
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
pub mod file_utils;
pub mod language_utils;
pub mod load_order;
pub mod plugin;
pub mod providers;
pub mod snapshot;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, PluginOutcome, PluginPipeline, RunSummary};
pub use errors::{AppError, PluginError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, normalize_to_part2t};
pub use plugin::{RecordStatus, StringRecord};
pub use translation::TranslationService;
