/*!
 * Batch translation of plugin strings using AI providers.
 *
 * It is split into several submodules:
 *
 * - `core`: Item type, the remote translator seam and the provider-backed service
 * - `tokenizer`: Token counting for batch sizing
 * - `batch`: Token-budget batching
 * - `cache`: Per-plugin translation cache
 * - `retry`: Retry with id reconciliation
 * - `prompts`: Record-type prompt selection
 * - `orchestrator`: Translation of one plugin's string table
 */

// Re-export main types for easier usage
pub use self::batch::{batch_by_token_budget, TokenBudgetBatcher};
pub use self::cache::TranslationCache;
pub use self::core::{RemoteTranslator, TranslationItem, TranslationService};
pub use self::orchestrator::{PluginTranslator, TranslationReport};
pub use self::prompts::{PromptResolver, PromptTemplate};
pub use self::retry::{failure_marker, BatchOutcome, RetryPolicy, RetryReconciler};
pub use self::tokenizer::{TikTokenCounter, TokenCounter, WhitespaceTokenCounter};

// Submodules
pub mod batch;
pub mod cache;
pub mod core;
pub mod orchestrator;
pub mod prompts;
pub mod retry;
pub mod tokenizer;
