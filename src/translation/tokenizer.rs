/*!
 * Token counting used to size translation batches.
 *
 * `TikTokenCounter` picks the BPE that matches the configured model and falls
 * back to `cl100k_base` for models tiktoken does not know about.
 * `WhitespaceTokenCounter` is a cheap approximation for tests and for the
 * rare case where no BPE can be loaded at all.
 */

use log::{debug, error};
use tiktoken_rs::CoreBPE;

/// Counts tokens in a text for batch sizing
pub trait TokenCounter: Send + Sync {
    /// Number of tokens `text` costs
    fn count_tokens(&self, text: &str) -> usize;
}

/// Token counter backed by `tiktoken-rs`
pub struct TikTokenCounter {
    /// Loaded BPE, `None` when even the fallback encoding failed
    bpe: Option<CoreBPE>,
}

impl TikTokenCounter {
    /// Build a counter for the given model identifier
    pub fn for_model(model: &str) -> Self {
        let bpe = match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => Some(bpe),
            Err(e) => {
                debug!("No tokenizer registered for model '{}' ({}), using cl100k_base", model, e);
                match tiktoken_rs::cl100k_base() {
                    Ok(bpe) => Some(bpe),
                    Err(e) => {
                        error!(
                            "Failed to initialize TikToken BPE (cl100k_base): {:?}. Falling back to whitespace token count.",
                            e
                        );
                        None
                    }
                }
            }
        };

        Self { bpe }
    }
}

impl TokenCounter for TikTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        match &self.bpe {
            Some(bpe) => bpe.encode_with_special_tokens(text).len(),
            None => text.split_whitespace().count(),
        }
    }
}

/// Estimates tokens by counting whitespace-separated words
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenCounter;

impl TokenCounter for WhitespaceTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}
