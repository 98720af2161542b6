/*!
 * Mock remote translator for testing.
 *
 * This module provides a translator that simulates different behaviors:
 * - `MockProvider::working()` - Translates every item
 * - `MockProvider::intermittent(n)` - Fails every n-th call
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::empty()` - Answers with no translations at all
 * - `MockProvider::scripted(..)` - Replays prepared answers, then works normally
 *
 * Every call is recorded so tests can check which ids were sent.
 */

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::ProviderError;
use crate::translation::core::{RemoteTranslator, TranslationItem};
use crate::translation::prompts::PromptTemplate;

/// Prepared answer for one call
pub type MockReply = Result<Vec<TranslationItem>, ProviderError>;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a translation for every item
    Working,
    /// Fails every Nth call
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Succeeds with an empty translation list
    Empty,
    /// Succeeds after a delay
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior once scripted replies are used up
    behavior: MockBehavior,
    /// Replies served first, in order
    script: Arc<Mutex<VecDeque<MockReply>>>,
    /// Ids that are never answered
    withheld: Arc<HashSet<usize>>,
    /// Call counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Ids sent with each call
    calls: Arc<Mutex<Vec<Vec<usize>>>>,
    /// Custom translation function (optional)
    custom_response: Option<fn(&str) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            script: Arc::new(Mutex::new(VecDeque::new())),
            withheld: Arc::new(HashSet::new()),
            request_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that answers without translations
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a working mock that first replays `replies`
    pub fn scripted(replies: Vec<MockReply>) -> Self {
        let provider = Self::working();
        provider.script.lock().extend(replies);
        provider
    }

    /// Never answer the given ids
    pub fn withholding(mut self, ids: impl IntoIterator<Item = usize>) -> Self {
        self.withheld = Arc::new(ids.into_iter().collect());
        self
    }

    /// Set a custom translation function
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Translation the mock produces for a source text
    pub fn translate_text(&self, text: &str) -> String {
        match self.custom_response {
            Some(generator) => generator(text),
            None => format!("[TRANSLATED] {}", text),
        }
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Ids sent with each call, in call order
    pub fn calls(&self) -> Vec<Vec<usize>> {
        self.calls.lock().clone()
    }

    fn answer(&self, items: &[TranslationItem]) -> Vec<TranslationItem> {
        items.iter()
            .filter(|item| !self.withheld.contains(&item.id))
            .map(|item| TranslationItem::new(item.id, self.translate_text(&item.text)))
            .collect()
    }
}

#[async_trait]
impl RemoteTranslator for MockProvider {
    async fn translate_items(
        &self,
        _prompt: &PromptTemplate,
        items: &[TranslationItem],
    ) -> Result<Vec<TranslationItem>, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(items.iter().map(|item| item.id).collect());

        let scripted = self.script.lock().pop_front();
        if let Some(reply) = scripted {
            return reply;
        }

        match self.behavior {
            MockBehavior::Working => Ok(self.answer(items)),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.answer(items))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(Vec::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.answer(items))
            }
        }
    }
}
