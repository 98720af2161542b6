/*!
 * Token-budget batching.
 *
 * Items are packed greedily, in order, into as few batches as possible
 * without any batch exceeding the token budget. An item that alone costs
 * more than the budget is sent on its own so it still gets translated.
 */

use std::sync::Arc;

use super::core::TranslationItem;
use super::tokenizer::TokenCounter;

/// Split `items` into consecutive batches whose summed cost stays within `budget`.
///
/// A batch may only exceed the budget when it holds exactly one item whose own
/// cost is larger than the budget. Order is preserved within and across batches.
pub fn batch_by_token_budget<T, F>(items: Vec<T>, budget: usize, mut cost_fn: F) -> Vec<Vec<T>>
where
    F: FnMut(&T) -> usize,
{
    let mut batches = Vec::new();
    let mut current: Vec<T> = Vec::new();
    let mut current_cost = 0usize;

    for item in items {
        let cost = cost_fn(&item);

        // Oversized item: flush what we have, then emit it alone
        if cost > budget {
            if !current.is_empty() {
                batches.push(std::mem::take(&mut current));
                current_cost = 0;
            }
            batches.push(vec![item]);
            continue;
        }

        if current_cost + cost > budget && !current.is_empty() {
            batches.push(std::mem::take(&mut current));
            current_cost = 0;
        }

        current_cost += cost;
        current.push(item);
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}

/// Batches translation items using a token counter
#[derive(Clone)]
pub struct TokenBudgetBatcher {
    /// Cost estimator
    counter: Arc<dyn TokenCounter>,

    /// Maximum summed token cost of one batch
    budget: usize,
}

impl TokenBudgetBatcher {
    /// Create a batcher with the given counter and budget
    pub fn new(counter: Arc<dyn TokenCounter>, budget: usize) -> Self {
        Self { counter, budget }
    }

    /// The configured budget
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Token cost of one text
    pub fn cost(&self, text: &str) -> usize {
        self.counter.count_tokens(text)
    }

    /// Partition items into token-bounded batches
    pub fn batch(&self, items: Vec<TranslationItem>) -> Vec<Vec<TranslationItem>> {
        batch_by_token_budget(items, self.budget, |item| self.counter.count_tokens(&item.text))
    }
}
