/*!
 * Retry with id reconciliation.
 *
 * A batch is sent, the answer is matched back to the submitted ids, and only
 * the ids still missing are sent again. A failed call (transport error,
 * unparseable answer) consumes an attempt like any other. After the last
 * attempt the leftovers are reported as unresolved; callers substitute
 * [`failure_marker`] for them.
 */

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use log::{debug, error, warn};

use super::core::{RemoteTranslator, TranslationItem};
use super::prompts::PromptTemplate;

/// How often and how patiently a batch is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,

    /// Delay before the first retry, doubled on each further retry. Zero disables waiting.
    pub backoff_ms: u64,
}

impl RetryPolicy {
    /// Create a retry policy
    pub fn new(max_retries: u32, backoff_ms: u64) -> Self {
        Self { max_retries, backoff_ms }
    }

    /// Delay before the given retry (1-based)
    fn delay_before(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_ms.saturating_mul(factor))
    }
}

/// Where a batch comes from, for log lines
#[derive(Debug, Clone, Copy)]
pub struct BatchContext<'a> {
    /// Plugin file name
    pub plugin: &'a str,
    /// Record type of the batch
    pub record_type: &'a str,
    /// 1-based batch number within the record type
    pub batch_no: usize,
}

/// Result of resolving one batch
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Accepted translations by id
    pub translated: BTreeMap<usize, String>,

    /// Items no attempt produced a translation for, in submission order
    pub unresolved: Vec<TranslationItem>,

    /// Remote calls made
    pub attempts: u32,
}

impl BatchOutcome {
    /// Every submitted id mapped to its translation or failure marker
    pub fn into_results(self) -> BTreeMap<usize, String> {
        let mut results = self.translated;
        for item in self.unresolved {
            results.insert(item.id, failure_marker(&item.text));
        }
        results
    }
}

/// Text stored for a string that could not be translated
pub fn failure_marker(original: &str) -> String {
    format!("[translation failed: {}]", original)
}

/// Drives attempts for one batch until every id is resolved or attempts run out
#[derive(Debug, Clone)]
pub struct RetryReconciler {
    policy: RetryPolicy,
}

impl RetryReconciler {
    /// Create a reconciler with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Policy in use
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Translate `items`, retrying missing ids.
    ///
    /// Ids in `items` must be unique. Every submitted id ends up either in
    /// `translated` or in `unresolved`, never in both.
    pub async fn resolve(
        &self,
        remote: &dyn RemoteTranslator,
        prompt: &PromptTemplate,
        items: Vec<TranslationItem>,
        ctx: &BatchContext<'_>,
    ) -> BatchOutcome {
        let submitted = items.len();
        let mut outcome = BatchOutcome::default();
        let mut remaining = items;

        for retry in 0..=self.policy.max_retries {
            if remaining.is_empty() {
                break;
            }

            if retry > 0 {
                let delay = self.policy.delay_before(retry);
                if !delay.is_zero() {
                    debug!(
                        "Plugin={} Type={} Batch={}: waiting {:?} before retry {}",
                        ctx.plugin, ctx.record_type, ctx.batch_no, delay, retry
                    );
                    tokio::time::sleep(delay).await;
                }
            }

            outcome.attempts += 1;

            let returned = match remote.translate_items(prompt, &remaining).await {
                Ok(returned) => returned,
                Err(e) => {
                    error!(
                        "Plugin={} Type={} Batch={} Retry={}: API error: {}",
                        ctx.plugin, ctx.record_type, ctx.batch_no, retry, e
                    );
                    continue;
                }
            };

            reconcile(&mut remaining, returned, &mut outcome.translated, ctx, retry);
            debug_assert_eq!(outcome.translated.len() + remaining.len(), submitted);

            if !remaining.is_empty() {
                let missing: Vec<usize> = remaining.iter().map(|item| item.id).collect();
                warn!(
                    "Plugin={} Type={} Batch={} Retry={}: Missing IDs={:?}",
                    ctx.plugin, ctx.record_type, ctx.batch_no, retry, missing
                );
            }
        }

        if !remaining.is_empty() {
            error!(
                "Plugin={} Type={} Batch={}: giving up on {} of {} items after {} attempts",
                ctx.plugin, ctx.record_type, ctx.batch_no, remaining.len(), submitted, outcome.attempts
            );
        }

        outcome.unresolved = remaining;
        outcome
    }
}

/// Accept returned items whose id is still pending, once each
fn reconcile(
    remaining: &mut Vec<TranslationItem>,
    returned: Vec<TranslationItem>,
    translated: &mut BTreeMap<usize, String>,
    ctx: &BatchContext<'_>,
    retry: u32,
) {
    let pending: HashSet<usize> = remaining.iter().map(|item| item.id).collect();
    let mut accepted = HashSet::new();

    for item in returned {
        if !pending.contains(&item.id) {
            warn!(
                "Plugin={} Type={} Batch={} Retry={}: ignoring unknown id {}",
                ctx.plugin, ctx.record_type, ctx.batch_no, retry, item.id
            );
            continue;
        }
        if !accepted.insert(item.id) {
            warn!(
                "Plugin={} Type={} Batch={} Retry={}: ignoring duplicate id {}",
                ctx.plugin, ctx.record_type, ctx.batch_no, retry, item.id
            );
            continue;
        }
        translated.insert(item.id, item.text);
    }

    remaining.retain(|item| !accepted.contains(&item.id));
}
