/*!
 * Translation of one plugin's string table.
 *
 * Rows are grouped by record type; groups are handled in sorted order and
 * keep their row order. Within a group, empty strings are passed through,
 * the rest is cut into token-bounded batches, and each batch goes through the
 * cache and then the retry engine. Batches run one after another.
 */

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::plugin::{RecordStatus, StringRecord};
use super::batch::TokenBudgetBatcher;
use super::cache::TranslationCache;
use super::core::{RemoteTranslator, TranslationItem};
use super::prompts::PromptResolver;
use super::retry::{failure_marker, BatchContext, RetryReconciler};

/// Counters for one translated plugin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationReport {
    /// Rows handled
    pub rows: usize,
    /// Rows with empty source text
    pub empty: usize,
    /// Rows served from the cache
    pub cache_hits: usize,
    /// Rows translated by the remote service
    pub translated: usize,
    /// Rows left with the failure marker
    pub failed: usize,
    /// Batches that needed the remote service
    pub batches: usize,
    /// Remote calls made, retries included
    pub remote_calls: u32,
}

/// Translates the records of one plugin
#[derive(Clone)]
pub struct PluginTranslator {
    /// Remote translation capability
    remote: Arc<dyn RemoteTranslator>,

    /// Record-type prompts
    prompts: Arc<PromptResolver>,

    /// Token-budget batcher
    batcher: TokenBudgetBatcher,

    /// Retry policy driver
    reconciler: RetryReconciler,
}

impl PluginTranslator {
    /// Create a translator from its collaborators
    pub fn new(
        remote: Arc<dyn RemoteTranslator>,
        prompts: Arc<PromptResolver>,
        batcher: TokenBudgetBatcher,
        reconciler: RetryReconciler,
    ) -> Self {
        Self { remote, prompts, batcher, reconciler }
    }

    /// Fill `translated` and `status` of every record.
    ///
    /// Row `i`'s translation always derives from row `i`'s source text.
    pub async fn translate(
        &self,
        plugin: &str,
        records: &mut [StringRecord],
        cache: &TranslationCache,
    ) -> TranslationReport {
        let start = Instant::now();
        let mut report = TranslationReport {
            rows: records.len(),
            ..Default::default()
        };

        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (row, record) in records.iter().enumerate() {
            groups.entry(record.record_type.clone()).or_default().push(row);
        }

        for (record_type, rows) in groups {
            info!("Plugin={} Type={}: {} rows", plugin, record_type, rows.len());
            self.translate_group(plugin, &record_type, &rows, records, cache, &mut report).await;
        }

        info!(
            "Plugin={}: {} rows ({} translated, {} cached, {} empty, {} failed) with {} remote calls in {:.1}s",
            plugin,
            report.rows,
            report.translated,
            report.cache_hits,
            report.empty,
            report.failed,
            report.remote_calls,
            start.elapsed().as_secs_f64()
        );

        report
    }

    /// Translate the rows of one record type
    async fn translate_group(
        &self,
        plugin: &str,
        record_type: &str,
        rows: &[usize],
        records: &mut [StringRecord],
        cache: &TranslationCache,
        report: &mut TranslationReport,
    ) {
        let prompt = self.prompts.resolve(record_type);

        // Row positions double as ids, so they are unique within the group
        let mut items = Vec::with_capacity(rows.len());
        for &row in rows {
            let record = &mut records[row];
            if record.original.trim().is_empty() {
                record.set_translation(String::new(), RecordStatus::TranslationComplete);
                report.empty += 1;
            } else {
                items.push(TranslationItem::new(row, record.original.clone()));
            }
        }

        for (batch_index, batch) in self.batcher.batch(items).into_iter().enumerate() {
            let batch_no = batch_index + 1;
            debug!(
                "Plugin={} Type={} Batch={}: {} items",
                plugin, record_type, batch_no, batch.len()
            );

            let mut pending = Vec::with_capacity(batch.len());
            for item in batch {
                match cache.get(record_type, &item.text) {
                    Some(hit) => {
                        records[item.id].set_translation(hit, RecordStatus::TranslationComplete);
                        report.cache_hits += 1;
                    }
                    None => pending.push(item),
                }
            }

            if pending.is_empty() {
                debug!("Plugin={} Type={} Batch={}: served from cache", plugin, record_type, batch_no);
                continue;
            }

            let originals: HashMap<usize, String> = pending
                .iter()
                .map(|item| (item.id, item.text.clone()))
                .collect();
            let ctx = BatchContext { plugin, record_type, batch_no };
            let outcome = self.reconciler.resolve(self.remote.as_ref(), prompt, pending, &ctx).await;

            report.batches += 1;
            report.remote_calls += outcome.attempts;

            for (id, text) in outcome.translated {
                if let Some(original) = originals.get(&id) {
                    cache.set(record_type, original, &text);
                }
                records[id].set_translation(text, RecordStatus::TranslationComplete);
                report.translated += 1;
            }

            for item in outcome.unresolved {
                records[item.id].set_translation(failure_marker(&item.text), RecordStatus::TranslationFailed);
                report.failed += 1;
            }
        }
    }
}
