use anyhow::{Result, Context};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::load_order;
use crate::plugin::convert::write_dsd_json;
use crate::plugin::extract::{CommandExtractor, StringExtractor};
use crate::plugin::table::{read_string_table, write_translated_table};
use crate::snapshot::{select_changed, PluginTimestampSnapshot};
use crate::translation::{
    PluginTranslator, PromptResolver, RetryPolicy, RetryReconciler, TikTokenCounter, TokenBudgetBatcher,
    TranslationCache, TranslationReport, TranslationService,
};

// @module: Application controller for plugin translation runs

/// What one plugin produced
#[derive(Debug, Clone, Default)]
pub struct PluginArtifacts {
    /// DSD JSON file, `None` when the plugin had no translatable strings
    pub dsd_path: Option<PathBuf>,

    /// Translation counters
    pub report: TranslationReport,
}

/// Result of processing one plugin
#[derive(Debug, Clone)]
pub enum PluginStatus {
    /// Every step finished
    Completed(PluginArtifacts),
    /// A step failed or the task panicked
    Failed(String),
}

/// Per-plugin outcome of a run
#[derive(Debug, Clone)]
pub struct PluginOutcome {
    /// Plugin file name
    pub plugin_name: String,

    /// Plugin path
    pub plugin_path: PathBuf,

    /// Success or failure
    pub status: PluginStatus,

    /// Wall-clock time spent on the plugin
    pub elapsed: Duration,
}

impl PluginOutcome {
    /// Whether the plugin finished without error
    pub fn is_success(&self) -> bool {
        matches!(self.status, PluginStatus::Completed(_))
    }
}

/// Totals of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Plugins discovered
    pub discovered: usize,
    /// Plugins dropped by the exclusion list
    pub excluded: usize,
    /// Plugins skipped because they did not change
    pub unchanged: usize,
    /// Plugins that finished
    pub succeeded: usize,
    /// Names of plugins that failed
    pub failed: Vec<String>,
}

impl RunSummary {
    /// Log the summary
    pub fn log(&self) {
        info!(
            "Run finished: {} discovered, {} excluded, {} unchanged, {} succeeded, {} failed",
            self.discovered,
            self.excluded,
            self.unchanged,
            self.succeeded,
            self.failed.len()
        );
        if !self.failed.is_empty() {
            warn!("Failed plugins: {}", self.failed.join(", "));
        }
    }
}

/// Processing of a single plugin, from binary file to output
#[async_trait]
pub trait PluginPipeline: Send + Sync {
    /// Process one plugin
    async fn process(&self, plugin: &Path) -> Result<PluginArtifacts>;
}

/// Extract, translate, write the table, convert to DSD
pub struct StandardPipeline {
    // @field: App configuration
    config: Arc<Config>,

    // @field: String extractor
    extractor: Arc<dyn StringExtractor>,

    // @field: Table translator
    translator: Arc<PluginTranslator>,
}

impl StandardPipeline {
    /// Create a pipeline from its collaborators
    pub fn new(config: Arc<Config>, extractor: Arc<dyn StringExtractor>, translator: Arc<PluginTranslator>) -> Self {
        Self { config, extractor, translator }
    }

    /// Build the pipeline the configuration describes
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        let source_name = language_utils::get_language_name(&config.source_language)?;
        let target_name = language_utils::get_language_name(&config.target_language)?;
        let common = &config.translation.common;

        let prompts = PromptResolver::from_config(common, &source_name, &target_name)?;
        let service = TranslationService::new(&config.translation)?;
        let counter = TikTokenCounter::for_model(service.model());

        info!(
            "Using {} model {} ({} record-type prompts, batch budget {} tokens)",
            config.translation.provider.display_name(),
            service.model(),
            prompts.len(),
            common.max_input_tokens
        );

        let translator = PluginTranslator::new(
            Arc::new(service),
            Arc::new(prompts),
            TokenBudgetBatcher::new(Arc::new(counter), common.max_input_tokens),
            RetryReconciler::new(RetryPolicy::new(common.max_retry, common.retry_backoff_ms)),
        );
        let extractor = CommandExtractor::new(config.general.extractor.clone(), &config.general.target_types);

        Ok(Self::new(config, Arc::new(extractor), Arc::new(translator)))
    }
}

#[async_trait]
impl PluginPipeline for StandardPipeline {
    async fn process(&self, plugin: &Path) -> Result<PluginArtifacts> {
        let plugin_name = FileManager::file_name_of(plugin);
        let general = &self.config.general;

        let table_path = self.extractor.extract(plugin, &general.csv_dir()).await?;
        let mut records = read_string_table(&table_path, &general.target_types)?;

        if records.is_empty() {
            info!("[SKIP] No translatable strings in {}", plugin_name);
            return Ok(PluginArtifacts::default());
        }

        let cache = TranslationCache::new();
        let report = self.translator.translate(&plugin_name, &mut records, &cache).await;
        let (hits, misses, hit_rate) = cache.stats();
        debug!("Plugin={}: cache {} hits, {} misses ({:.0}%)", plugin_name, hits, misses, hit_rate * 100.0);

        write_translated_table(&table_path, &records)?;

        let dsd_path = general.dsd_dir().join(&plugin_name).join(format!("{}.json", plugin_name));
        let entries = write_dsd_json(&records, &dsd_path)?;
        info!("Plugin={}: wrote {} entries to {:?}", plugin_name, entries, dsd_path);

        Ok(PluginArtifacts {
            dsd_path: Some(dsd_path),
            report,
        })
    }
}

/// Run the pipeline over every plugin with at most `max_parallel` at a time.
///
/// Each plugin runs in its own task. Errors and panics become failed
/// outcomes; they never stop the other plugins.
pub async fn run_plugins<P>(
    pipeline: Arc<P>,
    plugins: Vec<PathBuf>,
    max_parallel: usize,
    progress: &ProgressBar,
) -> Vec<PluginOutcome>
where
    P: PluginPipeline + ?Sized + 'static,
{
    if plugins.is_empty() {
        return Vec::new();
    }

    let workers = max_parallel.min(plugins.len()).max(1);
    debug!("Processing {} plugins with {} workers", plugins.len(), workers);

    stream::iter(plugins)
        .map(|plugin_path| {
            let pipeline = Arc::clone(&pipeline);
            let progress = progress.clone();
            async move {
                let plugin_name = FileManager::file_name_of(&plugin_path);
                let start = Instant::now();
                info!("[START] {}", plugin_name);

                let task_path = plugin_path.clone();
                let handle = tokio::spawn(async move { pipeline.process(&task_path).await });

                let status = match handle.await {
                    Ok(Ok(artifacts)) => {
                        info!("[OK] Finished plugin: {}", plugin_name);
                        PluginStatus::Completed(artifacts)
                    }
                    Ok(Err(e)) => {
                        error!("[FAIL] Plugin={}: {:#}", plugin_name, e);
                        PluginStatus::Failed(format!("{:#}", e))
                    }
                    Err(join_error) => {
                        error!("[FAIL] Plugin={}: task aborted: {}", plugin_name, join_error);
                        PluginStatus::Failed(format!("task aborted: {}", join_error))
                    }
                };

                progress.inc(1);

                PluginOutcome {
                    plugin_name,
                    plugin_path,
                    status,
                    elapsed: start.elapsed(),
                }
            }
        })
        .buffer_unordered(workers)
        .collect()
        .await
}

/// Main application controller for plugin translation
pub struct Controller {
    // @field: App configuration
    config: Arc<Config>,

    // @field: Per-plugin processing
    pipeline: Arc<dyn PluginPipeline>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let pipeline = StandardPipeline::from_config(Arc::clone(&config))
            .context("Failed to set up the translation pipeline")?;
        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
        })
    }

    /// Create a controller around a custom pipeline
    pub fn with_pipeline(config: Config, pipeline: Arc<dyn PluginPipeline>) -> Self {
        Self {
            config: Arc::new(config),
            pipeline,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Plugins to consider: from the profile's load order when given,
    /// otherwise every plugin under `mods_root`.
    pub fn discover_plugins(mods_root: &Path, profile: Option<&Path>) -> Result<Vec<PathBuf>> {
        match profile {
            Some(profile) => load_order::plugins_from_profile(profile, mods_root)
                .with_context(|| format!("Failed to resolve load order from {:?}", profile)),
            None => FileManager::find_mod_plugins(mods_root).map(load_order::dedupe_by_file_name),
        }
    }

    /// Translate every plugin
    pub async fn run_full(&self, plugins: Vec<PathBuf>) -> Result<RunSummary> {
        let plugins = load_order::dedupe_by_file_name(plugins);
        let mut summary = RunSummary {
            discovered: plugins.len(),
            ..Default::default()
        };

        let selected = self.apply_exclusions(plugins, &mut summary);
        self.process(selected, &mut summary).await?;

        summary.log();
        Ok(summary)
    }

    /// Translate only plugins whose modification time changed since the last update run,
    /// then record the times of every discovered plugin.
    pub async fn run_update(&self, plugins: Vec<PathBuf>) -> Result<RunSummary> {
        let plugins = load_order::dedupe_by_file_name(plugins);
        let snapshot_path = self.config.general.timestamp_file();
        let previous = PluginTimestampSnapshot::load(&snapshot_path)?;

        let mut summary = RunSummary {
            discovered: plugins.len(),
            ..Default::default()
        };

        let changed = select_changed(&plugins, &previous);
        summary.unchanged = plugins.len() - changed.len();
        info!("{} of {} plugins changed since the last update", changed.len(), plugins.len());

        let selected = self.apply_exclusions(changed, &mut summary);
        self.process(selected, &mut summary).await?;

        PluginTimestampSnapshot::from_plugins(&plugins)
            .save(&snapshot_path)
            .with_context(|| format!("Failed to save timestamp snapshot {:?}", snapshot_path))?;

        summary.log();
        Ok(summary)
    }

    /// Drop excluded plugins
    fn apply_exclusions(&self, plugins: Vec<PathBuf>, summary: &mut RunSummary) -> Vec<PathBuf> {
        let before = plugins.len();
        let kept: Vec<PathBuf> = plugins
            .into_iter()
            .filter(|plugin| {
                let name = FileManager::file_name_of(plugin);
                let excluded = self.config.general.is_excluded(&name);
                if excluded {
                    info!("[SKIP] {} is excluded", name);
                }
                !excluded
            })
            .collect();
        summary.excluded += before - kept.len();
        kept
    }

    /// Run the pipeline over the selected plugins and tally the outcomes
    async fn process(&self, plugins: Vec<PathBuf>, summary: &mut RunSummary) -> Result<()> {
        if plugins.is_empty() {
            info!("No plugins to process");
            return Ok(());
        }

        let general = &self.config.general;
        FileManager::ensure_dir(general.csv_dir())
            .with_context(|| format!("Failed to create {:?}", general.csv_dir()))?;
        FileManager::ensure_dir(general.dsd_dir())
            .with_context(|| format!("Failed to create {:?}", general.dsd_dir()))?;

        let progress = ProgressBar::new(plugins.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} plugins ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style.progress_chars("█▓▒░"));
        progress.set_message("Translating plugins");

        let outcomes = run_plugins(
            Arc::clone(&self.pipeline),
            plugins,
            general.max_parallel,
            &progress,
        )
        .await;

        progress.finish_and_clear();

        for outcome in outcomes {
            if outcome.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failed.push(outcome.plugin_name);
            }
        }
        summary.failed.sort();

        Ok(())
    }
}
