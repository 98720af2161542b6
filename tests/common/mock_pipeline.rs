/*!
 * Test doubles for plugin processing.
 *
 * - `ScriptedPipeline` succeeds, fails or panics per plugin name and records
 *   how many plugins ran at the same time.
 * - `FixtureExtractor` "extracts" a plugin by copying a prepared CSV table.
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use modlocai::app_controller::{PluginArtifacts, PluginPipeline};
use modlocai::errors::PluginError;
use modlocai::file_utils::FileManager;
use modlocai::plugin::extract::StringExtractor;

/// What the scripted pipeline does for a plugin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PluginScript {
    /// Finish successfully
    Succeed,
    /// Return an error
    Fail,
    /// Panic inside the task
    Panic,
}

/// Pipeline whose behavior is chosen per plugin file name
#[derive(Debug, Default)]
pub struct ScriptedPipeline {
    scripts: HashMap<String, PluginScript>,
    delay: Duration,
    running: AtomicUsize,
    peak: AtomicUsize,
    processed: Mutex<Vec<String>>,
}

impl ScriptedPipeline {
    /// Every plugin succeeds after `delay`
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    /// Use `script` for the plugin named `plugin_name`
    pub fn with(mut self, plugin_name: &str, script: PluginScript) -> Self {
        self.scripts.insert(plugin_name.to_string(), script);
        self
    }

    /// Highest number of plugins in flight at once
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Plugins that were started, in start order
    pub fn processed(&self) -> Vec<String> {
        self.processed.lock().clone()
    }
}

#[async_trait]
impl PluginPipeline for ScriptedPipeline {
    async fn process(&self, plugin: &Path) -> Result<PluginArtifacts> {
        let name = FileManager::file_name_of(plugin);
        self.processed.lock().push(name.clone());

        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.running.fetch_sub(1, Ordering::SeqCst);

        match self.scripts.get(&name).copied().unwrap_or(PluginScript::Succeed) {
            PluginScript::Succeed => Ok(PluginArtifacts::default()),
            PluginScript::Fail => Err(anyhow!("scripted failure for {}", name)),
            PluginScript::Panic => panic!("scripted panic for {}", name),
        }
    }
}

/// Extractor that copies `<fixtures>/<plugin>.csv` into the output directory
#[derive(Debug, Clone)]
pub struct FixtureExtractor {
    fixtures: PathBuf,
    pub calls: Arc<AtomicUsize>,
}

impl FixtureExtractor {
    pub fn new(fixtures: &Path) -> Self {
        Self {
            fixtures: fixtures.to_path_buf(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl StringExtractor for FixtureExtractor {
    async fn extract(&self, plugin: &Path, output_dir: &Path) -> Result<PathBuf, PluginError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = FileManager::file_name_of(plugin);
        let fixture = self.fixtures.join(format!("{}.csv", name));
        if !fixture.is_file() {
            return Err(PluginError::Extraction {
                path: plugin.to_path_buf(),
                message: "no fixture table".to_string(),
            });
        }

        FileManager::ensure_dir(output_dir)?;
        let output = output_dir.join(format!("{}.csv", name));
        std::fs::copy(&fixture, &output)?;
        Ok(output)
    }
}
