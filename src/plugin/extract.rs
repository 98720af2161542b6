/*!
 * String extraction.
 *
 * Plugins are binary; reading them is delegated to an external extractor
 * program that writes the strings of a plugin to a CSV table.
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use tokio::process::Command;

use crate::app_config::ExtractorConfig;
use crate::errors::PluginError;
use crate::file_utils::FileManager;
use crate::translation::prompts::normalize_record_type;

/// Longest time a single extraction may take
const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(600);

/// Produces the string table of a plugin
#[async_trait]
pub trait StringExtractor: Send + Sync {
    /// Extract the strings of `plugin` into a CSV table inside `output_dir`
    /// and return the table's path.
    async fn extract(&self, plugin: &Path, output_dir: &Path) -> Result<PathBuf, PluginError>;
}

/// Runs the configured extractor program
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    /// Program and argument template
    config: ExtractorConfig,

    /// Comma-joined record types passed as `{types}`
    types: String,

    /// Longest time a single extraction may take
    timeout: Duration,
}

impl CommandExtractor {
    /// Create an extractor for the given command and record types
    pub fn new(config: ExtractorConfig, target_types: &[String]) -> Self {
        Self {
            config,
            types: target_types
                .iter()
                .map(|t| normalize_record_type(t))
                .collect::<Vec<_>>()
                .join(","),
            timeout: EXTRACTION_TIMEOUT,
        }
    }

    /// Use a different extraction timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments with placeholders substituted
    pub fn build_args(&self, plugin: &Path, output: &Path) -> Vec<String> {
        let plugin = plugin.to_string_lossy();
        let output = output.to_string_lossy();
        self.config.args.iter()
            .map(|arg| {
                arg.replace("{plugin}", &plugin)
                    .replace("{output}", &output)
                    .replace("{types}", &self.types)
            })
            .collect()
    }
}

#[async_trait]
impl StringExtractor for CommandExtractor {
    async fn extract(&self, plugin: &Path, output_dir: &Path) -> Result<PathBuf, PluginError> {
        FileManager::ensure_dir(output_dir)?;
        let output = output_dir.join(format!("{}.csv", FileManager::file_name_of(plugin)));
        let args = self.build_args(plugin, &output);
        debug!("Running extractor: {} {:?}", self.config.command, args);

        let extraction = Command::new(&self.config.command)
            .args(&args)
            .kill_on_drop(true)
            .output();

        let result = tokio::select! {
            result = extraction => {
                result.map_err(|e| PluginError::Extraction {
                    path: plugin.to_path_buf(),
                    message: format!("failed to run '{}': {}", self.config.command, e),
                })?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(PluginError::Extraction {
                    path: plugin.to_path_buf(),
                    message: format!("extractor timed out after {:?}", self.timeout),
                });
            }
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            error!("String extraction failed for {:?}: {}", plugin, stderr);
            return Err(PluginError::Extraction {
                path: plugin.to_path_buf(),
                message: format!("extractor exited with {}: {}", result.status, stderr),
            });
        }

        if !output.is_file() {
            return Err(PluginError::Extraction {
                path: plugin.to_path_buf(),
                message: format!("extractor did not write {:?}", output),
            });
        }

        Ok(output)
    }
}
