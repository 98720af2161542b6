/*!
 * Plugin modification-time snapshot.
 *
 * After each update run the modification time of every discovered plugin is
 * recorded. The next update run only processes plugins that are new or whose
 * modification time differs from the recorded one.
 *
 * File format: one `filename<TAB>mtime` line per plugin, mtime in seconds.
 */

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use log::{debug, info};
use tempfile::NamedTempFile;

use crate::file_utils::FileManager;

/// Modification time of a file in seconds since the Unix epoch
pub fn file_mtime_secs(path: &Path) -> std::io::Result<f64> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(match modified.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs_f64(),
        Err(before) => -before.duration().as_secs_f64(),
    })
}

/// Recorded modification times keyed by plugin file name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginTimestampSnapshot {
    entries: HashMap<String, f64>,
}

impl PluginTimestampSnapshot {
    /// Empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot file. A missing file yields an empty snapshot.
    pub fn load(path: &Path) -> Result<Self> {
        if !FileManager::file_exists(path) {
            info!("No timestamp snapshot at {:?}, treating every plugin as changed", path);
            return Ok(Self::new());
        }

        let content = FileManager::read_to_string(path)?;
        let mut snapshot = Self::new();

        for line in content.lines() {
            let parsed = line
                .split_once('\t')
                .and_then(|(name, mtime)| mtime.trim().parse::<f64>().ok().map(|m| (name, m)));
            match parsed {
                Some((name, mtime)) if !name.is_empty() => {
                    snapshot.entries.insert(name.to_string(), mtime);
                }
                _ => {
                    if !line.trim().is_empty() {
                        debug!("Skipping malformed snapshot line: {:?}", line);
                    }
                }
            }
        }

        Ok(snapshot)
    }

    /// Stat every plugin. Plugins that cannot be read are left out.
    pub fn from_plugins(plugins: &[PathBuf]) -> Self {
        let mut snapshot = Self::new();
        for plugin in plugins {
            match file_mtime_secs(plugin) {
                Ok(mtime) => {
                    snapshot.entries.insert(FileManager::file_name_of(plugin), mtime);
                }
                Err(e) => debug!("Cannot stat {:?}: {}", plugin, e),
            }
        }
        snapshot
    }

    /// Recorded modification time of a plugin
    pub fn get(&self, plugin_name: &str) -> Option<f64> {
        self.entries.get(plugin_name).copied()
    }

    /// Record a modification time
    pub fn insert(&mut self, plugin_name: impl Into<String>, mtime: f64) {
        self.entries.insert(plugin_name.into(), mtime);
    }

    /// Number of recorded plugins
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the snapshot file with this snapshot
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        FileManager::ensure_dir(&dir)?;

        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();

        let mut tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
        for name in names {
            writeln!(tmp, "{}\t{}", name, self.entries[name])?;
        }
        tmp.flush()?;
        tmp.persist(path)
            .with_context(|| format!("Failed to write snapshot {:?}", path))?;

        debug!("Saved {} plugin timestamps to {:?}", self.entries.len(), path);
        Ok(())
    }
}

/// Plugins that are new or whose modification time differs from `snapshot`.
///
/// Plugins that cannot be stat'ed are left out.
pub fn select_changed(plugins: &[PathBuf], snapshot: &PluginTimestampSnapshot) -> Vec<PathBuf> {
    plugins
        .iter()
        .filter(|plugin| {
            let mtime = match file_mtime_secs(plugin) {
                Ok(mtime) => mtime,
                Err(e) => {
                    debug!("Cannot stat {:?}: {}", plugin, e);
                    return false;
                }
            };
            match snapshot.get(&FileManager::file_name_of(plugin)) {
                Some(recorded) => recorded != mtime,
                None => true,
            }
        })
        .cloned()
        .collect()
}
