/*!
 * Load-order plugin resolution.
 *
 * A mod manager profile lists mods one per line, highest priority first.
 * Enabled mods are prefixed with `+`. When several enabled mods ship a plugin
 * with the same file name, the one from the highest-priority mod wins.
 */

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, info, warn};

use crate::file_utils::FileManager;

/// Prefix of an enabled mod line
pub const ENABLED_MARKER: char = '+';

/// Plugin file name mapped to the path that provides it
pub type PluginResolutionMap = BTreeMap<String, PathBuf>;

/// Enabled mod names in priority order.
///
/// A missing or unreadable profile is an error.
pub fn read_enabled_mods(profile: &Path) -> Result<Vec<String>> {
    let content = FileManager::read_to_string(profile)?;

    let mods: Vec<String> = content
        .lines()
        .filter_map(|line| line.trim_end().strip_prefix(ENABLED_MARKER))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    info!("Profile {:?} enables {} mods", profile, mods.len());
    Ok(mods)
}

/// Map each plugin file name to its file in the highest-priority enabled mod.
///
/// Mods that are missing or not directories are skipped.
pub fn resolve_plugins(enabled_mods: &[String], mods_root: &Path) -> PluginResolutionMap {
    let mut resolved = PluginResolutionMap::new();

    for mod_name in enabled_mods {
        let mod_dir = mods_root.join(mod_name);
        if !FileManager::dir_exists(&mod_dir) {
            debug!("Skipping mod without directory: {}", mod_name);
            continue;
        }

        let entries = match fs::read_dir(&mod_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot list mod directory {:?}: {}", mod_dir, e);
                continue;
            }
        };

        let mut plugins: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && FileManager::is_plugin_file(path))
            .collect();
        plugins.sort();

        for plugin in plugins {
            let name = FileManager::file_name_of(&plugin);
            if let Some(existing) = resolved.get(&name) {
                debug!("{} from {} is overridden by {:?}", name, mod_name, existing);
                continue;
            }
            resolved.insert(name, plugin);
        }
    }

    resolved
}

/// Keep the first plugin of each file name, in input order.
///
/// Outputs and the timestamp snapshot are keyed by file name, so two plugins
/// with the same name cannot both be processed.
pub fn dedupe_by_file_name(plugins: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = PluginResolutionMap::new();
    let mut kept = Vec::with_capacity(plugins.len());

    for plugin in plugins {
        let name = FileManager::file_name_of(&plugin);
        if let Some(existing) = seen.get(&name) {
            warn!("Ignoring {:?}: {} is already provided by {:?}", plugin, name, existing);
            continue;
        }
        seen.insert(name, plugin.clone());
        kept.push(plugin);
    }

    kept
}

/// Plugins selected by a profile, sorted by file name
pub fn plugins_from_profile(profile: &Path, mods_root: &Path) -> Result<Vec<PathBuf>> {
    let enabled = read_enabled_mods(profile)?;
    Ok(resolve_plugins(&enabled, mods_root).into_values().collect())
}
