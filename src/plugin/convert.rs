/*!
 * DSD JSON output.
 *
 * Dynamic String Distributor reads a JSON array of string overrides per
 * plugin. Each entry keeps the original text next to the translation.
 */

use std::path::Path;

use serde::Serialize;

use crate::errors::PluginError;
use super::StringRecord;

/// One DSD override entry
#[derive(Debug, Serialize)]
struct DsdEntry<'a> {
    editor_id: Option<&'a str>,
    form_id: &'a str,
    index: i64,
    #[serde(rename = "type")]
    record_type: &'a str,
    original: &'a str,
    string: &'a str,
    status: &'a str,
}

/// Write translated records as a DSD JSON array. Returns the entry count.
pub fn write_dsd_json(records: &[StringRecord], path: &Path) -> Result<usize, PluginError> {
    let entries: Vec<DsdEntry<'_>> = records.iter()
        .filter(|r| !(r.form_id.trim().is_empty() && r.record_type.trim().is_empty() && r.original.trim().is_empty()))
        .map(|r| DsdEntry {
            editor_id: r.editor_id.as_deref().map(str::trim).filter(|id| !id.is_empty()),
            form_id: r.form_id.trim(),
            index: r.index,
            record_type: r.record_type.trim(),
            original: r.original.trim(),
            string: r.translated.as_deref().unwrap_or("").trim(),
            status: r.status.as_str(),
        })
        .collect();

    let json = serde_json::to_string_pretty(&entries).map_err(|e| PluginError::Conversion {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;

    Ok(entries.len())
}
