/*!
 * CSV string tables.
 *
 * The extractor writes `editor_id,form_id,index,type,string`. After
 * translation the same table is rewritten with an extra `translated` and
 * `status` column so it can be inspected by hand.
 */

use std::collections::HashSet;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::PluginError;
use crate::translation::prompts::normalize_record_type;
use super::{normalize_editor_id, normalize_index, StringRecord};

/// Row as written by the extractor
#[derive(Debug, Deserialize)]
struct ExtractedRow {
    #[serde(default)]
    editor_id: Option<String>,
    #[serde(default)]
    form_id: Option<String>,
    #[serde(default)]
    index: Option<String>,
    #[serde(rename = "type", default)]
    record_type: Option<String>,
    #[serde(default)]
    string: Option<String>,
}

/// Row of the translated table
#[derive(Debug, Serialize)]
struct TranslatedRow<'a> {
    editor_id: &'a str,
    form_id: &'a str,
    index: i64,
    #[serde(rename = "type")]
    record_type: &'a str,
    string: &'a str,
    translated: &'a str,
    status: &'a str,
}

fn table_error(path: &Path, source: csv::Error) -> PluginError {
    PluginError::Table {
        path: path.to_path_buf(),
        source,
    }
}

/// Load an extracted table, keeping rows whose type is in `target_types`.
///
/// An empty `target_types` keeps every row. Types are compared after
/// normalization, so `DIAL_FULL` selects `DIAL FULL` rows. Rows with no field
/// set at all are skipped.
pub fn read_string_table(path: &Path, target_types: &[String]) -> Result<Vec<StringRecord>, PluginError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| table_error(path, e))?;

    let targets: HashSet<String> = target_types.iter().map(|t| normalize_record_type(t)).collect();
    let mut records = Vec::new();
    let mut filtered = 0usize;

    for row in reader.deserialize::<ExtractedRow>() {
        let row = row.map_err(|e| table_error(path, e))?;

        let record_type = row.record_type.as_deref().unwrap_or("").trim().to_string();
        let form_id = row.form_id.as_deref().unwrap_or("").trim().to_string();
        let original = row.string.unwrap_or_default();

        if record_type.is_empty() && form_id.is_empty() && original.trim().is_empty() {
            continue;
        }

        if !targets.is_empty() && !targets.contains(&normalize_record_type(&record_type)) {
            filtered += 1;
            continue;
        }

        records.push(StringRecord::new(
            normalize_editor_id(row.editor_id.as_deref()),
            form_id,
            normalize_index(row.index.as_deref()),
            record_type,
            original,
        ));
    }

    debug!(
        "Loaded {} rows from {:?} ({} rows outside target types)",
        records.len(), path, filtered
    );

    Ok(records)
}

/// Write records, including their translation and status, as CSV
pub fn write_translated_table(path: &Path, records: &[StringRecord]) -> Result<(), PluginError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| table_error(path, e))?;

    for record in records {
        writer
            .serialize(TranslatedRow {
                editor_id: record.editor_id.as_deref().unwrap_or("null"),
                form_id: &record.form_id,
                index: record.index,
                record_type: &record.record_type,
                string: &record.original,
                translated: record.translated.as_deref().unwrap_or(""),
                status: record.status.as_str(),
            })
            .map_err(|e| table_error(path, e))?;
    }

    writer.flush()?;
    Ok(())
}
