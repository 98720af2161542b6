/*!
 * Plugin string tables.
 *
 * A plugin's translatable strings are pulled out by an external extractor
 * into a CSV table, loaded as [`StringRecord`]s, translated, and finally
 * converted into DSD JSON:
 * - `extract`: the extraction collaborator
 * - `table`: CSV reading and writing
 * - `convert`: DSD JSON output
 */

use serde::Serialize;

pub mod convert;
pub mod extract;
pub mod table;

/// Translation state of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RecordStatus {
    /// Not translated yet
    #[default]
    Pending,
    /// Translated, served from cache, or empty
    TranslationComplete,
    /// Carries the failure marker
    TranslationFailed,
}

impl RecordStatus {
    /// Name written to output files
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "Pending",
            RecordStatus::TranslationComplete => "TranslationComplete",
            RecordStatus::TranslationFailed => "TranslationFailed",
        }
    }
}

/// One translatable string of a plugin
#[derive(Debug, Clone, PartialEq)]
pub struct StringRecord {
    /// Editor id, `None` when the record has none
    pub editor_id: Option<String>,

    /// Form id as printed by the extractor
    pub form_id: String,

    /// Position of the string inside its record
    pub index: i64,

    /// Record type such as `DIAL FULL`
    pub record_type: String,

    /// Source text
    pub original: String,

    /// Translated text once processed
    pub translated: Option<String>,

    /// Translation state
    pub status: RecordStatus,
}

impl StringRecord {
    /// Create an untranslated record
    pub fn new(
        editor_id: Option<String>,
        form_id: impl Into<String>,
        index: i64,
        record_type: impl Into<String>,
        original: impl Into<String>,
    ) -> Self {
        Self {
            editor_id,
            form_id: form_id.into(),
            index,
            record_type: record_type.into(),
            original: original.into(),
            translated: None,
            status: RecordStatus::Pending,
        }
    }

    /// Store the outcome of translation
    pub fn set_translation(&mut self, text: String, status: RecordStatus) {
        self.translated = Some(text);
        self.status = status;
    }
}

/// Normalize an editor id cell: blank and the literal `null` mean no id
pub fn normalize_editor_id(raw: Option<&str>) -> Option<String> {
    match raw.map(str::trim) {
        None | Some("") => None,
        Some(value) if value.eq_ignore_ascii_case("null") => None,
        Some(value) => Some(value.to_string()),
    }
}

/// Normalize an index cell: blank or unparsable becomes 0
pub fn normalize_index(raw: Option<&str>) -> i64 {
    raw.map(str::trim)
        .and_then(|value| {
            value.parse::<i64>().ok()
                .or_else(|| value.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        })
        .unwrap_or(0)
}
