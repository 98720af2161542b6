/*!
 * Record-type aware prompt selection.
 *
 * Every record type can carry its own instruction fragment. The fragment is
 * appended to the shared base template; types without a fragment use the
 * generic `others` entry. The table is built and validated once, before any
 * plugin is processed.
 */

use std::collections::HashMap;

use log::debug;

use crate::app_config::{TranslationCommonConfig, GENERIC_PROMPT_KEY};
use crate::errors::TranslationError;

/// Prompt sent with one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// System message with the language names filled in
    pub system: String,

    /// Base template followed by the record-type fragment
    pub instruction: String,
}

/// Maps record types to prompts
#[derive(Debug, Clone)]
pub struct PromptResolver {
    /// Prompts keyed by normalized record type
    by_type: HashMap<String, PromptTemplate>,

    /// Prompt for record types without an entry
    generic: PromptTemplate,
}

/// Normalize a configured record-type key.
///
/// Keys are upper-cased and the separator between the record signature and
/// the subrecord may be written as `_` (`DIAL_FULL` becomes `DIAL FULL`).
/// Underscores inside the 4-character signature (`NPC_`) are kept.
pub fn normalize_record_type(key: &str) -> String {
    let upper = key.trim().to_uppercase();
    let bytes = upper.as_bytes();
    if bytes.len() == 9 && bytes[4] == b'_' {
        format!("{} {}", &upper[..4], &upper[5..])
    } else {
        upper
    }
}

impl PromptResolver {
    /// Build the prompt table from configuration.
    ///
    /// `source_language` and `target_language` are the human-readable names
    /// substituted into the system prompt. Fails when the generic entry is
    /// missing or any configured fragment is blank.
    pub fn from_config(
        common: &TranslationCommonConfig,
        source_language: &str,
        target_language: &str,
    ) -> Result<Self, TranslationError> {
        if common.system_prompt.trim().is_empty() {
            return Err(TranslationError::PromptConfig("system prompt is empty".to_string()));
        }

        let system = common.system_prompt
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language);
        let compose = |fragment: &str| PromptTemplate {
            system: system.clone(),
            instruction: format!("{}{}", common.prompt_template, fragment),
        };

        let mut generic = None;
        let mut by_type = HashMap::new();

        for (key, fragment) in &common.prompts {
            if fragment.trim().is_empty() {
                return Err(TranslationError::PromptConfig(format!("prompt for '{}' is empty", key)));
            }

            if key.trim().eq_ignore_ascii_case(GENERIC_PROMPT_KEY) {
                generic = Some(compose(fragment));
                continue;
            }

            let record_type = normalize_record_type(key);
            if by_type.insert(record_type.clone(), compose(fragment)).is_some() {
                return Err(TranslationError::PromptConfig(format!(
                    "prompt for '{}' is defined more than once",
                    record_type
                )));
            }
        }

        let generic = generic.ok_or_else(|| {
            TranslationError::PromptConfig(format!("missing generic '{}' prompt", GENERIC_PROMPT_KEY))
        })?;

        debug!("Loaded prompts for {} record types plus the generic prompt", by_type.len());

        Ok(Self { by_type, generic })
    }

    /// Prompt for a record type, falling back to the generic prompt
    pub fn resolve(&self, record_type: &str) -> &PromptTemplate {
        self.by_type
            .get(&normalize_record_type(record_type))
            .unwrap_or(&self.generic)
    }

    /// Whether a record type has its own prompt
    pub fn has_specific(&self, record_type: &str) -> bool {
        self.by_type.contains_key(&normalize_record_type(record_type))
    }

    /// Number of record types with their own prompt
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    /// Whether only the generic prompt is configured
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}
