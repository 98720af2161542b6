/*!
 * Common test utilities for the modlocai test suite
 */

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use tempfile::TempDir;

use modlocai::app_config::TranslationCommonConfig;
use modlocai::providers::mock::MockProvider;
use modlocai::translation::{
    PluginTranslator, PromptResolver, RetryPolicy, RetryReconciler, TokenBudgetBatcher, WhitespaceTokenCounter,
};
use modlocai::StringRecord;

// Test doubles for the plugin pipeline
pub mod mock_pipeline;

/// Routes library logs to the test output
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Sets the modification time of a file, relative to the Unix epoch
pub fn set_mtime(path: &Path, secs: u64) -> Result<()> {
    let file = fs::File::options().write(true).open(path)?;
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))?;
    Ok(())
}

/// Prompt settings with a few record-type fragments
pub fn test_prompt_config() -> TranslationCommonConfig {
    let mut prompts = BTreeMap::new();
    prompts.insert("DIAL_FULL".to_string(), "Dialogue topic.".to_string());
    prompts.insert("INFO NAM1".to_string(), "Spoken line.".to_string());
    prompts.insert("others".to_string(), "Generic text.".to_string());

    TranslationCommonConfig {
        system_prompt: "Translate from {source_language} to {target_language}.".to_string(),
        prompt_template: "Base. ".to_string(),
        prompts,
        max_input_tokens: 100,
        max_retry: 3,
        retry_backoff_ms: 0,
        temperature: 0.0,
    }
}

/// Prompt resolver built from [`test_prompt_config`]
pub fn test_prompts() -> PromptResolver {
    PromptResolver::from_config(&test_prompt_config(), "English", "Japanese")
        .expect("test prompt config is valid")
}

/// Plugin translator over a mock, counting one token per word, without backoff
pub fn test_translator(mock: &MockProvider, budget: usize, max_retries: u32) -> PluginTranslator {
    PluginTranslator::new(
        Arc::new(mock.clone()),
        Arc::new(test_prompts()),
        TokenBudgetBatcher::new(Arc::new(WhitespaceTokenCounter), budget),
        RetryReconciler::new(RetryPolicy::new(max_retries, 0)),
    )
}

/// Record without editor id
pub fn record(record_type: &str, original: &str) -> StringRecord {
    StringRecord::new(None, "0x000800", 0, record_type, original)
}

/// Extracted table with a header and the given `(type, string)` rows
pub fn extracted_csv(rows: &[(&str, &str)]) -> String {
    let mut csv = String::from("editor_id,form_id,index,type,string\n");
    for (i, (record_type, text)) in rows.iter().enumerate() {
        csv.push_str(&format!("EDID{},0x{:06X},{},{},\"{}\"\n", i, 0x800 + i, i, record_type, text.replace('"', "\"\"")));
    }
    csv
}
