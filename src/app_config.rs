use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::default::Default;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Plugin discovery and scheduling settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: OpenAI
    #[default]
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: Ollama
    Ollama,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    // @returns: Environment variable consulted when no API key is configured
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama | Self::LMStudio => None,
        }
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        let (model, endpoint, timeout_secs) = match provider_type {
            TranslationProvider::OpenAI => (default_openai_model(), default_openai_endpoint(), default_timeout_secs()),
            TranslationProvider::Anthropic => (default_anthropic_model(), default_anthropic_endpoint(), default_timeout_secs()),
            TranslationProvider::Ollama => (default_ollama_model(), default_ollama_endpoint(), default_local_timeout_secs()),
            TranslationProvider::LMStudio => (default_lmstudio_model(), default_lmstudio_endpoint(), default_local_timeout_secs()),
        };

        Self {
            provider_type: provider_type.to_lowercase_string(),
            model,
            api_key: String::new(),
            endpoint,
            timeout_secs,
        }
    }
}

/// How strings are pulled out of a plugin file.
///
/// The extractor is an external program. Every argument may contain the
/// placeholders `{plugin}`, `{output}` and `{types}`; they are substituted
/// with the plugin path, the CSV path to write and the comma-joined
/// target record types.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExtractorConfig {
    /// Executable to run
    #[serde(default = "default_extractor_command")]
    pub command: String,

    /// Argument template
    #[serde(default = "default_extractor_args")]
    pub args: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            command: default_extractor_command(),
            args: default_extractor_args(),
        }
    }
}

/// Plugin discovery, scheduling and output layout
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneralConfig {
    /// Maximum number of plugins processed at the same time
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Plugin file names that are never processed
    #[serde(default)]
    pub exclude_plugins: Vec<String>,

    /// Record types kept from the extracted tables (empty keeps everything)
    #[serde(default = "default_target_types")]
    pub target_types: Vec<String>,

    /// Directory receiving the CSV tables, DSD output and the timestamp snapshot
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// External string extractor
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            exclude_plugins: Vec::new(),
            target_types: default_target_types(),
            work_dir: default_work_dir(),
            extractor: ExtractorConfig::default(),
        }
    }
}

impl GeneralConfig {
    /// Directory holding the extracted and translated string tables
    pub fn csv_dir(&self) -> PathBuf {
        self.work_dir.join("Translated_Csv")
    }

    /// Directory holding the DSD JSON output
    pub fn dsd_dir(&self) -> PathBuf {
        self.work_dir.join("Translated_DSD")
    }

    /// File holding the plugin modification-time snapshot
    pub fn timestamp_file(&self) -> PathBuf {
        self.work_dir.join("plugin_timestamps.txt")
    }

    /// Whether a plugin file name is on the exclusion list
    pub fn is_excluded(&self, plugin_name: &str) -> bool {
        self.exclude_plugins.iter().any(|name| name == plugin_name)
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System-level instruction prefix sent with every request
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Base instruction prepended to every record-type fragment
    #[serde(default = "default_prompt_template")]
    pub prompt_template: String,

    /// Record-type specific instruction fragments, keyed by record type
    /// (`DIAL FULL` or `DIAL_FULL`). The `others` entry is the generic fallback.
    #[serde(default = "default_prompts")]
    pub prompts: BTreeMap<String, String>,

    /// Token budget of one batch
    #[serde(default = "default_max_input_tokens")]
    pub max_input_tokens: usize,

    /// Additional attempts after the first one for a batch
    #[serde(default = "default_max_retry")]
    pub max_retry: u32,

    /// Delay before the first retry in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            prompt_template: default_prompt_template(),
            prompts: default_prompts(),
            max_input_tokens: default_max_input_tokens(),
            max_retry: default_max_retry(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Key of the generic prompt used for record types without their own entry
pub const GENERIC_PROMPT_KEY: &str = "others";

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "ja".to_string()
}

fn default_max_parallel() -> usize {
    4
}

fn default_target_types() -> Vec<String> {
    [
        "BOOK FULL", "BOOK DESC", "DIAL FULL", "INFO NAM1", "INFO RNAM",
        "MESG FULL", "MESG DESC", "QUST FULL", "QUST CNAM", "QUST NNAM",
        "WEAP FULL", "WEAP DESC", "ARMO FULL", "ARMO DESC", "MISC FULL",
        "NPC_ FULL", "SPEL FULL", "MGEF FULL", "MGEF DNAM", "PERK FULL", "PERK DESC",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_extractor_command() -> String {
    "esp_string_extractor".to_string()
}

fn default_extractor_args() -> Vec<String> {
    vec![
        "--input".to_string(),
        "{plugin}".to_string(),
        "--output".to_string(),
        "{output}".to_string(),
        "--types".to_string(),
        "{types}".to_string(),
    ]
}

fn default_max_input_tokens() -> usize {
    2000
}

fn default_max_retry() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_local_timeout_secs() -> u64 {
    300
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_temperature() -> f32 {
    0.0
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_lmstudio_endpoint() -> String {
    // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
    "http://localhost:1234/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_ollama_model() -> String {
    "qwen2.5:7b".to_string()
}

fn default_lmstudio_model() -> String {
    // Placeholder; users should set to the loaded model name in LM Studio
    "local-model".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional localizer of game mods. Translate in-game text from {source_language} to {target_language}. \
     Keep placeholders, tags such as <Alias=Player>, numbers and line breaks exactly as they are."
        .to_string()
}

fn default_prompt_template() -> String {
    "Translate the text of every item. Answer with JSON of the form \
     {\"translations\":[{\"id\":<id>,\"text\":<translation>}]} containing every id you were given.\n"
        .to_string()
}

fn default_prompts() -> BTreeMap<String, String> {
    let mut prompts = BTreeMap::new();
    prompts.insert(
        "DIAL FULL".to_string(),
        "These are dialogue topics the player chooses. Keep them short and in the player's voice.\n".to_string(),
    );
    prompts.insert(
        "INFO NAM1".to_string(),
        "These are spoken NPC lines. Keep the speaker's tone and register.\n".to_string(),
    );
    prompts.insert(
        "BOOK DESC".to_string(),
        "This is book text. Preserve paragraphs and any markup.\n".to_string(),
    );
    prompts.insert(
        "QUST CNAM".to_string(),
        "These are quest journal entries written in the player's perspective.\n".to_string(),
    );
    prompts.insert(
        GENERIC_PROMPT_KEY.to_string(),
        "These are item, location or interface names. Use established fantasy terminology.\n".to_string(),
    );
    prompts
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        if self.general.max_parallel == 0 {
            return Err(anyhow!("general.max_parallel must be at least 1"));
        }

        if self.translation.common.max_input_tokens == 0 {
            return Err(anyhow!("translation.common.max_input_tokens must be at least 1"));
        }

        // Validate API key for hosted providers
        match self.translation.provider {
            TranslationProvider::OpenAI | TranslationProvider::Anthropic => {
                if self.translation.get_api_key().is_empty() {
                    return Err(anyhow!(
                        "Translation API key is required for {} provider",
                        self.translation.provider.display_name()
                    ));
                }
            },
            _ => {}
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            general: GeneralConfig::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider's configuration, creating it if missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let position = self.available_providers.iter().position(|p| p.provider_type == provider_str);
        match position {
            Some(index) => &mut self.available_providers[index],
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider));
                let last = self.available_providers.len() - 1;
                &mut self.available_providers[last]
            }
        }
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        self.get_active_provider_config()
            .filter(|p| !p.model.is_empty())
            .map(|p| p.model.clone())
            .unwrap_or_else(|| ProviderConfig::new(self.provider).model)
    }

    /// Get the API key for the active provider, falling back to the environment
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        self.provider.api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        self.get_active_provider_config()
            .filter(|p| !p.endpoint.is_empty())
            .map(|p| p.endpoint.clone())
            .unwrap_or_else(|| ProviderConfig::new(self.provider).endpoint)
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(|| ProviderConfig::new(self.provider).timeout_secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::Anthropic),
                ProviderConfig::new(TranslationProvider::Ollama),
                ProviderConfig::new(TranslationProvider::LMStudio),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
