use anyhow::{Context, Result, anyhow};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use url::Url;

use crate::export::ExportFormat;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Working folders and files
    #[serde(default)]
    pub paths: PathsConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Seconds between automatic saves of the translation data
    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation backend type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Sugoi offline translator
    #[default]
    Sugoi,
    // @provider: OpenAI-compatible chat completion server
    Chat,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Sugoi => "Sugoi",
            Self::Chat => "Chat completion",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Sugoi => "sugoi".to_string(),
            Self::Chat => "chat".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sugoi" => Ok(Self::Sugoi),
            "chat" | "llm" | "lmstudio" => Ok(Self::Chat),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// One translation backend, probed in list order
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: TranslationProvider,

    // @field: Full request URL
    #[serde(default)]
    pub endpoint: String,

    // @field: Model name (chat only)
    #[serde(default)]
    pub model: String,

    // @field: Bearer token (chat only)
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f32,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        let (endpoint, model) = match provider_type {
            TranslationProvider::Sugoi => (default_sugoi_endpoint(), String::new()),
            TranslationProvider::Chat => (default_chat_endpoint(), default_chat_model()),
        };
        Self {
            provider_type,
            endpoint,
            model,
            api_key: String::new(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            repetition_penalty: default_repetition_penalty(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Working folders and files, relative to the current directory by default
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub cache_folder: PathBuf,
    pub database_file: PathBuf,
    pub jp_cache_file: PathBuf,
    pub japanese_script_folder: PathBuf,
    pub japanese_ui_folder: PathBuf,
    pub export_folder: PathBuf,
    pub error_file: PathBuf,
}

impl PathsConfig {
    /// Default layout below `root`
    pub fn rooted_at(root: &Path) -> Self {
        let cache_folder = root.join("Caches");
        Self {
            database_file: cache_folder.join("TranslationData.json"),
            jp_cache_file: cache_folder.join("JpCache.json"),
            cache_folder,
            japanese_script_folder: root.join("Scripts").join("Japanese"),
            japanese_ui_folder: root.join("UI").join("Japanese"),
            export_folder: root.join("Scripts").join("i18nEx").join("English").join("Script"),
            error_file: root.join("Errors.txt"),
        }
    }

    /// Folder holding per-script subtitle files
    pub fn subtitle_folder(&self) -> PathBuf {
        self.cache_folder.join("Subtitles")
    }

    fn entries(&self) -> [(&'static str, &Path); 7] {
        [
            ("cache_folder", self.cache_folder.as_path()),
            ("database_file", self.database_file.as_path()),
            ("jp_cache_file", self.jp_cache_file.as_path()),
            ("japanese_script_folder", self.japanese_script_folder.as_path()),
            ("japanese_ui_folder", self.japanese_ui_folder.as_path()),
            ("export_folder", self.export_folder.as_path()),
            ("error_file", self.error_file.as_path()),
        ]
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self::rooted_at(Path::new(""))
    }
}

/// Export settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ExportConfig {
    #[serde(default)]
    pub format: ExportFormat,

    /// Leave official translations out of the export
    #[serde(default)]
    pub safe_export: bool,
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    /// Never contact a backend; resolve from memory only
    #[serde(default)]
    pub offline: bool,

    /// Seconds the readiness probe waits for each backend
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Backends in order of preference
    #[serde(default = "default_available_providers")]
    pub available_providers: Vec<ProviderConfig>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            offline: false,
            probe_timeout_secs: default_probe_timeout_secs(),
            available_providers: default_available_providers(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
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
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_autosave_interval_secs() -> u64 {
    12 * 60
}

fn default_probe_timeout_secs() -> u64 {
    10
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.5
}

fn default_top_p() -> f32 {
    0.9
}

fn default_repetition_penalty() -> f32 {
    1.1
}

fn default_sugoi_endpoint() -> String {
    "http://127.0.0.1:14366/".to_string()
}

fn default_chat_endpoint() -> String {
    "http://127.0.0.1:1234/v1/chat/completions".to_string()
}

fn default_chat_model() -> String {
    "sugoi14b".to_string()
}

fn default_available_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(TranslationProvider::Sugoi),
        ProviderConfig::new(TranslationProvider::Chat),
    ]
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open config file: {:?}", path))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Write this configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        crate::file_utils::FileManager::write_to_file(path, &json)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.autosave_interval_secs == 0 {
            return Err(anyhow!("autosave_interval_secs must be greater than zero"));
        }
        if self.translation.probe_timeout_secs == 0 {
            return Err(anyhow!("probe_timeout_secs must be greater than zero"));
        }

        for (name, path) in self.paths.entries() {
            if path.as_os_str().is_empty() {
                return Err(anyhow!("Path '{}' must not be empty", name));
            }
        }

        for provider in &self.translation.available_providers {
            let url = Url::parse(&provider.endpoint).with_context(|| {
                format!("Invalid {} endpoint: '{}'", provider.provider_type.display_name(), provider.endpoint)
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(anyhow!("Endpoint must use http or https: {}", provider.endpoint));
            }
            if provider.provider_type == TranslationProvider::Chat && provider.model.trim().is_empty() {
                return Err(anyhow!("A model name is required for the chat completion provider"));
            }
            if provider.timeout_secs == 0 {
                return Err(anyhow!("timeout_secs must be greater than zero for {}", provider.endpoint));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            paths: PathsConfig::default(),
            export: ExportConfig::default(),
            translation: TranslationConfig::default(),
            autosave_interval_secs: default_autosave_interval_secs(),
            log_level: LogLevel::default(),
        }
    }
}
