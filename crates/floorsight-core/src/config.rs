use crate::error::{FloorsightError, Result};
use crate::loader::DataLayout;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "floorsight.toml";

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

pub const DEFAULT_MODEL_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for Floorsight
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub api_key: ConfigValue<Option<String>>,
    pub model: ConfigValue<String>,
    pub model_url: ConfigValue<String>,
    pub data_dir: ConfigValue<PathBuf>,
    pub site_map_image: ConfigValue<String>,
    pub port: ConfigValue<u16>,
    pub cors_origin: ConfigValue<Option<String>>,
    pub timeout_secs: ConfigValue<u64>,
    pub cooldown_ms: ConfigValue<u64>,
    pub exchange_log: ConfigValue<Option<PathBuf>>,
    /// Replacement for the built-in stage-1 template
    pub stage_one_prompt: ConfigValue<Option<String>>,
    /// Replacement for the built-in stage-2 template
    pub stage_two_prompt: ConfigValue<Option<String>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            api_key: ConfigValue::new(None, ConfigSource::Default),
            model: ConfigValue::new(DEFAULT_MODEL.to_string(), ConfigSource::Default),
            model_url: ConfigValue::new(DEFAULT_MODEL_URL.to_string(), ConfigSource::Default),
            data_dir: ConfigValue::new(PathBuf::from("data"), ConfigSource::Default),
            site_map_image: ConfigValue::new("map.JPG".to_string(), ConfigSource::Default),
            port: ConfigValue::new(8000, ConfigSource::Default),
            cors_origin: ConfigValue::new(None, ConfigSource::Default),
            timeout_secs: ConfigValue::new(120, ConfigSource::Default),
            cooldown_ms: ConfigValue::new(3000, ConfigSource::Default),
            exchange_log: ConfigValue::new(None, ConfigSource::Default),
            stage_one_prompt: ConfigValue::new(None, ConfigSource::Default),
            stage_two_prompt: ConfigValue::new(None, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| FloorsightError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| FloorsightError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(api_key) = file_config.api_key {
            self.api_key.update(Some(api_key), ConfigSource::File);
        }

        if let Some(model) = file_config.model {
            self.model.update(model, ConfigSource::File);
        }

        if let Some(model_url) = file_config.model_url {
            self.model_url.update(model_url, ConfigSource::File);
        }

        if let Some(data_dir) = file_config.data_dir {
            self.data_dir.update(data_dir, ConfigSource::File);
        }

        if let Some(site_map_image) = file_config.site_map_image {
            self.site_map_image.update(site_map_image, ConfigSource::File);
        }

        if let Some(port) = file_config.port {
            self.port.update(port, ConfigSource::File);
        }

        if let Some(cors_origin) = file_config.cors_origin {
            self.cors_origin.update(Some(cors_origin), ConfigSource::File);
        }

        if let Some(timeout_secs) = file_config.timeout_secs {
            self.timeout_secs.update(timeout_secs, ConfigSource::File);
        }

        if let Some(cooldown_ms) = file_config.cooldown_ms {
            self.cooldown_ms.update(cooldown_ms, ConfigSource::File);
        }

        if let Some(exchange_log) = file_config.exchange_log {
            self.exchange_log.update(Some(exchange_log), ConfigSource::File);
        }

        if let Some(prompt) = file_config.stage_one_prompt {
            self.stage_one_prompt.update(Some(prompt), ConfigSource::File);
        }

        if let Some(prompt) = file_config.stage_two_prompt {
            self.stage_two_prompt.update(Some(prompt), ConfigSource::File);
        }

        Ok(self)
    }

    /// Load from `explicit` if given, else from `FLOORSIGHT_CONFIG`, else from
    /// `floorsight.toml` when it exists. Missing implicit files are not an error.
    pub fn load_from_discovered_file(self, explicit: Option<&Path>) -> Result<Self> {
        match discover_config_file(explicit) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config file");
                self.load_from_file(path)
            }
            None => Ok(self),
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // FLOORSIGHT_API_KEY, then GEMINI_API_KEY
        if let Some(api_key) = env::var("FLOORSIGHT_API_KEY")
            .ok()
            .or_else(|| env::var("GEMINI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
        {
            self.api_key.update(Some(api_key), ConfigSource::Environment);
        }

        if let Ok(model) = env::var("FLOORSIGHT_MODEL") {
            self.model.update(model, ConfigSource::Environment);
        }

        if let Ok(model_url) = env::var("FLOORSIGHT_MODEL_URL") {
            self.model_url.update(model_url, ConfigSource::Environment);
        }

        if let Ok(data_dir) = env::var("FLOORSIGHT_DATA_DIR") {
            self.data_dir.update(PathBuf::from(data_dir), ConfigSource::Environment);
        }

        // FLOORSIGHT_PORT
        if let Ok(port_str) = env::var("FLOORSIGHT_PORT") {
            match port_str.parse::<u16>() {
                Ok(port) => self.port.update(port, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid FLOORSIGHT_PORT value '{}': expected a port number",
                    port_str
                ),
            }
        }

        if let Ok(origin) = env::var("FLOORSIGHT_CORS_ORIGIN") {
            self.cors_origin.update(Some(origin), ConfigSource::Environment);
        }

        // FLOORSIGHT_TIMEOUT_SECS
        if let Ok(timeout_str) = env::var("FLOORSIGHT_TIMEOUT_SECS") {
            match timeout_str.parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs.update(secs, ConfigSource::Environment),
                _ => tracing::warn!(
                    "Invalid FLOORSIGHT_TIMEOUT_SECS value '{}': expected a positive integer",
                    timeout_str
                ),
            }
        }

        // FLOORSIGHT_COOLDOWN_MS
        if let Ok(cooldown_str) = env::var("FLOORSIGHT_COOLDOWN_MS") {
            match cooldown_str.parse::<u64>() {
                Ok(ms) => self.cooldown_ms.update(ms, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid FLOORSIGHT_COOLDOWN_MS value '{}': expected milliseconds",
                    cooldown_str
                ),
            }
        }

        if let Ok(path) = env::var("FLOORSIGHT_EXCHANGE_LOG") {
            self.exchange_log.update(Some(PathBuf::from(path)), ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(data_dir) = overrides.data_dir {
            self.data_dir.update(data_dir, ConfigSource::Cli);
        }
    }

    /// The API key, or `ConfigMissing` when none was supplied
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.value.as_deref().ok_or_else(|| FloorsightError::ConfigMissing {
            key: "api_key (FLOORSIGHT_API_KEY or GEMINI_API_KEY)".to_string(),
        })
    }

    /// Where the startup assets live
    pub fn data_layout(&self) -> DataLayout {
        DataLayout::new(&self.data_dir.value).with_site_map_image(&self.site_map_image.value)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.value)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms.value)
    }

    /// Server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port.value)
    }

    /// Get all configuration values as a map for inspection. The API key is masked.
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        let api_key = match &self.api_key.value {
            Some(key) => mask_secret(key),
            None => "(not set)".to_string(),
        };
        map.insert("api_key".to_string(), (api_key, self.api_key.source));

        map.insert("model".to_string(), (self.model.value.clone(), self.model.source));
        map.insert(
            "model_url".to_string(),
            (self.model_url.value.clone(), self.model_url.source),
        );
        map.insert(
            "data_dir".to_string(),
            (self.data_dir.value.display().to_string(), self.data_dir.source),
        );
        map.insert(
            "site_map_image".to_string(),
            (self.site_map_image.value.clone(), self.site_map_image.source),
        );
        map.insert("port".to_string(), (self.port.value.to_string(), self.port.source));
        map.insert(
            "cors_origin".to_string(),
            (
                self.cors_origin.value.clone().unwrap_or_else(|| "(not set)".to_string()),
                self.cors_origin.source,
            ),
        );
        map.insert(
            "timeout_secs".to_string(),
            (self.timeout_secs.value.to_string(), self.timeout_secs.source),
        );
        map.insert(
            "cooldown_ms".to_string(),
            (self.cooldown_ms.value.to_string(), self.cooldown_ms.source),
        );
        map.insert(
            "exchange_log".to_string(),
            (
                self.exchange_log
                    .value
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(disabled)".to_string()),
                self.exchange_log.source,
            ),
        );
        map.insert(
            "stage_one_prompt".to_string(),
            (prompt_summary(&self.stage_one_prompt.value), self.stage_one_prompt.source),
        );
        map.insert(
            "stage_two_prompt".to_string(),
            (prompt_summary(&self.stage_two_prompt.value), self.stage_two_prompt.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    api_key: Option<String>,
    model: Option<String>,
    model_url: Option<String>,
    data_dir: Option<PathBuf>,
    site_map_image: Option<String>,
    port: Option<u16>,
    cors_origin: Option<String>,
    timeout_secs: Option<u64>,
    cooldown_ms: Option<u64>,
    exchange_log: Option<PathBuf>,
    stage_one_prompt: Option<String>,
    stage_two_prompt: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub data_dir: Option<PathBuf>,
}

/// Resolve which config file to read, if any
pub fn discover_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = env::var("FLOORSIGHT_CONFIG") {
        return Some(PathBuf::from(path));
    }

    let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
    fallback.exists().then_some(fallback)
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}***", visible)
}

fn prompt_summary(prompt: &Option<String>) -> String {
    match prompt {
        Some(text) => format!("custom ({} chars)", text.chars().count()),
        None => "built-in".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.model.value, "gemini-2.5-pro");
        assert_eq!(config.model.source, ConfigSource::Default);
        assert_eq!(config.port.value, 8000);
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert_eq!(config.cooldown(), Duration::from_secs(3));
        assert!(config.api_key.value.is_none());
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
api_key = "file-key"
model = "gemini-2.5-flash"
data_dir = "/srv/floorsight"
cooldown_ms = 0
stage_one_prompt = "Describe the apartment."
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.require_api_key().unwrap(), "file-key");
        assert_eq!(config.model.value, "gemini-2.5-flash");
        assert_eq!(config.model.source, ConfigSource::File);
        assert_eq!(config.data_dir.value, PathBuf::from("/srv/floorsight"));
        assert_eq!(config.cooldown(), Duration::ZERO);
        assert_eq!(config.stage_one_prompt.value.as_deref(), Some("Describe the apartment."));
        assert!(config.stage_two_prompt.value.is_none());
    }

    #[test]
    fn test_load_from_file_rejects_bad_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(FloorsightError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            data_dir: Some(PathBuf::from("fixtures")),
        });

        assert_eq!(config.data_dir.value, PathBuf::from("fixtures"));
        assert_eq!(config.data_dir.source, ConfigSource::Cli);
        assert_eq!(config.model.source, ConfigSource::Default);
        assert_eq!(config.bind_address(), "0.0.0.0:8000");

        // An absent flag leaves the lower layer in place
        config.update_from_cli(CliConfigOverrides::default());
        assert_eq!(config.data_dir.value, PathBuf::from("fixtures"));
    }

    #[test]
    fn test_inspection_map_masks_api_key() {
        let mut config = LayeredConfig::with_defaults();
        config.api_key.update(Some("AIzaSecretValue".to_string()), ConfigSource::File);
        let map = config.to_inspection_map();

        let (key, source) = &map["api_key"];
        assert_eq!(key, "AIza***");
        assert_eq!(*source, ConfigSource::File);
        assert_eq!(map["stage_one_prompt"].0, "built-in");
        assert_eq!(map["exchange_log"].0, "(disabled)");
    }

    #[test]
    fn test_data_layout_from_config() {
        let config = LayeredConfig::with_defaults();
        let layout = config.data_layout();
        assert_eq!(layout.site_map_image_path(), PathBuf::from("data").join("map.JPG"));
        assert_eq!(layout.design_dir(), PathBuf::from("data").join("design"));
    }
}
