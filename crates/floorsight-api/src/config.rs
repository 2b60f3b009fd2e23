use floorsight_advisor::{PipelineSettings, PromptTemplates};
use floorsight_core::config::LayeredConfig;
use floorsight_core::loader::DataLayout;
use floorsight_core::Result;
use std::path::PathBuf;
use std::time::Duration;

/// API server configuration resolved from the layered config
#[derive(Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origin: Option<String>,
    pub data_layout: DataLayout,
    pub api_key: String,
    pub model: String,
    pub model_url: String,
    pub timeout: Duration,
    pub cooldown: Duration,
    pub exchange_log: Option<PathBuf>,
    pub templates: PromptTemplates,
}

impl ApiConfig {
    /// Load defaults, then the discovered config file, then environment variables
    pub fn load() -> Result<Self> {
        let config = LayeredConfig::with_defaults().load_from_discovered_file(None)?.load_from_env();
        Self::from_layered(&config)
    }

    /// Resolve the server settings. Fails when no api key was supplied.
    pub fn from_layered(config: &LayeredConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();

        Ok(Self {
            port: config.port.value,
            cors_origin: config.cors_origin.value.clone(),
            data_layout: config.data_layout(),
            api_key,
            model: config.model.value.clone(),
            model_url: config.model_url.value.clone(),
            timeout: config.timeout(),
            cooldown: config.cooldown(),
            exchange_log: config.exchange_log.value.clone(),
            templates: PromptTemplates::from_config(
                config.stage_one_prompt.value.clone(),
                config.stage_two_prompt.value.clone(),
            ),
        })
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings::default()
            .with_cooldown(self.cooldown)
            .with_call_timeout(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorsight_core::config::ConfigSource;
    use floorsight_core::FloorsightError;

    #[test]
    fn test_requires_api_key() {
        let config = LayeredConfig::with_defaults();
        let result = ApiConfig::from_layered(&config);
        assert!(matches!(result, Err(FloorsightError::ConfigMissing { .. })));
    }

    #[test]
    fn test_from_layered() {
        let mut config = LayeredConfig::with_defaults();
        config.api_key.update(Some("key".to_string()), ConfigSource::Environment);
        config.cooldown_ms.update(0, ConfigSource::File);
        config.stage_two_prompt.update(Some("Answer briefly.".to_string()), ConfigSource::File);

        let api = ApiConfig::from_layered(&config).unwrap();
        assert_eq!(api.bind_address(), "0.0.0.0:8000");
        assert_eq!(api.pipeline_settings().cooldown, Duration::ZERO);
        assert_eq!(api.pipeline_settings().call_timeout, Duration::from_secs(120));
        assert_eq!(api.templates.stage_two(), "Answer briefly.");
        assert!(api.cors_origin.is_none());
    }
}
