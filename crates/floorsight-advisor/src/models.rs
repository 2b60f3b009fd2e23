use floorsight_core::error::{FloorsightError, Result};
use floorsight_core::models::Stage;
use floorsight_llm::SamplingParams;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Tunables of an analysis run
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Sampling used for both stages
    pub sampling: SamplingParams,

    /// Pause after stage 1 to stay under the remote rate limit
    pub cooldown: Duration,

    /// Upper bound on each remote call
    pub call_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            sampling: SamplingParams::default(),
            cooldown: Duration::from_secs(3),
            call_timeout: Duration::from_secs(120),
        }
    }
}

impl PipelineSettings {
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}

/// Stage-1 output: adjacency, room layout, and area figures as a JSON object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StructuredLayout(Value);

impl StructuredLayout {
    /// Parse the stage-1 answer. Markdown code fences around the JSON are tolerated.
    pub fn parse(text: &str) -> Result<Self> {
        let body = strip_code_fence(text);
        let value: Value =
            serde_json::from_str(body).map_err(|e| FloorsightError::RemoteInference {
                stage: Stage::StageOne,
                reason: format!("layout is not valid JSON: {}", e),
            })?;

        if !value.is_object() {
            return Err(FloorsightError::RemoteInference {
                stage: Stage::StageOne,
                reason: "layout is not a JSON object".to_string(),
            });
        }

        Ok(Self(value))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Compact JSON for embedding in a prompt
    pub fn to_inline_json(&self) -> String {
        self.0.to_string()
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening fence line
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest.strip_prefix("json").unwrap_or(rest),
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let layout = StructuredLayout::parse(r#"{"tiếp_giáp": {"trên": "hành lang"}}"#).unwrap();
        assert_eq!(layout.as_value()["tiếp_giáp"]["trên"], "hành lang");
    }

    #[test]
    fn test_parse_fenced_json() {
        let layout = StructuredLayout::parse("```json\n{\"bố_cục\": {}}\n```").unwrap();
        assert!(layout.as_value().get("bố_cục").is_some());

        let layout = StructuredLayout::parse("```\n{\"a\": 1}\n```\n").unwrap();
        assert_eq!(layout.to_inline_json(), r#"{"a":1}"#);
    }

    #[test]
    fn test_parse_single_line_fence() {
        let layout = StructuredLayout::parse(r#"```{"a":1}```"#).unwrap();
        assert_eq!(layout.to_inline_json(), r#"{"a":1}"#);

        let layout = StructuredLayout::parse(r#"```json {"bố_cục": {}} ```"#).unwrap();
        assert!(layout.as_value().get("bố_cục").is_some());
    }

    #[test]
    fn test_parse_rejects_prose() {
        let err = StructuredLayout::parse("Căn hộ có hai phòng ngủ.").unwrap_err();
        assert!(matches!(
            err,
            FloorsightError::RemoteInference {
                stage: Stage::StageOne,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(StructuredLayout::parse("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_default_settings() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.cooldown, Duration::from_secs(3));
        assert_eq!(settings.call_timeout, Duration::from_secs(120));
        assert_eq!(settings.sampling.top_k, 40);
    }
}
