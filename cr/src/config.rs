//! chainroute configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::LlmError;

/// Environment variable overriding the configured model
pub const ENV_MODEL: &str = "LLM_MODEL";

/// Environment variable overriding the configured temperature
pub const ENV_TEMPERATURE: &str = "LLM_TEMPERATURE";

/// Temperature used when none is configured or an override does not parse
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Values a provider falls back to for any field the config leaves unset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDefaults {
    pub model: &'static str,
    pub api_key_env: &'static str,
    pub base_url: &'static str,
}

pub const OPENAI_DEFAULTS: ProviderDefaults = ProviderDefaults {
    model: "gpt-4o-mini",
    api_key_env: "OPENAI_API_KEY",
    base_url: "https://api.openai.com",
};

pub const ANTHROPIC_DEFAULTS: ProviderDefaults = ProviderDefaults {
    model: "claude-sonnet-4-20250514",
    api_key_env: "ANTHROPIC_API_KEY",
    base_url: "https://api.anthropic.com",
};

impl ProviderDefaults {
    /// Defaults for `provider`; unknown names get OpenAI's, `create_client` rejects them anyway
    pub fn for_provider(provider: &str) -> &'static ProviderDefaults {
        match provider {
            "anthropic" => &ANTHROPIC_DEFAULTS,
            _ => &OPENAI_DEFAULTS,
        }
    }
}

/// LLM provider configuration
///
/// `model`, `api-key-env` and `base-url` are optional; when unset they come
/// from the selected provider's [`ProviderDefaults`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("openai" or "anthropic")
    pub provider: String,

    /// Model identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env", skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// API base URL
    #[serde(rename = "base-url", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            api_key_env: None,
            base_url: None,
            max_tokens: 1024,
            timeout_ms: 120_000,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl LlmConfig {
    fn defaults(&self) -> &'static ProviderDefaults {
        ProviderDefaults::for_provider(&self.provider)
    }

    /// Configured model, else the provider's default
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(self.defaults().model)
    }

    /// Configured API key variable, else the provider's default
    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(self.defaults().api_key_env)
    }

    /// Configured base URL without a trailing slash, else the provider's default
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(self.defaults().base_url)
            .trim_end_matches('/')
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String, LlmError> {
        let var = self.api_key_env();
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(LlmError::MissingApiKey(var.to_string())),
        }
    }
}

/// Prompt template lookup configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Extra directory searched before `.chainroute/prompts/` and `prompts/`
    pub dir: Option<PathBuf>,
}

/// Router selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// YAML router definition used instead of the built-in medical triage
    pub definition: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model(), "gpt-4o-mini");
        assert_eq!(config.llm.api_key_env(), "OPENAI_API_KEY");
        assert_eq!(config.llm.base_url(), "https://api.openai.com");
        assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
        assert!(config.prompts.dir.is_none());
        assert!(config.router.definition.is_none());
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  provider: anthropic
  model: claude-sonnet-4-20250514
  api-key-env: MY_API_KEY
  base-url: https://api.example.com
  max-tokens: 2048
  timeout-ms: 60000
  temperature: 0.7

prompts:
  dir: /etc/chainroute/prompts

router:
  definition: routes.yml

log-level: DEBUG
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.model(), "claude-sonnet-4-20250514");
        assert_eq!(config.llm.api_key_env(), "MY_API_KEY");
        assert_eq!(config.llm.base_url(), "https://api.example.com");
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.llm.timeout_ms, 60000);
        assert!((config.llm.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.prompts.dir, Some(PathBuf::from("/etc/chainroute/prompts")));
        assert_eq!(config.router.definition, Some(PathBuf::from("routes.yml")));
        assert_eq!(config.log_level.as_deref(), Some("DEBUG"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: gpt-4o
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model(), "gpt-4o");
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.api_key_env(), "OPENAI_API_KEY");
        assert_eq!(config.llm.max_tokens, 1024);
    }

    #[test]
    fn test_anthropic_provider_alone_gets_anthropic_defaults() {
        let config: Config = serde_yaml::from_str("llm:\n  provider: anthropic\n").unwrap();

        assert_eq!(config.llm.base_url(), "https://api.anthropic.com");
        assert_eq!(config.llm.api_key_env(), "ANTHROPIC_API_KEY");
        assert_eq!(config.llm.model(), "claude-sonnet-4-20250514");
    }

    #[test]
    fn test_explicit_fields_win_over_provider_defaults() {
        let yaml = r#"
llm:
  provider: anthropic
  model: claude-3-5-haiku-latest
  base-url: http://localhost:8080/
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model(), "claude-3-5-haiku-latest");
        assert_eq!(config.llm.base_url(), "http://localhost:8080");
        assert_eq!(config.llm.api_key_env(), "ANTHROPIC_API_KEY");
    }

    #[test]
    fn test_unknown_provider_falls_back_to_openai_defaults() {
        assert_eq!(ProviderDefaults::for_provider("mistral"), &OPENAI_DEFAULTS);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chainroute.yml");
        fs::write(&path, "llm:\n  model: gpt-4.1-mini\nlog-level: WARN\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.llm.model(), "gpt-4.1-mini");
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("WARN"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let path = PathBuf::from("/nonexistent/chainroute.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[(ENV_MODEL, "gpt-4o"), (ENV_TEMPERATURE, "0.9")]));

        assert_eq!(config.llm.model(), "gpt-4o");
        assert!((config.llm.temperature - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_temperature_falls_back() {
        let mut config = Config::default();
        config.llm.temperature = 0.5;
        config.apply_overrides(lookup(&[(ENV_TEMPERATURE, "warm")]));

        assert!((config.llm.temperature - DEFAULT_TEMPERATURE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_blank_model_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[(ENV_MODEL, "  ")]));
        assert_eq!(config.llm.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_missing_api_key() {
        let config = LlmConfig {
            api_key_env: Some("CHAINROUTE_TEST_KEY_THAT_IS_NEVER_SET".to_string()),
            ..Default::default()
        };
        let err = config.api_key().unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey(ref v) if v == "CHAINROUTE_TEST_KEY_THAT_IS_NEVER_SET"));
    }
}
