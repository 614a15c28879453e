//! Provider Factory
//!
//! Stateless selection of an agent provider from explicit configuration.
//! Configuration is a plain value passed to the factory; there is no
//! process-wide mutable settings object. Callers either build an
//! [`AgentConfig`] themselves or load one from the environment.

use crate::agent::LearnieAgent;
use crate::error::AgentError;
use crate::openai_agent::OpenAiLearnieAgent;
use crate::remote_agent::RemoteLearnieAgent;
use std::str::FromStr;

/// Supported agent back ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    /// Direct chat completions against an OpenAI-compatible API.
    OpenAi,
    /// Session-based remote agent service, delegating to OpenAI for
    /// tightly-templated operations.
    Remote,
}

impl FromStr for ProviderKind {
    type Err = AgentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "remote" => Ok(Self::Remote),
            other => Err(AgentError::Configuration(format!(
                "Unknown provider kind: {other}"
            ))),
        }
    }
}

/// Everything needed to construct a provider, passed explicitly.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    /// Chat model override; the provider default applies when `None`.
    pub model: Option<String>,
    /// Base URL of the remote agent service. Required for
    /// [`ProviderKind::Remote`], ignored otherwise.
    pub agent_base_url: Option<String>,
}

impl AgentConfig {
    /// Loads an agent configuration from environment variables:
    /// `AGENT_PROVIDER` (default `openai`), `OPENAI_API_KEY` (required),
    /// `CHAT_MODEL`, and `AGENT_BASE_URL`.
    pub fn from_env() -> Result<Self, AgentError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let provider = std::env::var("AGENT_PROVIDER")
            .unwrap_or_else(|_| "openai".to_string())
            .parse::<ProviderKind>()?;

        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            AgentError::Configuration("Missing environment variable: OPENAI_API_KEY".to_string())
        })?;

        let model = std::env::var("CHAT_MODEL").ok();
        let agent_base_url = std::env::var("AGENT_BASE_URL").ok();

        Ok(Self {
            provider,
            api_key,
            model,
            agent_base_url,
        })
    }
}

/// Builds a ready-to-use provider for the configured kind.
pub fn create_agent(config: &AgentConfig) -> Result<Box<dyn LearnieAgent>, AgentError> {
    let direct = OpenAiLearnieAgent::new(&config.api_key, config.model.clone())?;
    match config.provider {
        ProviderKind::OpenAi => Ok(Box::new(direct)),
        ProviderKind::Remote => {
            let base_url = config.agent_base_url.as_deref().ok_or_else(|| {
                AgentError::Configuration(
                    "AGENT_BASE_URL must be set for 'remote' provider".to_string(),
                )
            })?;
            Ok(Box::new(RemoteLearnieAgent::new(base_url, direct)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("AGENT_PROVIDER");
            env::remove_var("OPENAI_API_KEY");
            env::remove_var("CHAT_MODEL");
            env::remove_var("AGENT_BASE_URL");
        }
    }

    #[test]
    fn provider_kind_parses_known_values() {
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("Remote".parse::<ProviderKind>().unwrap(), ProviderKind::Remote);
    }

    #[test]
    fn provider_kind_rejects_unknown_values() {
        let err = "anthropic".parse::<ProviderKind>().unwrap_err();
        assert!(matches!(err, AgentError::Configuration(_)));
        assert!(err.to_string().contains("anthropic"));
    }

    #[test]
    fn creates_direct_provider() {
        let config = AgentConfig {
            provider: ProviderKind::OpenAi,
            api_key: "sk-test".to_string(),
            model: None,
            agent_base_url: None,
        };
        assert!(create_agent(&config).is_ok());
    }

    #[test]
    fn remote_provider_requires_base_url() {
        let config = AgentConfig {
            provider: ProviderKind::Remote,
            api_key: "sk-test".to_string(),
            model: None,
            agent_base_url: None,
        };
        let err = create_agent(&config).err().unwrap();
        assert!(matches!(err, AgentError::Configuration(_)));

        let config = AgentConfig {
            agent_base_url: Some("http://localhost:8000".to_string()),
            ..config
        };
        assert!(create_agent(&config).is_ok());
    }

    #[test]
    fn bad_credential_fails_before_any_network_call() {
        let config = AgentConfig {
            provider: ProviderKind::OpenAi,
            api_key: "not-a-key".to_string(),
            model: None,
            agent_base_url: None,
        };
        assert!(matches!(
            create_agent(&config),
            Err(AgentError::Configuration(_))
        ));
    }

    #[test]
    #[serial]
    fn from_env_minimal() {
        clear_env_vars();
        unsafe {
            env::set_var("OPENAI_API_KEY", "sk-test");
        }

        let config = AgentConfig::from_env().expect("Config should load successfully");
        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, None);
        assert_eq!(config.agent_base_url, None);
    }

    #[test]
    #[serial]
    fn from_env_remote_with_overrides() {
        clear_env_vars();
        unsafe {
            env::set_var("AGENT_PROVIDER", "remote");
            env::set_var("OPENAI_API_KEY", "sk-test");
            env::set_var("CHAT_MODEL", "gpt-4.1-mini");
            env::set_var("AGENT_BASE_URL", "http://localhost:8000");
        }

        let config = AgentConfig::from_env().expect("Config should load successfully");
        assert_eq!(config.provider, ProviderKind::Remote);
        assert_eq!(config.model, Some("gpt-4.1-mini".to_string()));
        assert_eq!(config.agent_base_url, Some("http://localhost:8000".to_string()));
    }

    #[test]
    #[serial]
    fn from_env_missing_api_key() {
        clear_env_vars();

        let err = AgentConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    #[serial]
    fn from_env_unknown_provider() {
        clear_env_vars();
        unsafe {
            env::set_var("AGENT_PROVIDER", "llama");
            env::set_var("OPENAI_API_KEY", "sk-test");
        }

        let err = AgentConfig::from_env().unwrap_err();
        assert!(matches!(err, AgentError::Configuration(_)));
    }
}
