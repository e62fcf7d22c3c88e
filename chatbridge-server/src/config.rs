use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use chatbridge_core::ChatbridgeError;
use chatbridge_llm::{GatewayClient, OllamaClient, ProviderRegistry};

pub const OLLAMA_BASE_URL: &str = "OLLAMA_BASE_URL";
pub const OLLAMA_API_KEY: &str = "OLLAMA_API_KEY";
pub const AI_GATEWAY_API_KEY: &str = "AI_GATEWAY_API_KEY";
pub const AI_GATEWAY_BASE_URL: &str = "AI_GATEWAY_BASE_URL";
pub const FEATURE_TWO_FACTOR_AUTH: &str = "FEATURE_TWO_FACTOR_AUTH";
pub const FEATURE_GUEST_ACCOUNTS: &str = "FEATURE_GUEST_ACCOUNTS";

#[derive(Clone, Default)]
pub struct ServerConfig {
    pub ollama_base_url: Option<String>,
    pub ollama_api_key: Option<SecretString>,
    pub gateway_api_key: Option<SecretString>,
    pub gateway_base_url: Option<String>,
    pub two_factor_enabled: bool,
    pub guest_accounts_enabled: bool,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |secret: &Option<SecretString>| secret.as_ref().map(|_| "<redacted>");
        f.debug_struct("ServerConfig")
            .field("ollama_base_url", &self.ollama_base_url)
            .field("ollama_api_key", &redact(&self.ollama_api_key))
            .field("gateway_api_key", &redact(&self.gateway_api_key))
            .field("gateway_base_url", &self.gateway_base_url)
            .field("two_factor_enabled", &self.two_factor_enabled)
            .field("guest_accounts_enabled", &self.guest_accounts_enabled)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn flag(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim).map(str::to_ascii_lowercase).as_deref(),
        Some("true" | "1" | "yes" | "on")
    )
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            ollama_base_url: non_empty(lookup(OLLAMA_BASE_URL)),
            ollama_api_key: non_empty(lookup(OLLAMA_API_KEY)).map(SecretString::new),
            gateway_api_key: non_empty(lookup(AI_GATEWAY_API_KEY)).map(SecretString::new),
            gateway_base_url: non_empty(lookup(AI_GATEWAY_BASE_URL)),
            two_factor_enabled: flag(lookup(FEATURE_TWO_FACTOR_AUTH)),
            guest_accounts_enabled: flag(lookup(FEATURE_GUEST_ACCOUNTS)),
        }
    }

    pub fn ollama_configured(&self) -> bool {
        self.ollama_base_url.is_some()
    }

    pub fn build_registry(&self) -> Result<ProviderRegistry, ChatbridgeError> {
        let mut builder = ProviderRegistry::builder();

        if let Some(base_url) = &self.ollama_base_url {
            let mut client = OllamaClient::new(base_url.as_str())?;
            if let Some(api_key) = &self.ollama_api_key {
                client = client.with_api_key(api_key.expose_secret().as_str());
            }
            builder = builder.ollama(client);
        }

        if let Some(api_key) = &self.gateway_api_key {
            let mut client = GatewayClient::new(api_key.expose_secret().as_str())?;
            if let Some(base_url) = &self.gateway_base_url {
                client = client.with_base_url(base_url.as_str())?;
            }
            builder = builder.gateway(client);
        } else {
            tracing::warn!("{AI_GATEWAY_API_KEY} is not set; only ollama- models can be served");
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> ServerConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn blank_values_are_unset() {
        let config = config(&[(OLLAMA_BASE_URL, "  "), (AI_GATEWAY_API_KEY, "")]);
        assert!(!config.ollama_configured());
        assert!(config.gateway_api_key.is_none());
    }

    #[test]
    fn feature_flags_accept_common_truthy_values() {
        let config = config(&[(FEATURE_TWO_FACTOR_AUTH, "TRUE"), (FEATURE_GUEST_ACCOUNTS, "0")]);
        assert!(config.two_factor_enabled);
        assert!(!config.guest_accounts_enabled);
    }

    #[test]
    fn debug_redacts_keys() {
        let config = config(&[(OLLAMA_API_KEY, "sekrit"), (AI_GATEWAY_API_KEY, "gw")]);
        let debug = format!("{config:?}");
        assert!(!debug.contains("sekrit"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn registry_reflects_configured_providers() {
        let registry = config(&[
            (OLLAMA_BASE_URL, "http://localhost:11434"),
            (AI_GATEWAY_API_KEY, "gw"),
        ])
        .build_registry()
        .unwrap();
        assert!(registry.ollama().is_some());
        assert!(registry.gateway().is_some());

        assert!(config(&[(OLLAMA_BASE_URL, "nope")]).build_registry().is_err());
    }
}
