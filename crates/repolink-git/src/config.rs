//! Provider configuration (repolink.yaml)
//!
//! Declares which git hosts are known, which adapter serves each of them and
//! the static credentials captured when an adapter is constructed.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::{GitProviderError, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Supported git hosting providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitProviderType {
    Gitea,
    GitHub,
}

impl std::fmt::Display for GitProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitProviderType::Gitea => write!(f, "gitea"),
            GitProviderType::GitHub => write!(f, "github"),
        }
    }
}

impl TryFrom<&str> for GitProviderType {
    type Error = GitProviderError;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "gitea" => Ok(GitProviderType::Gitea),
            "github" | "gh" => Ok(GitProviderType::GitHub),
            _ => Err(GitProviderError::InvalidConfiguration(format!(
                "Unknown provider type: {}",
                value
            ))),
        }
    }
}

impl GitProviderType {
    /// Public host used when the configuration does not name one
    pub fn default_host(&self) -> &'static str {
        match self {
            GitProviderType::Gitea => "gitea.com",
            GitProviderType::GitHub => "github.com",
        }
    }

    /// REST API root for a given host
    pub fn default_api_url(&self, host: &str) -> String {
        match self {
            GitProviderType::Gitea => format!("https://{}/api/v1", host),
            GitProviderType::GitHub if host == "github.com" => {
                "https://api.github.com".to_string()
            }
            // GitHub Enterprise Server
            GitProviderType::GitHub => format!("https://{}/api/v3", host),
        }
    }
}

/// A single configured git host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub provider: GitProviderType,

    /// Host matched against repository URLs (e.g. "gitea.example.com")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// REST API root; derived from the host when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Per-request timeout in seconds (default: 30)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    pub fn new(provider: GitProviderType) -> Self {
        Self {
            provider,
            host: None,
            base_api_url: None,
            token: None,
            timeout_secs: None,
        }
    }

    pub fn host(&self) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| self.provider.default_host().to_string())
    }

    pub fn api_url(&self) -> String {
        match &self.base_api_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => self.provider.default_api_url(&self.host()),
        }
    }

    /// Empty tokens are treated as anonymous access
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

/// Complete configuration structure for repolink.yaml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            providers: vec![
                ProviderConfig::new(GitProviderType::GitHub),
                ProviderConfig::new(GitProviderType::Gitea),
            ],
        }
    }
}

impl ProvidersConfig {
    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ProvidersConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Set the token of every provider serving `host`
    pub fn with_token(mut self, host: &str, token: &str) -> Self {
        for provider in self
            .providers
            .iter_mut()
            .filter(|p| p.host().eq_ignore_ascii_case(host))
        {
            provider.token = Some(token.to_string());
        }
        self
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for provider in &self.providers {
            let host = provider.host();
            if host.is_empty() || host.contains('/') {
                return Err(GitProviderError::InvalidConfiguration(format!(
                    "Invalid host '{}'",
                    host
                )));
            }
            if !seen.insert(host.clone()) {
                return Err(GitProviderError::InvalidConfiguration(format!(
                    "Host '{}' is configured more than once",
                    host
                )));
            }
        }
        Ok(())
    }
}
