//! Host based provider selection
//!
//! The registry is the entry point for callers holding a raw repository URL:
//! it picks the adapter serving the URL's host, parses the URL with that
//! adapter's grammar and resolves pull request references.

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{GitProviderType, ProviderConfig, ProvidersConfig};
use crate::errors::{GitProviderError, Result};
use crate::providers::base::{self, RepositoryContextRequest};
use crate::providers::{GitHubProvider, GitProvider, GiteaProvider, Repository, StaticGitContext};

/// Configured providers, looked up by host
#[derive(Default, Clone)]
pub struct GitProviderRegistry {
    providers: Vec<Arc<dyn GitProvider>>,
}

impl GitProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an adapter for a single configured host
    pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn GitProvider>> {
        let provider: Arc<dyn GitProvider> = match config.provider {
            GitProviderType::Gitea => Arc::new(GiteaProvider::new(config)?),
            GitProviderType::GitHub => Arc::new(GitHubProvider::new(config)?),
        };
        Ok(provider)
    }

    pub fn from_config(config: &ProvidersConfig) -> Result<Self> {
        let mut registry = Self::new();
        for provider_config in &config.providers {
            registry.register(Self::create_provider(provider_config)?);
        }

        info!(
            providers = registry.providers.len(),
            "Initialized git provider registry"
        );
        Ok(registry)
    }

    /// Add a provider, replacing any provider already serving the same host
    pub fn register(&mut self, provider: Arc<dyn GitProvider>) {
        self.providers
            .retain(|existing| !existing.host().eq_ignore_ascii_case(provider.host()));
        debug!(host = %provider.host(), provider = %provider.provider_type(), "Registered git provider");
        self.providers.push(provider);
    }

    pub fn providers(&self) -> &[Arc<dyn GitProvider>] {
        &self.providers
    }

    pub fn provider_for_host(&self, host: &str) -> Result<Arc<dyn GitProvider>> {
        self.providers
            .iter()
            .find(|p| p.host().eq_ignore_ascii_case(host))
            .cloned()
            .ok_or_else(|| GitProviderError::UnsupportedHost(host.to_string()))
    }

    pub fn provider_for_url(&self, repo_url: &str) -> Result<Arc<dyn GitProvider>> {
        let host = base::url_host(repo_url)
            .ok_or_else(|| GitProviderError::invalid_url(repo_url, "cannot determine host"))?;

        self.providers
            .iter()
            .find(|p| p.can_handle(repo_url))
            .cloned()
            .ok_or(GitProviderError::UnsupportedHost(host))
    }

    /// Parse a URL and resolve a referenced pull request onto its head branch
    pub async fn resolve_url(&self, repo_url: &str) -> Result<StaticGitContext> {
        let provider = self.provider_for_url(repo_url)?;
        let ctx = provider.parse_static_git_context(repo_url)?;
        provider.get_pr_context(&ctx).await
    }

    /// Full repository location for a user supplied URL, commit pinned
    pub async fn repository_context(
        &self,
        request: &RepositoryContextRequest,
    ) -> Result<Repository> {
        let provider = self.provider_for_url(&request.url)?;
        base::get_repository_context(provider.as_ref(), request).await
    }

    /// Browsable URL for a repository, rendered by the provider serving its source
    pub fn render_url(&self, repository: &Repository) -> Result<String> {
        let provider = self.provider_for_host(&repository.source)?;
        Ok(provider.get_url_from_repository(repository))
    }
}
