pub mod browse;
pub mod resolve;

pub use browse::{BranchesCommand, NamespacesCommand, PrsCommand, ReposCommand, WhoamiCommand};
pub use resolve::{ContextCommand, LastCommitCommand, RenderCommand, ResolveCommand};

use anyhow::Context;
use clap::Args;
use colored::Colorize;
use repolink_git::providers::base::url_host;
use repolink_git::{GitProviderRegistry, ProvidersConfig, Repository};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// Options shared by every command that talks to a provider
#[derive(Args, Debug, Clone)]
pub struct ProviderArgs {
    /// Provider configuration file (defaults to github.com and gitea.com)
    #[arg(long, env = "REPOLINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Access token for the host being queried
    #[arg(long, env = "REPOLINK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Print JSON instead of human readable output
    #[arg(long)]
    pub json: bool,
}

impl ProviderArgs {
    pub fn load_config(&self) -> anyhow::Result<ProvidersConfig> {
        match &self.config {
            Some(path) => ProvidersConfig::load(path).with_context(|| {
                format!(
                    "Failed to load provider configuration from {}",
                    path.display()
                )
            }),
            None => Ok(ProvidersConfig::default()),
        }
    }

    /// Registry with the command line token applied to `host`
    pub fn registry(&self, host: &str) -> anyhow::Result<GitProviderRegistry> {
        let mut config = self.load_config()?;
        if let Some(token) = self.token.as_deref() {
            debug!(host = %host, "Using token from command line");
            config = config.with_token(host, token);
        }

        GitProviderRegistry::from_config(&config).context("Failed to initialize git providers")
    }

    pub fn registry_for_url(&self, repo_url: &str) -> anyhow::Result<GitProviderRegistry> {
        let host = url_host(repo_url)
            .with_context(|| format!("Cannot determine the host of '{}'", repo_url))?;
        self.registry(&host)
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_field(label: &str, value: Option<&str>) {
    match value {
        Some(value) => println!("  {} {}", format!("{}:", label).bright_white(), value),
        None => println!(
            "  {} {}",
            format!("{}:", label).bright_white(),
            "-".dimmed()
        ),
    }
}

pub fn print_repository(title: &str, repo: &Repository) {
    println!();
    println!("{}", title.bright_white().bold());
    print_field("Source", Some(&repo.source));
    print_field("Owner", Some(&repo.owner));
    print_field("Repository", Some(&repo.name));
    print_field("Clone URL", Some(&repo.url));
    print_field("Branch", repo.branch.as_deref());
    print_field("Commit", repo.sha.as_deref());
    print_field("Path", repo.path.as_deref());
    let pr_number = repo.pr_number.map(|n| format!("#{}", n));
    print_field("Pull request", pr_number.as_deref());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use repolink_git::{GitProvider, GitProviderType};
    use std::io::Write;

    fn args(config: Option<PathBuf>) -> ProviderArgs {
        ProviderArgs {
            config,
            token: Some("secret".to_string()),
            json: false,
        }
    }

    #[test]
    fn test_registry_defaults_without_config_file() {
        let registry = args(None).registry("github.com").unwrap();

        assert!(registry.provider_for_host("github.com").is_ok());
        assert!(registry.provider_for_host("gitea.com").is_ok());
    }

    #[test]
    fn test_registry_from_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "providers:\n  - provider: gitea\n    host: code.internal"
        )
        .unwrap();

        let registry = args(Some(file.path().to_path_buf()))
            .registry_for_url("https://code.internal/team/app")
            .unwrap();

        let provider = registry.provider_for_host("code.internal").unwrap();
        assert_eq!(provider.provider_type(), GitProviderType::Gitea);
        assert!(registry.provider_for_host("github.com").is_err());
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = args(Some(dir.path().join("missing.yaml")))
            .registry("github.com")
            .err()
            .unwrap();

        assert!(err
            .to_string()
            .starts_with("Failed to load provider configuration"));
    }
}
