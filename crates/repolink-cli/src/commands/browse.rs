use anyhow::Context;
use clap::Args;
use colored::Colorize;
use repolink_git::{GitProvider, PERSONAL_NAMESPACE_ID};
use std::sync::Arc;

use super::{print_json, ProviderArgs};

/// Host selection for commands that browse an account
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Git host to query, as configured
    #[arg(long, default_value = "github.com")]
    pub host: String,

    #[command(flatten)]
    pub provider: ProviderArgs,
}

impl TargetArgs {
    fn provider(&self) -> anyhow::Result<Arc<dyn GitProvider>> {
        let registry = self.provider.registry(&self.host)?;
        Ok(registry.provider_for_host(&self.host)?)
    }

    fn json(&self) -> bool {
        self.provider.json
    }
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}

#[derive(Args)]
pub struct WhoamiCommand {
    #[command(flatten)]
    pub target: TargetArgs,
}

impl WhoamiCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let provider = self.target.provider()?;
        let user = runtime()?
            .block_on(provider.get_user())
            .with_context(|| format!("Failed to fetch the current user on {}", self.target.host))?;

        if self.target.json() {
            return print_json(&user);
        }

        println!(
            "{} {} ({})",
            user.username.bright_cyan().bold(),
            user.name,
            user.email
        );
        Ok(())
    }
}

#[derive(Args)]
pub struct NamespacesCommand {
    #[command(flatten)]
    pub target: TargetArgs,
}

impl NamespacesCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let provider = self.target.provider()?;
        let namespaces = runtime()?
            .block_on(provider.get_namespaces())
            .with_context(|| format!("Failed to list namespaces on {}", self.target.host))?;

        if self.target.json() {
            return print_json(&namespaces);
        }

        for namespace in &namespaces {
            if namespace.is_personal() {
                println!(
                    "{} {}",
                    namespace.name.bright_cyan(),
                    "(personal)".dimmed()
                );
            } else {
                println!("{}", namespace.name);
            }
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct ReposCommand {
    /// Namespace to list; the personal namespace by default
    #[arg(long, default_value = PERSONAL_NAMESPACE_ID)]
    pub namespace: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

impl ReposCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let provider = self.target.provider()?;
        let repos = runtime()?
            .block_on(provider.get_repositories(&self.namespace))
            .with_context(|| format!("Failed to list repositories of {}", self.namespace))?;

        if self.target.json() {
            return print_json(&repos);
        }

        if repos.is_empty() {
            println!("{}", "No repositories found.".bright_yellow());
            return Ok(());
        }
        for repo in &repos {
            println!(
                "{}/{}  {}",
                repo.owner.dimmed(),
                repo.name.bright_white().bold(),
                repo.url.dimmed()
            );
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct BranchesCommand {
    /// Repository name
    pub repository: String,

    /// Owning namespace; the personal namespace by default
    #[arg(long, default_value = PERSONAL_NAMESPACE_ID)]
    pub namespace: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

impl BranchesCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let provider = self.target.provider()?;
        let branches = runtime()?
            .block_on(provider.get_repo_branches(&self.repository, &self.namespace))
            .with_context(|| format!("Failed to list branches of {}", self.repository))?;

        if self.target.json() {
            return print_json(&branches);
        }

        for branch in &branches {
            println!(
                "{}  {}",
                branch.name.bright_white(),
                branch.sha.as_deref().unwrap_or("-").dimmed()
            );
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct PrsCommand {
    /// Repository name
    pub repository: String,

    /// Owning namespace; the personal namespace by default
    #[arg(long, default_value = PERSONAL_NAMESPACE_ID)]
    pub namespace: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

impl PrsCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let provider = self.target.provider()?;
        let prs = runtime()?
            .block_on(provider.get_repo_prs(&self.repository, &self.namespace))
            .with_context(|| format!("Failed to list pull requests of {}", self.repository))?;

        if self.target.json() {
            return print_json(&prs);
        }

        if prs.is_empty() {
            println!("{}", "No open pull requests.".bright_yellow());
            return Ok(());
        }
        for pr in &prs {
            println!("{}", pr.name.bright_white().bold());
            println!(
                "  {} {}/{}:{} @ {}",
                "from".dimmed(),
                pr.source_repo_owner,
                pr.source_repo_name,
                pr.branch.bright_cyan(),
                pr.sha.dimmed()
            );
        }
        Ok(())
    }
}
