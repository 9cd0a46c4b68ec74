use anyhow::Context;
use clap::Args;
use colored::Colorize;
use repolink_git::{GitProvider, Repository, RepositoryContextRequest};
use tracing::info;

use super::{print_json, print_repository, ProviderArgs};

#[derive(Args)]
pub struct ResolveCommand {
    /// Repository URL (https, ssh or scp-like)
    pub url: String,

    #[command(flatten)]
    pub provider: ProviderArgs,
}

impl ResolveCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let registry = self.provider.registry_for_url(&self.url)?;

        let rt = tokio::runtime::Runtime::new()?;
        let ctx = rt
            .block_on(registry.resolve_url(&self.url))
            .with_context(|| format!("Failed to resolve {}", self.url))?;

        if self.provider.json {
            return print_json(&ctx);
        }
        print_repository("Resolved location", &Repository::from(ctx));
        Ok(())
    }
}

#[derive(Args)]
pub struct ContextCommand {
    /// Repository URL (https, ssh or scp-like)
    pub url: String,

    /// Use this branch instead of the one in the URL
    #[arg(long)]
    pub branch: Option<String>,

    /// Pin this commit instead of looking up the newest one
    #[arg(long)]
    pub sha: Option<String>,

    /// Sub-path inside the repository
    #[arg(long)]
    pub path: Option<String>,

    #[command(flatten)]
    pub provider: ProviderArgs,
}

impl ContextCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let registry = self.provider.registry_for_url(&self.url)?;

        let request = RepositoryContextRequest {
            url: self.url.clone(),
            branch: self.branch.clone(),
            sha: self.sha.clone(),
            path: self.path.clone(),
        };

        let rt = tokio::runtime::Runtime::new()?;
        let repo = rt
            .block_on(registry.repository_context(&request))
            .with_context(|| format!("Failed to build repository context for {}", self.url))?;

        info!(owner = %repo.owner, repo = %repo.id, "Repository context ready");

        if self.provider.json {
            return print_json(&repo);
        }
        print_repository("Repository context", &repo);
        if repo.sha.is_none() {
            println!("{}", "No commits found on this branch.".bright_yellow());
            println!();
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct LastCommitCommand {
    /// Repository URL; pull request links use the PR's head branch
    pub url: String,

    #[command(flatten)]
    pub provider: ProviderArgs,
}

impl LastCommitCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let registry = self.provider.registry_for_url(&self.url)?;
        let provider = registry.provider_for_url(&self.url)?;

        let rt = tokio::runtime::Runtime::new()?;
        let sha = rt
            .block_on(async {
                let ctx = registry.resolve_url(&self.url).await?;
                provider.get_last_commit_sha(&ctx).await
            })
            .with_context(|| format!("Failed to look up the last commit of {}", self.url))?;

        let sha = Some(sha).filter(|s| !s.is_empty());
        if self.provider.json {
            return print_json(&serde_json::json!({ "sha": sha }));
        }

        match sha {
            Some(sha) => println!("{}", sha),
            None => println!("{}", "No commits found.".bright_yellow()),
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct RenderCommand {
    /// Repository URL to normalize
    pub url: String,

    /// Render this branch instead of the one in the URL
    #[arg(long, conflicts_with = "commit")]
    pub branch: Option<String>,

    /// Render a link to this commit
    #[arg(long)]
    pub commit: Option<String>,

    /// Sub-path inside the repository
    #[arg(long)]
    pub path: Option<String>,

    #[command(flatten)]
    pub provider: ProviderArgs,
}

impl RenderCommand {
    /// Parse the URL with the host's grammar and render it back; no request is made
    fn render(&self) -> anyhow::Result<String> {
        let registry = self.provider.registry_for_url(&self.url)?;
        let provider = registry.provider_for_url(&self.url)?;

        let mut repo = Repository::from(provider.parse_static_git_context(&self.url)?);
        if let Some(branch) = &self.branch {
            repo.branch = Some(branch.clone());
            repo.sha = None;
        }
        if let Some(commit) = &self.commit {
            repo.branch = Some(commit.clone());
            repo.sha = Some(commit.clone());
        }
        if let Some(path) = self.path.as_deref().map(|p| p.trim_matches('/')) {
            repo.path = Some(path.to_string()).filter(|p| !p.is_empty());
        }

        Ok(provider.get_url_from_repository(&repo))
    }

    pub fn execute(self) -> anyhow::Result<()> {
        let url = self.render()?;
        if self.provider.json {
            return print_json(&serde_json::json!({ "url": url }));
        }
        println!("{}", url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(url: &str, branch: Option<&str>, commit: Option<&str>, path: Option<&str>) -> String {
        RenderCommand {
            url: url.to_string(),
            branch: branch.map(str::to_string),
            commit: commit.map(str::to_string),
            path: path.map(str::to_string),
            provider: ProviderArgs {
                config: None,
                token: None,
                json: false,
            },
        }
        .render()
        .unwrap()
    }

    #[test]
    fn test_render_normalizes_github_blob_url() {
        assert_eq!(
            render("https://github.com/rust-lang/cargo/blob/master/src", None, None, None),
            "https://github.com/rust-lang/cargo/tree/master/src"
        );
    }

    #[test]
    fn test_render_commit_override() {
        assert_eq!(
            render("git@gitea.com:gitea/tea.git", None, Some("abc123"), None),
            "https://gitea.com/gitea/tea/src/commit/abc123"
        );
    }

    #[test]
    fn test_render_path_without_branch_uses_main() {
        assert_eq!(
            render("https://gitea.com/gitea/tea", None, None, Some("/docs/")),
            "https://gitea.com/gitea/tea/src/branch/main/docs"
        );
    }
}
