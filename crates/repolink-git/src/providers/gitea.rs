//! Gitea provider implementation
//!
//! Talks to the Gitea REST API (`/api/v1`). Works against gitea.com as well as
//! self-hosted instances and Forgejo, which serves the same API.
//!
//! Tokens are created under Settings > Applications and sent as
//! `Authorization: token <token>`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::base::{self, UrlRoutes};
use super::client::{first_page, seg, RestClient};
use super::grammar::{self, Locator, PathRule, Seg, Tail};
use super::traits::GitProvider;
use super::types::{
    Branch, Namespace, PullRequest, Repository, StaticGitContext, User, PERSONAL_NAMESPACE_ID,
};
use crate::config::{GitProviderType, ProviderConfig};
use crate::errors::{GitProviderError, Result};

/// Path grammar of Gitea web URLs, in evaluation order
pub const GITEA_PATH_RULES: &[PathRule] = &[
    PathRule::new(&[Seg::Lit("pulls"), Seg::Ref], Tail::Ignore, Locator::PullRequest),
    PathRule::new(
        &[Seg::Lit("src"), Seg::Lit("branch"), Seg::Ref],
        Tail::Subpath,
        Locator::Branch,
    ),
    PathRule::new(
        &[Seg::Lit("src"), Seg::Lit("commit"), Seg::Ref],
        Tail::Subpath,
        Locator::Commit,
    ),
    PathRule::new(&[Seg::Lit("commit"), Seg::Ref], Tail::Ignore, Locator::Commit),
    PathRule::new(
        &[Seg::Lit("commits"), Seg::Lit("branch"), Seg::Ref],
        Tail::Exact,
        Locator::Branch,
    ),
];

const GITEA_ROUTES: UrlRoutes = UrlRoutes {
    commit: "/src/commit/",
    branch: "/src/branch/",
    fallback_branch: "main",
};

/// Gitea API response structures
#[derive(Debug, Deserialize)]
struct GiteaUser {
    id: i64,
    login: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct GiteaOrganization {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GiteaOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GiteaRepository {
    name: String,
    html_url: String,
    #[serde(default)]
    clone_url: String,
    #[serde(default)]
    default_branch: String,
    owner: GiteaOwner,
}

#[derive(Debug, Deserialize)]
struct GiteaBranch {
    name: String,
    #[serde(default)]
    commit: Option<GiteaBranchCommit>,
}

#[derive(Debug, Deserialize)]
struct GiteaBranchCommit {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GiteaPullRequest {
    #[serde(default)]
    title: String,
    head: GiteaPrBranch,
}

#[derive(Debug, Deserialize)]
struct GiteaPrBranch {
    #[serde(rename = "ref")]
    git_ref: String,
    #[serde(default)]
    sha: String,
    /// Null once the source repository has been deleted
    #[serde(default)]
    repo: Option<GiteaRepository>,
}

#[derive(Debug, Deserialize)]
struct GiteaCommit {
    sha: String,
}

/// Gitea git provider
pub struct GiteaProvider {
    client: RestClient,
    host: String,
}

impl GiteaProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = RestClient::new(
            &config.api_url(),
            config.token().map(|t| format!("token {}", t)),
            "application/json",
            config.timeout(),
        )?;

        Ok(Self {
            client,
            host: config.host(),
        })
    }

    fn convert_repository(repo: GiteaRepository) -> Result<Repository> {
        let source = base::url_host(&repo.html_url).ok_or_else(|| {
            GitProviderError::invalid_url(&repo.html_url, "repository has no web URL host")
        })?;

        Ok(Repository {
            id: repo.name.clone(),
            name: repo.name,
            url: repo.html_url,
            owner: repo.owner.login,
            source,
            branch: Some(repo.default_branch).filter(|b| !b.is_empty()),
            sha: None,
            path: None,
            pr_number: None,
        })
    }

    fn convert_pull_request(pr: GiteaPullRequest) -> Option<PullRequest> {
        let repo = pr.head.repo?;
        Some(PullRequest {
            name: pr.title,
            branch: pr.head.git_ref,
            sha: pr.head.sha,
            source_repo_id: repo.name.clone(),
            source_repo_name: repo.name,
            source_repo_url: repo.html_url,
            source_repo_owner: repo.owner.login,
        })
    }

    fn repo_path(owner: &str, repo: &str) -> String {
        format!("/repos/{}/{}", seg(owner), seg(repo))
    }
}

#[async_trait]
impl GitProvider for GiteaProvider {
    fn provider_type(&self) -> GitProviderType {
        GitProviderType::Gitea
    }

    fn host(&self) -> &str {
        &self.host
    }

    async fn get_namespaces(&self) -> Result<Vec<Namespace>> {
        let user = self.get_user().await?;

        let orgs: Vec<GiteaOrganization> = self
            .client
            .get("/user/orgs", &first_page("limit"))
            .await?;

        let mut namespaces = vec![base::personal_namespace(&user)];
        namespaces.extend(
            orgs.into_iter()
                .filter_map(|org| org.username.or(org.name))
                .map(|name| Namespace {
                    id: name.clone(),
                    name,
                }),
        );

        Ok(namespaces)
    }

    async fn get_repositories(&self, namespace: &str) -> Result<Vec<Repository>> {
        let path = if namespace == PERSONAL_NAMESPACE_ID {
            let user = self.get_user().await?;
            format!("/users/{}/repos", seg(&user.username))
        } else {
            format!("/orgs/{}/repos", seg(namespace))
        };

        let repos: Vec<GiteaRepository> = self.client.get(&path, &first_page("limit")).await?;

        repos.into_iter().map(Self::convert_repository).collect()
    }

    async fn get_repo_branches(
        &self,
        repository_id: &str,
        namespace_id: &str,
    ) -> Result<Vec<Branch>> {
        let owner = base::resolve_namespace(self, namespace_id).await?;

        let branches: Vec<GiteaBranch> = self
            .client
            .get(
                &format!("{}/branches", Self::repo_path(&owner, repository_id)),
                &first_page("limit"),
            )
            .await?;

        Ok(branches
            .into_iter()
            .map(|branch| Branch {
                name: branch.name,
                sha: branch.commit.map(|c| c.id),
            })
            .collect())
    }

    async fn get_repo_prs(
        &self,
        repository_id: &str,
        namespace_id: &str,
    ) -> Result<Vec<PullRequest>> {
        let owner = base::resolve_namespace(self, namespace_id).await?;

        let mut query = first_page("limit");
        query.push(("state", "open".to_string()));
        query.push(("sort", "recentupdate".to_string()));

        let prs: Vec<GiteaPullRequest> = self
            .client
            .get(
                &format!("{}/pulls", Self::repo_path(&owner, repository_id)),
                &query,
            )
            .await?;

        Ok(prs
            .into_iter()
            .filter_map(|pr| {
                let title = pr.title.clone();
                let converted = Self::convert_pull_request(pr);
                if converted.is_none() {
                    warn!(title = %title, "Skipping pull request whose source repository is gone");
                }
                converted
            })
            .collect())
    }

    async fn get_user(&self) -> Result<User> {
        let user: GiteaUser = self.client.get("/user", &[]).await?;

        Ok(User {
            id: user.id.to_string(),
            username: user.login,
            name: user.full_name,
            email: user.email,
        })
    }

    async fn get_last_commit_sha(&self, ctx: &StaticGitContext) -> Result<String> {
        let mut query = first_page("limit");
        if let Some(branch) = ctx.branch.as_deref().filter(|b| !b.is_empty()) {
            query.push(("sha", branch.to_string()));
        }

        let commits: Vec<GiteaCommit> = match self
            .client
            .get(
                &format!("{}/commits", Self::repo_path(&ctx.owner, &ctx.id)),
                &query,
            )
            .await
        {
            Ok(commits) => commits,
            // "Git Repository is empty."
            Err(GitProviderError::ApiError { status: 409, .. }) => {
                debug!(owner = %ctx.owner, repo = %ctx.id, "Repository is empty");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        Ok(commits
            .into_iter()
            .next()
            .map(|commit| commit.sha)
            .unwrap_or_default())
    }

    fn parse_static_git_context(&self, repo_url: &str) -> Result<StaticGitContext> {
        let ctx = base::parse_repo_url(repo_url)?;
        grammar::apply(GITEA_PATH_RULES, ctx)
    }

    fn get_url_from_repository(&self, repository: &Repository) -> String {
        base::render_repository_url(repository, &GITEA_ROUTES)
    }

    async fn fetch_pr_context(
        &self,
        ctx: &StaticGitContext,
        pr_number: u32,
    ) -> Result<StaticGitContext> {
        debug!(owner = %ctx.owner, repo = %ctx.id, pr_number, "Resolving Gitea pull request");

        let pr: GiteaPullRequest = self
            .client
            .get(
                &format!("{}/pulls/{}", Self::repo_path(&ctx.owner, &ctx.id), pr_number),
                &[],
            )
            .await?;

        let head_repo = pr.head.repo.ok_or_else(|| {
            GitProviderError::NotFound(format!(
                "source repository of pull request #{} in {}/{}",
                pr_number, ctx.owner, ctx.id
            ))
        })?;

        Ok(StaticGitContext {
            branch: Some(pr.head.git_ref),
            url: head_repo.clone_url,
            id: head_repo.name.clone(),
            name: head_repo.name,
            owner: head_repo.owner.login,
            ..ctx.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GiteaProvider {
        GiteaProvider::new(&ProviderConfig::new(GitProviderType::Gitea)).unwrap()
    }

    #[test]
    fn test_parse_branch_url() {
        let ctx = provider()
            .parse_static_git_context("https://gitea.com/gitea/tea/src/branch/main")
            .unwrap();

        assert_eq!(ctx.owner, "gitea");
        assert_eq!(ctx.id, "tea");
        assert_eq!(ctx.branch.as_deref(), Some("main"));
        assert_eq!(ctx.path, None);
        assert_eq!(ctx.sha, None);
        assert_eq!(ctx.pr_number, None);
    }

    #[test]
    fn test_parse_branch_url_with_subpath() {
        let ctx = provider()
            .parse_static_git_context("https://gitea.com/gitea/tea/src/branch/main/modules/git")
            .unwrap();

        assert_eq!(ctx.branch.as_deref(), Some("main"));
        assert_eq!(ctx.path.as_deref(), Some("modules/git"));
    }

    #[test]
    fn test_parse_src_commit_url() {
        let ctx = provider()
            .parse_static_git_context("https://gitea.com/gitea/tea/src/commit/1a2b3c/cmd")
            .unwrap();

        assert_eq!(ctx.sha.as_deref(), Some("1a2b3c"));
        assert_eq!(ctx.branch.as_deref(), Some("1a2b3c"));
        assert_eq!(ctx.path.as_deref(), Some("cmd"));
    }

    #[test]
    fn test_parse_commit_url() {
        let ctx = provider()
            .parse_static_git_context("https://gitea.com/gitea/tea/commit/1a2b3c")
            .unwrap();

        assert_eq!(ctx.sha.as_deref(), Some("1a2b3c"));
        assert_eq!(ctx.branch.as_deref(), Some("1a2b3c"));
        assert_eq!(ctx.path, None);
    }

    #[test]
    fn test_parse_commits_branch_url() {
        let ctx = provider()
            .parse_static_git_context("https://gitea.com/gitea/tea/commits/branch/develop")
            .unwrap();

        assert_eq!(ctx.branch.as_deref(), Some("develop"));
        assert_eq!(ctx.sha, None);
        assert_eq!(ctx.path, None);
    }

    #[test]
    fn test_parse_pull_request_url() {
        let ctx = provider()
            .parse_static_git_context("https://gitea.com/gitea/tea/pulls/12")
            .unwrap();

        assert_eq!(ctx.pr_number, Some(12));
        assert_eq!(ctx.branch, None);
        assert_eq!(ctx.sha, None);
        assert_eq!(ctx.path, None);
    }

    #[test]
    fn test_parse_non_numeric_pull_request_fails() {
        let err = provider()
            .parse_static_git_context("https://gitea.com/gitea/tea/pulls/new")
            .unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_parse_plain_subpath() {
        let ctx = provider()
            .parse_static_git_context("https://gitea.com/gitea/tea/issues")
            .unwrap();
        assert_eq!(ctx.path.as_deref(), Some("issues"));
        assert_eq!(ctx.branch, None);
    }

    #[test]
    fn test_render_urls() {
        let repo = Repository {
            id: "tea".to_string(),
            name: "tea".to_string(),
            url: "https://gitea.com/gitea/tea.git".to_string(),
            owner: "gitea".to_string(),
            source: "gitea.com".to_string(),
            branch: Some("main".to_string()),
            sha: Some("main".to_string()),
            path: None,
            pr_number: None,
        };

        let p = provider();
        assert_eq!(
            p.get_url_from_repository(&repo),
            "https://gitea.com/gitea/tea/src/commit/main"
        );

        let unpinned = Repository { sha: None, ..repo };
        assert_eq!(
            p.get_url_from_repository(&unpinned),
            "https://gitea.com/gitea/tea/src/branch/main"
        );
    }

    #[test]
    fn test_can_handle() {
        let p = provider();
        assert!(p.can_handle("https://gitea.com/gitea/tea"));
        assert!(p.can_handle("git@gitea.com:gitea/tea.git"));
        assert!(!p.can_handle("https://github.com/go-gitea/gitea"));
    }

    #[test]
    fn test_convert_pull_request_without_source_repo() {
        let pr = GiteaPullRequest {
            title: "Orphaned".to_string(),
            head: GiteaPrBranch {
                git_ref: "gone".to_string(),
                sha: "abc".to_string(),
                repo: None,
            },
        };
        assert!(GiteaProvider::convert_pull_request(pr).is_none());
    }
}
