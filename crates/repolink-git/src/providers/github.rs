//! GitHub provider implementation
//!
//! Uses the GitHub REST API (api.github.com, or `/api/v3` on GitHub Enterprise
//! Server) with a personal access token sent as a Bearer token.

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

/// Path grammar of GitHub web URLs, in evaluation order
pub const GITHUB_PATH_RULES: &[PathRule] = &[
    PathRule::new(&[Seg::Lit("pull"), Seg::Ref], Tail::Ignore, Locator::PullRequest),
    PathRule::new(&[Seg::Lit("tree"), Seg::Ref], Tail::Subpath, Locator::Branch),
    PathRule::new(&[Seg::Lit("blob"), Seg::Ref], Tail::Subpath, Locator::Branch),
    PathRule::new(&[Seg::Lit("commit"), Seg::Ref], Tail::Ignore, Locator::Commit),
    PathRule::new(&[Seg::Lit("commits"), Seg::Ref], Tail::Ignore, Locator::Branch),
];

const GITHUB_ROUTES: UrlRoutes = UrlRoutes {
    commit: "/commit/",
    branch: "/tree/",
    fallback_branch: "main",
};

#[derive(Debug, Deserialize)]
struct GhUser {
    id: u64,
    login: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhOrganization {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhRepository {
    name: String,
    html_url: String,
    clone_url: String,
    #[serde(default)]
    default_branch: Option<String>,
    owner: GhOwner,
}

#[derive(Debug, Deserialize)]
struct GhBranch {
    name: String,
    commit: GhCommit,
}

#[derive(Debug, Deserialize)]
struct GhCommit {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GhPullRequest {
    #[serde(default)]
    title: String,
    head: GhPrHead,
}

#[derive(Debug, Deserialize)]
struct GhPrHead {
    #[serde(rename = "ref")]
    git_ref: String,
    sha: String,
    #[serde(default)]
    repo: Option<GhRepository>,
}

/// GitHub git provider
pub struct GitHubProvider {
    client: RestClient,
    host: String,
}

impl GitHubProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = RestClient::new(
            &config.api_url(),
            config.token().map(|t| format!("Bearer {}", t)),
            "application/vnd.github+json",
            config.timeout(),
        )?;

        Ok(Self {
            client,
            host: config.host(),
        })
    }

    fn convert_repository(&self, repo: GhRepository) -> Repository {
        let source = base::url_host(&repo.html_url).unwrap_or_else(|| self.host.clone());

        Repository {
            id: repo.name.clone(),
            name: repo.name,
            url: repo.html_url,
            owner: repo.owner.login,
            source,
            branch: repo.default_branch.filter(|b| !b.is_empty()),
            sha: None,
            path: None,
            pr_number: None,
        }
    }

    fn repo_path(owner: &str, repo: &str) -> String {
        format!("/repos/{}/{}", seg(owner), seg(repo))
    }
}

#[async_trait]
impl GitProvider for GitHubProvider {
    fn provider_type(&self) -> GitProviderType {
        GitProviderType::GitHub
    }

    fn host(&self) -> &str {
        &self.host
    }

    async fn get_namespaces(&self) -> Result<Vec<Namespace>> {
        let user = self.get_user().await?;

        let orgs: Vec<GhOrganization> = self
            .client
            .get("/user/orgs", &first_page("per_page"))
            .await?;

        let mut namespaces = vec![base::personal_namespace(&user)];
        namespaces.extend(orgs.into_iter().map(|org| Namespace {
            id: org.login.clone(),
            name: org.login,
        }));

        Ok(namespaces)
    }

    async fn get_repositories(&self, namespace: &str) -> Result<Vec<Repository>> {
        let mut query = first_page("per_page");
        let (path, owner) = if namespace == PERSONAL_NAMESPACE_ID {
            // /users/{login}/repos only lists public repositories
            let user = self.get_user().await?;
            query.push(("affiliation", "owner".to_string()));
            ("/user/repos".to_string(), Some(user.username))
        } else {
            (format!("/orgs/{}/repos", seg(namespace)), None)
        };

        let repos: Vec<GhRepository> = self.client.get(&path, &query).await?;

        Ok(repos
            .into_iter()
            .filter(|repo| {
                owner
                    .as_deref()
                    .map_or(true, |login| repo.owner.login.eq_ignore_ascii_case(login))
            })
            .map(|repo| self.convert_repository(repo))
            .collect())
    }

    async fn get_repo_branches(
        &self,
        repository_id: &str,
        namespace_id: &str,
    ) -> Result<Vec<Branch>> {
        let owner = base::resolve_namespace(self, namespace_id).await?;

        let branches: Vec<GhBranch> = self
            .client
            .get(
                &format!("{}/branches", Self::repo_path(&owner, repository_id)),
                &first_page("per_page"),
            )
            .await?;

        Ok(branches
            .into_iter()
            .map(|branch| Branch {
                name: branch.name,
                sha: Some(branch.commit.sha),
            })
            .collect())
    }

    async fn get_repo_prs(
        &self,
        repository_id: &str,
        namespace_id: &str,
    ) -> Result<Vec<PullRequest>> {
        let owner = base::resolve_namespace(self, namespace_id).await?;

        let mut query = first_page("per_page");
        query.push(("state", "open".to_string()));
        query.push(("sort", "updated".to_string()));
        query.push(("direction", "desc".to_string()));

        let prs: Vec<GhPullRequest> = self
            .client
            .get(
                &format!("{}/pulls", Self::repo_path(&owner, repository_id)),
                &query,
            )
            .await?;

        let mut response = Vec::with_capacity(prs.len());
        for pr in prs {
            let Some(repo) = pr.head.repo else {
                warn!(title = %pr.title, "Skipping pull request whose source repository is gone");
                continue;
            };
            response.push(PullRequest {
                name: pr.title,
                branch: pr.head.git_ref,
                sha: pr.head.sha,
                source_repo_id: repo.name.clone(),
                source_repo_name: repo.name,
                source_repo_url: repo.html_url,
                source_repo_owner: repo.owner.login,
            });
        }

        Ok(response)
    }

    async fn get_user(&self) -> Result<User> {
        let user: GhUser = self.client.get("/user", &[]).await?;

        Ok(User {
            id: user.id.to_string(),
            username: user.login,
            name: user.name.unwrap_or_default(),
            email: user.email.unwrap_or_default(),
        })
    }

    async fn get_last_commit_sha(&self, ctx: &StaticGitContext) -> Result<String> {
        let mut query = first_page("per_page");
        if let Some(branch) = ctx.branch.as_deref().filter(|b| !b.is_empty()) {
            query.push(("sha", branch.to_string()));
        }

        let commits: Vec<GhCommit> = match self
            .client
            .get(
                &format!("{}/commits", Self::repo_path(&ctx.owner, &ctx.id)),
                &query,
            )
            .await
        {
            Ok(commits) => commits,
            // GitHub answers 409 Conflict for a repository without commits
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
        grammar::apply(GITHUB_PATH_RULES, ctx)
    }

    fn get_url_from_repository(&self, repository: &Repository) -> String {
        base::render_repository_url(repository, &GITHUB_ROUTES)
    }

    async fn fetch_pr_context(
        &self,
        ctx: &StaticGitContext,
        pr_number: u32,
    ) -> Result<StaticGitContext> {
        debug!(owner = %ctx.owner, repo = %ctx.id, pr_number, "Resolving GitHub pull request");

        let pr: GhPullRequest = self
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
mod integration_tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_mock_provider(mock_server: &MockServer) -> GitHubProvider {
        let config = ProviderConfig {
            base_api_url: Some(mock_server.uri()),
            token: Some("ghp_test".to_string()),
            ..ProviderConfig::new(GitProviderType::GitHub)
        };
        GitHubProvider::new(&config).unwrap()
    }

    fn repo_json(owner: &str, name: &str) -> serde_json::Value {
        serde_json::json!({
            "name": name,
            "html_url": format!("https://github.com/{}/{}", owner, name),
            "clone_url": format!("https://github.com/{}/{}.git", owner, name),
            "default_branch": "main",
            "owner": {"login": owner}
        })
    }

    #[tokio::test]
    async fn test_get_namespaces() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("Authorization", "Bearer ghp_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 1,
                "login": "octocat",
                "name": null,
                "email": null
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/user/orgs"))
            .and(query_param("per_page", "100"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([{"login": "github"}])),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_mock_provider(&mock_server);
        let namespaces = provider.get_namespaces().await.unwrap();

        assert_eq!(namespaces[0].id, PERSONAL_NAMESPACE_ID);
        assert_eq!(namespaces[0].name, "octocat");
        assert_eq!(namespaces[1].id, "github");
    }

    #[tokio::test]
    async fn test_personal_repositories() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 1,
                "login": "octocat"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/user/repos"))
            .and(query_param("affiliation", "owner"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                repo_json("octocat", "hello-world"),
                repo_json("someone-else", "shared")
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/orgs/octocat/repos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = create_mock_provider(&mock_server);
        let repos = provider
            .get_repositories(PERSONAL_NAMESPACE_ID)
            .await
            .unwrap();

        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].owner, "octocat");
        assert_eq!(repos[0].source, "github.com");
    }

    #[tokio::test]
    async fn test_get_repo_prs() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/rust-lang/rust/pulls"))
            .and(query_param("state", "open"))
            .and(query_param("sort", "updated"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "title": "Stabilize feature",
                    "head": {"ref": "stabilize", "sha": "eee555", "repo": repo_json("ferris", "rust")}
                }
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_mock_provider(&mock_server);
        let prs = provider.get_repo_prs("rust", "rust-lang").await.unwrap();

        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].branch, "stabilize");
        assert_eq!(prs[0].source_repo_owner, "ferris");
    }

    #[tokio::test]
    async fn test_last_commit_sha_of_empty_repository() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/empty/commits"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "message": "Git Repository is empty."
            })))
            .mount(&mock_server)
            .await;

        let provider = create_mock_provider(&mock_server);
        let ctx = provider
            .parse_static_git_context("https://github.com/octocat/empty")
            .unwrap();

        assert_eq!(provider.get_last_commit_sha(&ctx).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_pr_context_resolves_head() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello-world/pulls/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "title": "Feature X",
                "head": {"ref": "feature-x", "sha": "fff666", "repo": repo_json("alice", "hello-world")}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_mock_provider(&mock_server);
        let ctx = provider
            .parse_static_git_context("https://github.com/octocat/hello-world/pull/7")
            .unwrap();

        let resolved = provider.get_pr_context(&ctx).await.unwrap();

        assert_eq!(resolved.branch.as_deref(), Some("feature-x"));
        assert_eq!(resolved.owner, "alice");
        assert_eq!(resolved.url, "https://github.com/alice/hello-world.git");
        assert_eq!(resolved.pr_number, Some(7));
        assert_eq!(resolved.sha, None);
    }

    #[tokio::test]
    async fn test_forbidden_propagates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/secret/branches"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "message": "Resource not accessible by personal access token"
            })))
            .mount(&mock_server)
            .await;

        let provider = create_mock_provider(&mock_server);
        let err = provider
            .get_repo_branches("secret", "acme")
            .await
            .unwrap_err();

        assert!(matches!(err, GitProviderError::PermissionDenied(_)));
    }
}
