//! Git provider trait definition

use async_trait::async_trait;

use super::base;
use super::types::{Branch, Namespace, PullRequest, Repository, StaticGitContext, User};
use crate::config::GitProviderType;
use crate::errors::Result;

/// Core git provider trait
///
/// All adapters implement this trait to expose one hosting service through the
/// normalized model. Listing operations fetch a single page of at most
/// [`LIST_PAGE_SIZE`](super::types::LIST_PAGE_SIZE) entries; callers needing
/// more must page themselves.
///
/// Every operation is one or a few sequential requests. Dropping the returned
/// future cancels the in-flight request; no partial result is ever produced
/// and nothing is retried.
#[async_trait]
pub trait GitProvider: Send + Sync {
    fn provider_type(&self) -> GitProviderType;

    /// Host this adapter serves, as it appears in repository URLs
    fn host(&self) -> &str;

    /// Personal namespace first, then the user's organizations
    async fn get_namespaces(&self) -> Result<Vec<Namespace>>;

    /// Repositories of a namespace, or of the current user for
    /// [`PERSONAL_NAMESPACE_ID`](super::types::PERSONAL_NAMESPACE_ID)
    async fn get_repositories(&self, namespace: &str) -> Result<Vec<Repository>>;

    async fn get_repo_branches(&self, repository_id: &str, namespace_id: &str)
        -> Result<Vec<Branch>>;

    /// Open pull requests, most recently updated first
    async fn get_repo_prs(&self, repository_id: &str, namespace_id: &str)
        -> Result<Vec<PullRequest>>;

    /// The authenticated user
    async fn get_user(&self) -> Result<User>;

    /// Id of the newest commit on the context's branch (the default branch
    /// when unset), or an empty string when the branch has no commits
    async fn get_last_commit_sha(&self, ctx: &StaticGitContext) -> Result<String>;

    /// Parse a repository URL without any network access
    fn parse_static_git_context(&self, repo_url: &str) -> Result<StaticGitContext>;

    /// Browsable URL for a repository location
    fn get_url_from_repository(&self, repository: &Repository) -> String;

    /// Fetch pull request `pr_number` and rebase `ctx` onto its head
    async fn fetch_pr_context(
        &self,
        ctx: &StaticGitContext,
        pr_number: u32,
    ) -> Result<StaticGitContext>;

    /// Resolve a pull request context into its head branch context.
    ///
    /// Contexts without a PR number come back unchanged and cost no request.
    async fn get_pr_context(&self, ctx: &StaticGitContext) -> Result<StaticGitContext> {
        match ctx.pr_number {
            Some(pr_number) => self.fetch_pr_context(ctx, pr_number).await,
            None => Ok(ctx.clone()),
        }
    }

    /// Check if the URL points at this adapter's host
    fn can_handle(&self, repo_url: &str) -> bool {
        base::url_host(repo_url)
            .map(|host| host.eq_ignore_ascii_case(self.host()))
            .unwrap_or(false)
    }
}
