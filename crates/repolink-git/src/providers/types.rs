//! Normalized git hosting model
//!
//! Every provider adapter translates its own REST payloads into these types.

use serde::{Deserialize, Serialize};

/// Namespace id standing for the authenticated user's own account.
///
/// Angle brackets are not valid in account names on any supported host, so it
/// never collides with a provider-issued id.
pub const PERSONAL_NAMESPACE_ID: &str = "<PERSONAL>";

/// Page requested by every listing call. Only the first page is fetched.
pub const LIST_PAGE: u32 = 1;

/// Page size requested by every listing call.
pub const LIST_PAGE_SIZE: u32 = 100;

/// An account scope (user or organization) repositories are listed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub id: String,
    pub name: String,
}

impl Namespace {
    pub fn is_personal(&self) -> bool {
        self.id == PERSONAL_NAMESPACE_ID
    }
}

/// A normalized repository location
///
/// The optional fields refine the location; which of them are set depends on
/// where the repository came from (listing, URL parsing, PR resolution).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub url: String,
    pub owner: String,
    /// Host serving the repository (e.g. "gitea.com")
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u32>,
}

impl Repository {
    /// Whether the branch is the commit-pinning alias of the sha
    pub fn is_pinned_to_commit(&self) -> bool {
        matches!((&self.branch, &self.sha), (Some(branch), Some(sha)) if branch == sha)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// An open pull request, described by its source (head) side only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub name: String,
    pub branch: String,
    pub sha: String,
    pub source_repo_id: String,
    pub source_repo_name: String,
    pub source_repo_url: String,
    pub source_repo_owner: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: String,
    pub email: String,
}

/// Location inside a provider's URL space, produced by parsing a URL alone
///
/// `pr_number` set means `branch` and `sha` are unknown until the pull request
/// is resolved. `path` is never `Some("")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticGitContext {
    /// Repository slug
    pub id: String,
    pub name: String,
    pub owner: String,
    pub url: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u32>,
}

impl From<StaticGitContext> for Repository {
    fn from(ctx: StaticGitContext) -> Self {
        Self {
            id: ctx.id,
            name: ctx.name,
            url: ctx.url,
            owner: ctx.owner,
            source: ctx.source,
            branch: ctx.branch,
            sha: ctx.sha,
            path: ctx.path,
            pr_number: ctx.pr_number,
        }
    }
}
