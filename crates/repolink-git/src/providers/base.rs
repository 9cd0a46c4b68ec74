//! Behavior shared by every provider
//!
//! Everything here is written against [`GitProvider`] (or needs no provider at
//! all), so adapters only supply what differs between hosting services.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::traits::GitProvider;
use super::types::{Namespace, Repository, StaticGitContext, User, PERSONAL_NAMESPACE_ID};
use crate::errors::{GitProviderError, Result};

/// Split a repository URL into host, owner, repo slug and remaining path.
///
/// Accepts `https://host/owner/repo/...`, `host/owner/repo/...`,
/// `ssh://git@host/owner/repo.git` and `git@host:owner/repo.git`. The
/// remaining path is left unclassified; provider grammars refine it.
pub fn parse_repo_url(repo_url: &str) -> Result<StaticGitContext> {
    let (source, path) = split_host_and_path(repo_url)?;

    let mut parts = path.trim_matches('/').splitn(3, '/');
    let owner = parts.next().filter(|s| !s.is_empty());
    let repo = parts
        .next()
        .map(|s| s.strip_suffix(".git").unwrap_or(s))
        .filter(|s| !s.is_empty());

    let (owner, repo) = match (owner, repo) {
        (Some(owner), Some(repo)) => (owner.to_string(), repo.to_string()),
        _ => {
            return Err(GitProviderError::invalid_url(
                repo_url,
                "expected an owner and a repository name",
            ))
        }
    };

    let path = parts
        .next()
        .map(|rest| rest.trim_matches('/'))
        .filter(|rest| !rest.is_empty())
        .map(str::to_string);

    Ok(StaticGitContext {
        url: clone_url(&source, &owner, &repo),
        id: repo.clone(),
        name: repo,
        owner,
        source,
        branch: None,
        sha: None,
        path,
        pr_number: None,
    })
}

/// Host part of a repository URL, if it can be parsed
pub fn url_host(repo_url: &str) -> Option<String> {
    split_host_and_path(repo_url).ok().map(|(host, _)| host)
}

/// Canonical HTTPS clone URL
pub fn clone_url(source: &str, owner: &str, repo: &str) -> String {
    format!("https://{}/{}/{}.git", source, owner, repo)
}

fn split_host_and_path(repo_url: &str) -> Result<(String, String)> {
    let trimmed = repo_url.trim();
    if trimmed.is_empty() {
        return Err(GitProviderError::invalid_url(repo_url, "empty URL"));
    }

    // scp-like syntax: git@host:owner/repo.git
    if !trimmed.contains("://") {
        if let Some((user_host, path)) = trimmed.split_once(':') {
            if let Some((_, host)) = user_host.split_once('@') {
                if host.is_empty() {
                    return Err(GitProviderError::invalid_url(repo_url, "missing host"));
                }
                return Ok((host.to_lowercase(), path.to_string()));
            }
        }
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = url::Url::parse(&with_scheme)
        .map_err(|e| GitProviderError::invalid_url(repo_url, e.to_string()))?;

    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| GitProviderError::invalid_url(repo_url, "missing host"))?;
    let host = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    let path = urlencoding::decode(parsed.path())
        .map_err(|e| GitProviderError::invalid_url(repo_url, e.to_string()))?
        .into_owned();

    Ok((host, path))
}

/// Namespace entry standing for the user's own account
pub fn personal_namespace(user: &User) -> Namespace {
    Namespace {
        id: PERSONAL_NAMESPACE_ID.to_string(),
        name: user.username.clone(),
    }
}

/// Replace the personal-namespace sentinel with the current username.
///
/// Only the sentinel costs a request; any other id is returned as is.
pub async fn resolve_namespace<P>(provider: &P, namespace_id: &str) -> Result<String>
where
    P: GitProvider + ?Sized,
{
    if namespace_id != PERSONAL_NAMESPACE_ID {
        return Ok(namespace_id.to_string());
    }

    let user = provider.get_user().await?;
    debug!(username = %user.username, "Resolved personal namespace");
    Ok(user.username)
}

/// Path segments for building a browsable URL
#[derive(Debug, Clone, Copy)]
pub struct UrlRoutes {
    /// e.g. "/src/commit/"
    pub commit: &'static str,
    /// e.g. "/src/branch/"
    pub branch: &'static str,
    /// Branch assumed when a path is given without one
    pub fallback_branch: &'static str,
}

/// Render a repository location with provider-specific routes.
///
/// A branch equal to the sha renders as a commit link, any other branch as a
/// branch link.
pub fn render_repository_url(repository: &Repository, routes: &UrlRoutes) -> String {
    let mut url = repository
        .url
        .strip_suffix(".git")
        .unwrap_or(&repository.url)
        .to_string();

    let path = repository.path.as_deref().filter(|p| !p.is_empty());

    match repository.branch.as_deref().filter(|b| !b.is_empty()) {
        Some(branch) => {
            let route = if repository.sha.as_deref() == Some(branch) {
                routes.commit
            } else {
                routes.branch
            };
            url.push_str(route);
            url.push_str(branch);
            if let Some(path) = path {
                url.push('/');
                url.push_str(path);
            }
        }
        None => {
            if let Some(path) = path {
                url.push_str(routes.branch);
                url.push_str(routes.fallback_branch);
                url.push('/');
                url.push_str(path);
            }
        }
    }

    url
}

/// Caller input for [`get_repository_context`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryContextRequest {
    pub url: String,
    /// Overrides the branch found in the URL (and drops a sha parsed from it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl RepositoryContextRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Turn a user supplied URL into a repository location ready to be cloned.
///
/// Parses the URL, resolves a referenced pull request, applies the caller's
/// overrides and pins the newest commit of the branch when no sha is known.
/// An empty branch leaves `sha` unset.
pub async fn get_repository_context<P>(
    provider: &P,
    request: &RepositoryContextRequest,
) -> Result<Repository>
where
    P: GitProvider + ?Sized,
{
    let parsed = provider.parse_static_git_context(&request.url)?;
    let mut ctx = provider.get_pr_context(&parsed).await?;

    if let Some(branch) = request.branch.as_deref().filter(|b| !b.is_empty()) {
        ctx.branch = Some(branch.to_string());
        ctx.sha = None;
    }
    if let Some(sha) = request.sha.as_deref().filter(|s| !s.is_empty()) {
        ctx.sha = Some(sha.to_string());
    }
    if let Some(path) = request
        .path
        .as_deref()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
    {
        ctx.path = Some(path.to_string());
    }

    if ctx.sha.is_none() {
        let sha = provider.get_last_commit_sha(&ctx).await?;
        ctx.sha = Some(sha).filter(|s| !s.is_empty());
    }

    info!(
        owner = %ctx.owner,
        repo = %ctx.id,
        branch = ?ctx.branch,
        sha = ?ctx.sha,
        "Resolved repository context"
    );

    Ok(Repository::from(ctx))
}
