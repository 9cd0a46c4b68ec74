//! Git hosting abstraction for repolink
//!
//! This crate puts several git hosting services behind one normalized model so
//! callers can browse namespaces, repositories, branches and pull requests, and
//! turn a pasted repository URL into a precise location (owner, repository,
//! branch or commit, sub-path) without knowing which service hosts it.
//!
//! # Features
//!
//! - **Normalized model**: `Namespace`, `Repository`, `Branch`, `PullRequest`, `User`
//! - **Table-driven URL grammar**: each adapter declares its URL shapes as data
//! - **Pull request resolution**: a PR link becomes the PR's head branch in the
//!   (possibly forked) source repository
//! - **Commit pinning**: repository contexts carry the newest commit of their branch
//!
//! # Supported Providers
//!
//! - **Gitea**: gitea.com and self-hosted instances (`/api/v1`)
//! - **GitHub**: github.com and GitHub Enterprise (`/api/v3`)
//!
//! # Usage
//!
//! ```ignore
//! use repolink_git::{GitProviderRegistry, ProvidersConfig, RepositoryContextRequest};
//!
//! let registry = GitProviderRegistry::from_config(&ProvidersConfig::default())?;
//!
//! let ctx = registry
//!     .resolve_url("https://gitea.com/owner/repo/pulls/7")
//!     .await?;
//! println!("PR head branch: {:?}", ctx.branch);
//!
//! let repo = registry
//!     .repository_context(&RepositoryContextRequest::new("https://github.com/owner/repo"))
//!     .await?;
//! println!("Pinned to {:?}", repo.sha);
//! ```

pub mod config;
pub mod errors;
pub mod providers;
pub mod services;

// Re-export main types
pub use config::{GitProviderType, ProviderConfig, ProvidersConfig, DEFAULT_TIMEOUT_SECS};
pub use errors::{GitProviderError, Result};
pub use providers::{
    get_repository_context, resolve_namespace, Branch, GitHubProvider, GitProvider,
    GiteaProvider, Namespace, PullRequest, Repository, RepositoryContextRequest,
    StaticGitContext, User, LIST_PAGE, LIST_PAGE_SIZE, PERSONAL_NAMESPACE_ID,
};
pub use services::GitProviderRegistry;
