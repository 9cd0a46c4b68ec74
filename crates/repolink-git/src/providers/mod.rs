//! Git provider implementations
//!
//! This module contains the provider trait, the normalized model, the shared
//! URL grammar machinery and one adapter per hosting service.

pub mod base;
mod client;
pub mod gitea;
pub mod github;
pub mod grammar;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use base::{get_repository_context, resolve_namespace, RepositoryContextRequest};
pub use gitea::GiteaProvider;
pub use github::GitHubProvider;
pub use traits::GitProvider;
pub use types::{
    Branch, Namespace, PullRequest, Repository, StaticGitContext, User, LIST_PAGE,
    LIST_PAGE_SIZE, PERSONAL_NAMESPACE_ID,
};
