//! Table-driven URL path grammar
//!
//! Each provider declares an ordered list of [`PathRule`]s that classify the
//! path left over after host/owner/repo have been stripped from a URL. Rules
//! are evaluated top to bottom and the first match wins; when nothing matches
//! the path stays a plain subpath.
//!
//! The segment captured by [`Seg::Ref`] is taken whole. A branch such as
//! `feature/login` therefore cannot be told apart from branch `feature` with
//! subpath `login`, and the grammar always picks the latter.

use tracing::debug;

use super::types::StaticGitContext;
use crate::errors::{GitProviderError, Result};

/// One segment of a path pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seg {
    /// Must equal this keyword
    Lit(&'static str),
    /// Captured as the reference (PR number, branch or sha)
    Ref,
}

/// What happens to segments following the pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    /// The pattern only matches when nothing follows it
    Exact,
    /// Trailing segments are allowed and discarded
    Ignore,
    /// Trailing segments become the subpath
    Subpath,
}

/// How the captured reference is stored in the context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    PullRequest,
    Branch,
    /// Stored as sha and aliased into branch
    Commit,
}

#[derive(Debug, Clone, Copy)]
pub struct PathRule {
    pub pattern: &'static [Seg],
    pub tail: Tail,
    pub locator: Locator,
}

impl PathRule {
    pub const fn new(pattern: &'static [Seg], tail: Tail, locator: Locator) -> Self {
        Self {
            pattern,
            tail,
            locator,
        }
    }

    /// Returns the captured reference and the trailing segments on a match
    fn matches<'p, 'a>(&self, parts: &'p [&'a str]) -> Option<(&'a str, &'p [&'a str])> {
        if parts.len() < self.pattern.len() {
            return None;
        }

        let mut reference = None;
        for (seg, part) in self.pattern.iter().zip(parts) {
            match seg {
                Seg::Lit(keyword) if *part != *keyword => return None,
                Seg::Lit(_) => {}
                Seg::Ref => reference = Some(*part),
            }
        }

        let rest = &parts[self.pattern.len()..];
        if self.tail == Tail::Exact && !rest.is_empty() {
            return None;
        }

        reference.map(|r| (r, rest))
    }

    fn extract(&self, ctx: &mut StaticGitContext, reference: &str, rest: &[&str]) -> Result<()> {
        match self.locator {
            Locator::PullRequest => {
                let number = reference.parse::<u32>().map_err(|source| {
                    GitProviderError::InvalidPullRequestNumber {
                        value: reference.to_string(),
                        source,
                    }
                })?;
                ctx.pr_number = Some(number);
            }
            Locator::Branch => ctx.branch = Some(reference.to_string()),
            Locator::Commit => {
                ctx.sha = Some(reference.to_string());
                ctx.branch = Some(reference.to_string());
            }
        }

        ctx.path = match self.tail {
            Tail::Subpath => join_subpath(rest),
            Tail::Exact | Tail::Ignore => None,
        };

        Ok(())
    }
}

/// Classify `ctx.path` with the first matching rule
pub fn apply(rules: &[PathRule], mut ctx: StaticGitContext) -> Result<StaticGitContext> {
    let Some(path) = ctx.path.take() else {
        return Ok(ctx);
    };

    let parts: Vec<&str> = path.split('/').collect();
    for rule in rules {
        if let Some((reference, rest)) = rule.matches(&parts) {
            debug!(path = %path, locator = ?rule.locator, "Matched URL path rule");
            rule.extract(&mut ctx, reference, rest)?;
            return Ok(ctx);
        }
    }

    ctx.path = Some(path).filter(|p| !p.is_empty());
    Ok(ctx)
}

fn join_subpath(rest: &[&str]) -> Option<String> {
    let joined = rest.join("/");
    let trimmed = joined.trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &[PathRule] = &[
        PathRule::new(&[Seg::Lit("pulls"), Seg::Ref], Tail::Ignore, Locator::PullRequest),
        PathRule::new(
            &[Seg::Lit("src"), Seg::Lit("branch"), Seg::Ref],
            Tail::Subpath,
            Locator::Branch,
        ),
        PathRule::new(&[Seg::Lit("commit"), Seg::Ref], Tail::Ignore, Locator::Commit),
        PathRule::new(
            &[Seg::Lit("commits"), Seg::Lit("branch"), Seg::Ref],
            Tail::Exact,
            Locator::Branch,
        ),
    ];

    fn context(path: Option<&str>) -> StaticGitContext {
        StaticGitContext {
            id: "repo".to_string(),
            name: "repo".to_string(),
            owner: "owner".to_string(),
            url: "https://example.com/owner/repo.git".to_string(),
            source: "example.com".to_string(),
            branch: None,
            sha: None,
            path: path.map(str::to_string),
            pr_number: None,
        }
    }

    #[test]
    fn test_no_path_is_untouched() {
        let ctx = apply(RULES, context(None)).unwrap();
        assert_eq!(ctx, context(None));
    }

    #[test]
    fn test_branch_with_and_without_subpath() {
        let ctx = apply(RULES, context(Some("src/branch/main"))).unwrap();
        assert_eq!(ctx.branch.as_deref(), Some("main"));
        assert_eq!(ctx.path, None);

        let ctx = apply(RULES, context(Some("src/branch/main/docs/README.md"))).unwrap();
        assert_eq!(ctx.branch.as_deref(), Some("main"));
        assert_eq!(ctx.path.as_deref(), Some("docs/README.md"));
    }

    #[test]
    fn test_branch_capture_is_single_segment() {
        let ctx = apply(RULES, context(Some("src/branch/feature/login"))).unwrap();
        assert_eq!(ctx.branch.as_deref(), Some("feature"));
        assert_eq!(ctx.path.as_deref(), Some("login"));
    }

    #[test]
    fn test_commit_aliases_branch() {
        let ctx = apply(RULES, context(Some("commit/abc123/extra"))).unwrap();
        assert_eq!(ctx.sha.as_deref(), Some("abc123"));
        assert_eq!(ctx.branch.as_deref(), Some("abc123"));
        assert_eq!(ctx.path, None);
    }

    #[test]
    fn test_exact_tail_rejects_extra_segments() {
        let ctx = apply(RULES, context(Some("commits/branch/dev"))).unwrap();
        assert_eq!(ctx.branch.as_deref(), Some("dev"));
        assert_eq!(ctx.path, None);

        let ctx = apply(RULES, context(Some("commits/branch/dev/more"))).unwrap();
        assert_eq!(ctx.branch, None);
        assert_eq!(ctx.path.as_deref(), Some("commits/branch/dev/more"));
    }

    #[test]
    fn test_pull_request_number() {
        let ctx = apply(RULES, context(Some("pulls/42/files"))).unwrap();
        assert_eq!(ctx.pr_number, Some(42));
        assert_eq!(ctx.branch, None);
        assert_eq!(ctx.path, None);
    }

    #[test]
    fn test_non_numeric_pull_request_is_error() {
        let err = apply(RULES, context(Some("pulls/abc"))).unwrap_err();
        match err {
            GitProviderError::InvalidPullRequestNumber { value, .. } => assert_eq!(value, "abc"),
            other => panic!("Expected InvalidPullRequestNumber, got {:?}", other),
        }
    }

    #[test]
    fn test_first_match_wins() {
        const OVERLAPPING: &[PathRule] = &[
            PathRule::new(&[Seg::Lit("tree"), Seg::Ref], Tail::Subpath, Locator::Branch),
            PathRule::new(&[Seg::Lit("tree"), Seg::Ref], Tail::Subpath, Locator::Commit),
        ];
        let ctx = apply(OVERLAPPING, context(Some("tree/main"))).unwrap();
        assert_eq!(ctx.branch.as_deref(), Some("main"));
        assert_eq!(ctx.sha, None);
    }

    #[test]
    fn test_unmatched_path_is_kept() {
        let ctx = apply(RULES, context(Some("wiki/Home"))).unwrap();
        assert_eq!(ctx.path.as_deref(), Some("wiki/Home"));
        assert_eq!(ctx.branch, None);
    }
}
