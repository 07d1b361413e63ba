//! Maps an incoming import path to an upstream repository, a subpath, and a
//! requested version token.

use regex::Regex;
use std::sync::OnceLock;

use crate::errors::GitHttpError;

/// A single `/`-free path segment carrying a version tag, e.g. `pkg.v3.2-dev`.
fn segment_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9_-]+)\.(v[0-9]+(?:\.[0-9]+)?(?:-[A-Za-z0-9]+)?)$").unwrap()
    })
}

/// The result of successfully matching an import path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub upstream_url: String,
    pub sub_path: String,
    /// The raw `vN[.M][-dev|-word]` token as it appeared in the path.
    pub version_token: String,
}

/// Resolves import paths to upstream repositories.
pub trait Matcher {
    fn match_path(&self, path: &str) -> Result<MatchResult, GitHttpError>;
}

/// The generic "forge" matcher: `<user>/<flattened-name>.git` for a
/// single-host, user-prefixed repository layout.
pub struct ForgeMatcher {
    user: String,
}

impl ForgeMatcher {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
}

impl Matcher for ForgeMatcher {
    fn match_path(&self, path: &str) -> Result<MatchResult, GitHttpError> {
        let path = path.strip_prefix('/').unwrap_or(path);

        let segments: Vec<&str> = path.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(GitHttpError::MalformedPath);
        }

        let re = segment_pattern();
        let mut matched: Option<(usize, &str, &str)> = None;
        for (i, seg) in segments.iter().enumerate() {
            if let Some(caps) = re.captures(seg) {
                if matched.is_some() {
                    // More than one version-tagged segment: ambiguous, reject.
                    return Err(GitHttpError::MalformedPath);
                }
                let name = caps.get(1).unwrap().as_str();
                let version = caps.get(2).unwrap().as_str();
                matched = Some((i, name, version));
            }
        }

        let (idx, name, version_token) = matched.ok_or(GitHttpError::MalformedPath)?;

        let mut repo_parts: Vec<&str> = segments[..idx].to_vec();
        repo_parts.push(name);
        let flattened = repo_parts.join("-");

        let sub_path = segments[idx + 1..].join("/");

        Ok(MatchResult {
            upstream_url: format!("{}/{}.git", self.user, flattened),
            sub_path,
            version_token: version_token.to_string(),
        })
    }
}
