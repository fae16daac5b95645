//! Repository provider boundary.
//!
//! Variants fetch raw tags and commits and execute release creation; all
//! classification, ranking, and bump arithmetic stays in core so nothing is
//! duplicated per provider.

use crate::commits::Commit;
use crate::errors::{Result, SemrelError};
use crate::releases::TagCandidate;
use semver::Version;

/// Repository facts reported by a provider.
#[derive(Debug, Clone)]
pub struct RepositoryInfo {
    pub default_branch: String,
    pub private: bool,
}

/// Everything a provider needs to cut one release.
#[derive(Debug, Clone)]
pub struct ReleaseRequest<'a> {
    pub changelog: &'a str,
    pub new_version: &'a Version,
    pub prerelease: bool,
    /// Branch the release is cut from.
    pub branch: &'a str,
    /// Effective default branch; when `branch` equals it, the provider also
    /// creates a `<scope>-branch-v<version>` ref as a future hotfix anchor.
    pub default_branch: &'a str,
    pub branch_head_sha: &'a str,
    /// Commit the tag and release point at.
    pub release_sha: &'a str,
    pub package_scope: &'a str,
}

impl ReleaseRequest<'_> {
    /// Tag written for this release: `<scope>-release-v<version>`.
    pub fn tag_name(&self) -> String {
        format!("{}-release-v{}", self.package_scope, self.new_version)
    }

    /// Hotfix-anchor branch written when releasing from the default branch:
    /// `<scope>-branch-v<version>`.
    pub fn branch_name(&self) -> String {
        format!("{}-branch-v{}", self.package_scope, self.new_version)
    }

    /// Pre-release flag for the provider-native release object.
    pub fn is_prerelease(&self) -> bool {
        self.prerelease || !self.new_version.pre.is_empty()
    }

    pub fn targets_default_branch(&self) -> bool {
        self.branch == self.default_branch
    }
}

/// Boundary to a Git-hosting provider.
///
/// Calls are blocking; pagination inside an implementation must drain every
/// page before returning so the selector never ranks a partial candidate
/// list.
pub trait Repository {
    /// Human-readable provider name ("GitHub", "GitLab").
    fn provider(&self) -> &'static str;

    fn owner(&self) -> &str;

    fn repo(&self) -> &str;

    /// Default branch and visibility.
    fn info(&self) -> Result<RepositoryInfo>;

    /// Raw history starting at `since_sha` (newest first), classified against
    /// `package_scope` with the shared classifier.
    fn commits(&self, since_sha: &str, package_scope: &str) -> Result<Vec<Commit>>;

    /// All tag candidates, every page drained.
    fn release_candidates(&self, package_scope: &str) -> Result<Vec<TagCandidate>>;

    /// Create the tag ref, the provider-native release, and (from the default
    /// branch) the hotfix-anchor branch ref.
    fn create_release(&self, request: &ReleaseRequest<'_>) -> Result<()>;
}

/// Split an `owner/name` repository identifier.
pub fn parse_slug(slug: &str) -> Result<(String, String)> {
    match slug.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner.to_string(), name.to_string()))
        }
        _ => Err(SemrelError::MalformedSlug(slug.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_name_slug() {
        let (owner, name) = parse_slug("owner/repo").unwrap();
        assert_eq!(owner, "owner");
        assert_eq!(name, "repo");
    }

    #[test]
    fn rejects_malformed_slugs() {
        for slug in ["", "owner", "/repo", "owner/", "a/b/c"] {
            assert!(
                matches!(parse_slug(slug), Err(SemrelError::MalformedSlug(_))),
                "expected MalformedSlug for {slug:?}"
            );
        }
    }

    #[test]
    fn release_request_naming() {
        let version = Version::parse("1.2.0").unwrap();
        let request = ReleaseRequest {
            changelog: "",
            new_version: &version,
            prerelease: false,
            branch: "main",
            default_branch: "main",
            branch_head_sha: "head",
            release_sha: "anchor",
            package_scope: "pkgA",
        };
        assert_eq!(request.tag_name(), "pkgA-release-v1.2.0");
        assert_eq!(request.branch_name(), "pkgA-branch-v1.2.0");
        assert!(request.targets_default_branch());
        assert!(!request.is_prerelease());
    }

    #[test]
    fn prerelease_flag_follows_version_pre_component() {
        let version = Version::parse("2.0.0-beta.1").unwrap();
        let request = ReleaseRequest {
            changelog: "",
            new_version: &version,
            prerelease: false,
            branch: "beta",
            default_branch: "*",
            branch_head_sha: "head",
            release_sha: "anchor",
            package_scope: "pkgA",
        };
        assert!(request.is_prerelease());
        assert!(!request.targets_default_branch());
    }
}
