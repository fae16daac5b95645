//! Prior-release selection among candidate tags.
//!
//! Providers enumerate raw tag candidates; everything else (prefix stripping,
//! regex filtering, semver parsing, maintenance and hotfix restriction,
//! ranking) happens here so the logic is never duplicated per provider.

use regex::Regex;
use semver::{Version, VersionReq};

/// Raw tag candidate as enumerated by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCandidate {
    pub tag: String,
    pub sha: String,
}

impl TagCandidate {
    pub fn new(tag: impl Into<String>, sha: impl Into<String>) -> Self {
        TagCandidate {
            tag: tag.into(),
            sha: sha.into(),
        }
    }
}

/// The tag/commit pair selected as "previous release".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub sha: String,
    pub version: Version,
}

impl Release {
    pub fn new(sha: impl Into<String>, version: Version) -> Self {
        Release {
            sha: sha.into(),
            version,
        }
    }

    /// Baseline for missing history: empty SHA, version 0.0.0.
    ///
    /// Returned instead of an absent value so downstream bump arithmetic
    /// always has something to increment. A first-ever release and a
    /// maintenance line with no prior tag both land here.
    pub fn none() -> Self {
        Release {
            sha: String::new(),
            version: Version::new(0, 0, 0),
        }
    }

    /// True when this is the missing-history baseline.
    pub fn is_none(&self) -> bool {
        self.sha.is_empty() && self.version == Version::new(0, 0, 0)
    }
}

/// Set of parseable releases, unordered as stored.
#[derive(Debug, Clone, Default)]
pub struct Releases(Vec<Release>);

impl Releases {
    /// Parse raw tag candidates into releases.
    ///
    /// Strips a `<package_scope>-release-` prefix when present, applies the
    /// optional start-anchored regex, accepts an optional leading `v`, and
    /// silently drops anything that does not parse as a semantic version.
    pub fn from_candidates(
        candidates: &[TagCandidate],
        package_scope: &str,
        match_regex: Option<&Regex>,
    ) -> Releases {
        let prefix = format!("{package_scope}-release-");
        let mut releases = Vec::new();
        for candidate in candidates {
            let tag = candidate.tag.strip_prefix(&prefix).unwrap_or(&candidate.tag);
            if let Some(re) = match_regex
                && !re.is_match(tag)
            {
                continue;
            }
            let Ok(version) = Version::parse(tag.strip_prefix('v').unwrap_or(tag)) else {
                continue;
            };
            releases.push(Release::new(candidate.sha.clone(), version));
        }
        Releases(releases)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pick the most relevant prior release.
    ///
    /// `maintained` restricts the pool to a maintenance line; `hotfix_prefix`
    /// (e.g. "1.2" from a `<scope>-branch-v1.2` branch) restricts it to
    /// versions on that numeric line. An empty surviving pool yields
    /// [`Release::none`] rather than an error: a line with no prior tag is a
    /// legitimate first release.
    pub fn select_latest(&self, maintained: Option<&VersionReq>, hotfix_prefix: &str) -> Release {
        let mut best: Option<&Release> = None;
        for release in &self.0 {
            if let Some(req) = maintained
                && !req.matches(&release.version)
            {
                continue;
            }
            if !hotfix_prefix.is_empty() && !on_version_line(&release.version, hotfix_prefix) {
                continue;
            }
            // Strict comparison keeps the first-seen candidate on ties.
            if best.is_none_or(|current| release.version > current.version) {
                best = Some(release);
            }
        }
        best.cloned().unwrap_or_else(Release::none)
    }
}

/// True when `version` sits on the numeric line named by `prefix`
/// ("1.2" matches 1.2.3 but not 1.20.0).
fn on_version_line(version: &Version, prefix: &str) -> bool {
    let rendered = version.to_string();
    rendered == prefix || rendered.starts_with(&format!("{prefix}."))
}
