//! Typed resolution inputs.
//!
//! Everything the engine needs from its caller lives in one struct with
//! named, typed fields; no dynamically keyed bags.

use crate::errors::{Result, SemrelError};
use regex::Regex;
use semver::VersionReq;

/// Inputs for one release resolution.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Scope tag filtering commits and release tags to one package.
    /// Empty means no filtering.
    pub package_scope: String,
    /// Optional tag filter, anchored at the start of the (prefix-stripped)
    /// tag string.
    pub match_tags: Option<String>,
    /// Maintenance line to release on (a version or range string); empty for
    /// the default line.
    pub maintained_version: String,
    /// Force the provider release object to be marked pre-release.
    pub prerelease: bool,
    /// Compute everything but create nothing.
    pub dry_run: bool,
    /// Explicit commit the release must point at. Must be present in the
    /// fetched history or resolution fails.
    pub commit_hash: Option<String>,
    /// Branch the release is cut from.
    pub current_branch: String,
    /// Head commit of that branch.
    pub current_sha: String,
    /// Mainline branch used to recognize hotfix lines; defaults to the
    /// provider-reported default branch.
    pub base_branch: Option<String>,
}

impl Config {
    /// Compile the tag filter, anchoring it at the start.
    pub fn match_regex(&self) -> Result<Option<Regex>> {
        match self.match_tags.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(pattern) => Regex::new(&format!("^{pattern}"))
                .map(Some)
                .map_err(|e| SemrelError::Config(format!("invalid tag filter: {e}"))),
        }
    }

    /// Parse the maintenance line into a version requirement.
    pub fn maintained_range(&self) -> Result<Option<VersionReq>> {
        let trimmed = self.maintained_version.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        VersionReq::parse(trimmed)
            .map(Some)
            .map_err(|e| SemrelError::Config(format!("invalid maintained version: {e}")))
    }

    /// True when the maintenance line targets pre-release versions.
    pub fn wants_prerelease_line(&self) -> bool {
        self.maintained_version.contains('-')
    }
}
