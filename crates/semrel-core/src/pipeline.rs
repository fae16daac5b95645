//! Sequential release-resolution pipeline.
//!
//! Each stage consumes the complete output of the prior stage; side effects
//! (tag, release, branch creation) run last, only after every computation
//! succeeded.

use crate::cancel::CancellationToken;
use crate::changelog;
use crate::commits::Commit;
use crate::config::Config;
use crate::errors::{Result, SemrelError};
use crate::provider::{ReleaseRequest, Repository};
use crate::releases::{Release, Releases};
use crate::resolver;
use semver::Version;

/// Result of one resolution run.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub previous: Release,
    pub new_version: Version,
    pub changelog: String,
    /// Commit the release points at.
    pub release_sha: String,
    /// False on dry runs, where nothing was created.
    pub created: bool,
}

/// Resolve and (unless dry-running) create the next release.
pub fn run(repo: &dyn Repository, config: &Config, cancel: &CancellationToken) -> Result<Outcome> {
    cancel.check()?;
    let info = repo.info()?;
    if info.default_branch.is_empty() {
        return Err(SemrelError::NoDefaultBranch);
    }

    let current_branch = config.current_branch.trim();
    if current_branch.is_empty() {
        return Err(SemrelError::NoCurrentBranch);
    }

    let mut default_branch = info.default_branch.clone();
    if !config.maintained_version.trim().is_empty() {
        if current_branch == default_branch {
            return Err(SemrelError::Config(
                "maintained version not allowed on the default branch".to_string(),
            ));
        }
        // A maintained line releases from its own branch; disable the
        // default-branch comparison for the rest of the run.
        default_branch = "*".to_string();
    }

    let base_branch = config
        .base_branch
        .clone()
        .unwrap_or_else(|| info.default_branch.clone());
    let on_default_line = current_branch == base_branch;
    let hotfix_prefix = hotfix_prefix(current_branch, &base_branch, &config.package_scope);

    let match_regex = config.match_regex()?;
    let maintained = config.maintained_range()?;

    cancel.check()?;
    let candidates = repo.release_candidates(&config.package_scope)?;
    let releases = Releases::from_candidates(&candidates, &config.package_scope, match_regex.as_ref());
    let previous = releases.select_latest(maintained.as_ref(), hotfix_prefix.as_deref().unwrap_or(""));

    if config.wants_prerelease_line() && previous.version.pre.is_empty() {
        return Err(SemrelError::InvalidMaintenanceRequest(
            previous.version.to_string(),
        ));
    }

    cancel.check()?;
    let commits = repo.commits(&config.current_sha, &config.package_scope)?;

    let new_version = match resolver::next_version(&commits, &previous) {
        Some(version) => version,
        None => resolver::fallback_version(&previous.version, on_default_line),
    };

    let changelog = changelog::render(&commits, &previous, &new_version);
    let release_sha = resolve_release_sha(&commits, config)?;

    if config.dry_run {
        return Ok(Outcome {
            previous,
            new_version,
            changelog,
            release_sha,
            created: false,
        });
    }

    cancel.check()?;
    repo.create_release(&ReleaseRequest {
        changelog: &changelog,
        new_version: &new_version,
        prerelease: config.prerelease,
        branch: current_branch,
        default_branch: &default_branch,
        branch_head_sha: &config.current_sha,
        release_sha: &release_sha,
        package_scope: &config.package_scope,
    })?;

    Ok(Outcome {
        previous,
        new_version,
        changelog,
        release_sha,
        created: true,
    })
}

/// Commit the tag will point at.
///
/// An explicit hash must be present in the fetched history; otherwise the
/// newest commit anchors the release, falling back to the branch head when
/// the history window is empty.
fn resolve_release_sha(commits: &[Commit], config: &Config) -> Result<String> {
    if let Some(hash) = config.commit_hash.as_deref().map(str::trim)
        && !hash.is_empty()
    {
        return commits
            .iter()
            .find(|commit| commit.sha == hash)
            .map(|commit| commit.sha.clone())
            .ok_or_else(|| SemrelError::CommitNotFound(hash.to_string()));
    }
    Ok(commits
        .first()
        .map(|commit| commit.sha.clone())
        .unwrap_or_else(|| config.current_sha.clone()))
}

/// Numeric line tracked by a hotfix branch, extracted from the
/// `<scope>-branch-v<prefix>` naming written at release time.
fn hotfix_prefix(current_branch: &str, base_branch: &str, package_scope: &str) -> Option<String> {
    if current_branch == base_branch {
        return None;
    }
    current_branch
        .strip_prefix(&format!("{package_scope}-branch-v"))
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string)
}
