//! Version-bump arithmetic over a classified commit set.

use crate::commits::{Change, Commit};
use crate::releases::Release;
use semver::{BuildMetadata, Prerelease, Version};

/// Commits made after the previous release.
///
/// Providers return history newest-first; when the previous release's own
/// commit appears in the list, it terminates the walk so older changes never
/// leak into the bump decision or the changelog.
pub fn commits_since<'a>(commits: &'a [Commit], previous: &Release) -> &'a [Commit] {
    if previous.sha.is_empty() {
        return commits;
    }
    match commits.iter().position(|commit| commit.sha == previous.sha) {
        Some(idx) => &commits[..idx],
        None => commits,
    }
}

/// OR-fold of all change flags since the previous release. Order-independent.
pub fn calculate_change(commits: &[Commit], previous: &Release) -> Change {
    commits_since(commits, previous)
        .iter()
        .fold(Change::default(), |acc, commit| acc.merge(commit.change))
}

/// Apply a combined change to a version.
///
/// Precedence is strict: major dominates minor dominates patch. Returns
/// `None` when no flag is set, leaving the fallback decision to the caller.
///
/// A previous version carrying a pre-release identifier stays on its numeric
/// triple and advances the pre-release counter instead: the final numeric
/// segment is incremented (`beta.3` becomes `beta.4`, `rc.1.2` becomes
/// `rc.1.3`), and an identifier without one gains `.1` (`beta` becomes
/// `beta.1`).
pub fn apply_change(version: &Version, change: Change) -> Option<Version> {
    if change.is_empty() {
        return None;
    }

    let mut next = version.clone();
    next.build = BuildMetadata::EMPTY;

    if !version.pre.is_empty() {
        next.pre = bump_prerelease(version.pre.as_str());
        return Some(next);
    }

    if change.major {
        next.major += 1;
        next.minor = 0;
        next.patch = 0;
    } else if change.minor {
        next.minor += 1;
        next.patch = 0;
    } else {
        next.patch += 1;
    }
    next.pre = Prerelease::EMPTY;
    Some(next)
}

/// Fold the commit set and apply the result to the previous release.
pub fn next_version(commits: &[Commit], previous: &Release) -> Option<Version> {
    apply_change(&previous.version, calculate_change(commits, previous))
}

/// Bump to apply when no qualifying commits exist: tracked lines always
/// advance, minor on the default line and patch on any other line.
pub fn fallback_version(previous: &Version, on_default_line: bool) -> Version {
    let mut next = previous.clone();
    next.pre = Prerelease::EMPTY;
    next.build = BuildMetadata::EMPTY;
    if on_default_line {
        next.minor += 1;
        next.patch = 0;
    } else {
        next.patch += 1;
    }
    next
}

fn bump_prerelease(pre: &str) -> Prerelease {
    let next = match pre.rsplit_once('.') {
        Some((head, tail)) => match tail.parse::<u64>() {
            Ok(counter) => format!("{head}.{}", counter + 1),
            Err(_) => format!("{pre}.1"),
        },
        None => match pre.parse::<u64>() {
            Ok(counter) => (counter + 1).to_string(),
            Err(_) => format!("{pre}.1"),
        },
    };
    // Built from an already-valid identifier plus a numeric segment.
    Prerelease::new(&next).expect("valid pre-release identifier")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classified(messages: &[&str]) -> Vec<Commit> {
        messages
            .iter()
            .enumerate()
            .map(|(i, message)| Commit::classify(&format!("sha-{i}"), message, ""))
            .collect()
    }

    fn release(sha: &str, version: &str) -> Release {
        Release::new(sha, Version::parse(version).unwrap())
    }

    #[test]
    fn fix_and_chore_produce_patch() {
        let commits = classified(&["fix(pkgA): null check", "chore(pkgA): update deps"]);
        let next = next_version(&commits, &release("old", "1.0.0")).unwrap();
        assert_eq!(next, Version::parse("1.0.1").unwrap());
    }

    #[test]
    fn breaking_dominates_feature() {
        let commits = classified(&[
            "feat(pkgA): add export",
            "feat(pkgA)!: remove legacy API\n\nBREAKING CHANGE: drop v1 format",
        ]);
        let next = next_version(&commits, &release("old", "1.0.1")).unwrap();
        assert_eq!(next, Version::parse("2.0.0").unwrap());
    }

    #[test]
    fn breaking_fix_still_bumps_major() {
        let commits = classified(&["fix!: reject malformed input"]);
        let next = next_version(&commits, &release("old", "3.2.1")).unwrap();
        assert_eq!(next, Version::parse("4.0.0").unwrap());
    }

    #[test]
    fn feature_bumps_minor_and_zeroes_patch() {
        let commits = classified(&["feat: add export"]);
        let next = next_version(&commits, &release("old", "1.0.9")).unwrap();
        assert_eq!(next, Version::parse("1.1.0").unwrap());
    }

    #[test]
    fn no_qualifying_commits_yield_none() {
        let commits = classified(&["chore: tidy", "docs: readme"]);
        assert!(next_version(&commits, &release("old", "1.0.1")).is_none());
    }

    #[test]
    fn feature_against_zero_release_yields_0_1_0() {
        let commits = classified(&["feat: first feature"]);
        let next = next_version(&commits, &Release::none()).unwrap();
        assert_eq!(next, Version::parse("0.1.0").unwrap());
    }

    #[test]
    fn fold_stops_at_previous_release_sha() {
        let mut commits = classified(&["chore: tidy"]);
        commits.push(Commit::classify("released", "feat!: old breaking change", ""));
        commits.push(Commit::classify("older", "feat: even older", ""));
        // The breaking commit is the previous release itself, so only the
        // chore counts and no bump is warranted.
        assert!(next_version(&commits, &release("released", "2.0.0")).is_none());
    }

    #[test]
    fn prerelease_counter_advances_within_triple() {
        let commits = classified(&["feat: more beta work"]);
        let next = next_version(&commits, &release("old", "2.0.0-beta")).unwrap();
        assert_eq!(next, Version::parse("2.0.0-beta.1").unwrap());

        let next = next_version(&commits, &release("old", "2.0.0-beta.3")).unwrap();
        assert_eq!(next, Version::parse("2.0.0-beta.4").unwrap());
    }

    #[test]
    fn prerelease_counter_advances_on_the_last_segment() {
        let commits = classified(&["feat: stabilization work"]);
        let previous = release("old", "2.0.0-rc.1.2");
        let next = next_version(&commits, &previous).unwrap();
        assert_eq!(next, Version::parse("2.0.0-rc.1.3").unwrap());
        assert!(next > previous.version);
    }

    #[test]
    fn non_numeric_prerelease_tail_gains_a_counter() {
        let commits = classified(&["feat: more alpha work"]);
        let next = next_version(&commits, &release("old", "1.0.0-alpha.x")).unwrap();
        assert_eq!(next, Version::parse("1.0.0-alpha.x.1").unwrap());

        let next = next_version(&commits, &release("old", "1.0.0-7")).unwrap();
        assert_eq!(next, Version::parse("1.0.0-8").unwrap());
    }

    #[test]
    fn build_metadata_is_dropped_on_increment() {
        let commits = classified(&["fix: small"]);
        let next = next_version(&commits, &release("old", "1.2.3+build.5")).unwrap();
        assert_eq!(next, Version::parse("1.2.4").unwrap());
    }

    #[test]
    fn fallback_is_minor_on_default_line() {
        let next = fallback_version(&Version::parse("1.0.1").unwrap(), true);
        assert_eq!(next, Version::parse("1.1.0").unwrap());
    }

    #[test]
    fn fallback_is_patch_on_other_lines() {
        let next = fallback_version(&Version::parse("1.0.1").unwrap(), false);
        assert_eq!(next, Version::parse("1.0.2").unwrap());
    }
}
