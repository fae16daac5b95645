//! Changelog rendering.
//!
//! Pure and deterministic: identical commit sequences and versions always
//! produce byte-identical output, so changelog-file writes stay idempotent.

use crate::commits::Commit;
use crate::releases::Release;
use crate::resolver::commits_since;
use semver::Version;
use std::collections::BTreeMap;

/// Section order for well-known conventional types; anything else follows
/// alphabetically under its literal type.
const SECTION_ORDER: &[(&str, &str)] = &[
    ("feat", "Features"),
    ("fix", "Bug Fixes"),
    ("perf", "Performance Improvements"),
    ("revert", "Reverts"),
    ("docs", "Documentation"),
    ("style", "Styles"),
    ("refactor", "Code Refactoring"),
    ("test", "Tests"),
    ("chore", "Chores"),
];

/// Render release notes for `new_version`.
///
/// Breaking changes come first with their full message; remaining classified
/// commits are grouped by type, preserving the provider's newest-first order
/// within each section. Unclassified commits are excluded.
pub fn render(commits: &[Commit], previous: &Release, new_version: &Version) -> String {
    let mut sections: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut breaking: Vec<String> = Vec::new();

    for commit in commits_since(commits, previous) {
        if commit.change.major {
            breaking.push(format!("{}: {}\n", commit.short_sha(), commit.raw.join("\n")));
            continue;
        }
        if !commit.is_classified() {
            continue;
        }
        sections
            .entry(commit.commit_type.clone())
            .or_default()
            .push(format!("* {} ({})\n", commit.subject, commit.short_sha()));
    }

    let mut out = format!("## {new_version}\n\n");
    if !previous.is_none() {
        out.push_str(&format!("Changes since v{}.\n\n", previous.version));
    }

    if !breaking.is_empty() {
        out.push_str("#### Breaking Changes\n\n");
        for entry in &breaking {
            out.push_str(entry);
        }
        out.push('\n');
    }

    for (commit_type, title) in SECTION_ORDER {
        if let Some(entries) = sections.remove(*commit_type) {
            push_section(&mut out, title, &entries);
        }
    }
    // BTreeMap iteration keeps leftover sections in a stable order.
    for (commit_type, entries) in &sections {
        push_section(&mut out, commit_type, entries);
    }

    out
}

fn push_section(out: &mut String, title: &str, entries: &[String]) {
    out.push_str(&format!("#### {title}\n\n"));
    for entry in entries {
        out.push_str(entry);
    }
    out.push('\n');
}
