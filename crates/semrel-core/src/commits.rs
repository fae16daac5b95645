//! Conventional-commit classification.
//!
//! One commit message becomes one [`Commit`] record. Messages whose subject
//! does not match the conventional grammar, or whose scope is rejected by the
//! configured package-scope filter, stay in the list as unclassified records
//! so their SHAs remain available for anchor lookup.

use regex::Regex;
use std::sync::LazyLock;

/// Subject grammar: `type(scope): subject`, with an optional `!` breaking
/// marker between the scope parenthetical and the colon.
static SUBJECT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)(?:\(([^)]*)\))?(!)?: (.+)$").expect("valid regex"));

/// Footer token marking a breaking change anywhere in the message body.
static BREAKING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"BREAKING CHANGES?").expect("valid regex"));

/// Importance flags derived from one commit.
///
/// Not mutually exclusive at the single-commit level; a commit set combines
/// them with OR semantics before a bump decision is made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Change {
    pub major: bool,
    pub minor: bool,
    pub patch: bool,
}

impl Change {
    /// OR-combine with another commit's flags.
    pub fn merge(self, other: Change) -> Change {
        Change {
            major: self.major || other.major,
            minor: self.minor || other.minor,
            patch: self.patch || other.patch,
        }
    }

    /// True when no flag is set, i.e. the commit set warrants no bump.
    pub fn is_empty(&self) -> bool {
        !(self.major || self.minor || self.patch)
    }
}

/// A single classified commit.
///
/// `commit_type`, `scope` and `subject` are empty when the subject line did
/// not match the conventional grammar or the scope filter rejected it; such
/// commits carry all-false [`Change`] flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Opaque commit identifier, preserved exactly as reported.
    pub sha: String,
    /// Full message, split on newlines.
    pub raw: Vec<String>,
    /// Lowercased conventional type ("" if unclassified).
    pub commit_type: String,
    pub scope: String,
    pub subject: String,
    pub change: Change,
}

impl Commit {
    /// Parse one raw commit message.
    ///
    /// When `package_scope` is non-empty, a parsed scope that does not equal
    /// it exactly (case-sensitive) means the commit is not relevant to this
    /// package and is returned unclassified.
    pub fn classify(sha: &str, message: &str, package_scope: &str) -> Commit {
        let mut commit = Commit {
            sha: sha.to_string(),
            raw: message.lines().map(str::to_string).collect(),
            commit_type: String::new(),
            scope: String::new(),
            subject: String::new(),
            change: Change::default(),
        };

        let Some(subject_line) = commit.raw.first() else {
            return commit;
        };
        let Some(caps) = SUBJECT_PATTERN.captures(subject_line) else {
            return commit;
        };

        let scope = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        if !package_scope.is_empty() && package_scope != scope {
            return commit;
        }

        commit.commit_type = caps[1].to_lowercase();
        commit.scope = scope.to_string();
        commit.subject = caps[4].to_string();
        commit.change = Change {
            major: caps.get(3).is_some() || BREAKING_PATTERN.is_match(message),
            minor: commit.commit_type == "feat",
            patch: commit.commit_type == "fix",
        };
        commit
    }

    /// True when the subject matched the grammar and survived scope filtering.
    pub fn is_classified(&self) -> bool {
        !self.commit_type.is_empty()
    }

    /// Shortened SHA for changelog display.
    pub fn short_sha(&self) -> &str {
        let end = self.sha.len().min(8);
        &self.sha[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_scoped_feature() {
        let commit = Commit::classify("abc123", "feat(core): add export", "core");
        assert_eq!(commit.commit_type, "feat");
        assert_eq!(commit.scope, "core");
        assert_eq!(commit.subject, "add export");
        assert!(commit.change.minor);
        assert!(!commit.change.major);
        assert!(!commit.change.patch);
    }

    #[test]
    fn classifies_fix_as_patch() {
        let commit = Commit::classify("abc123", "fix(core): null check", "core");
        assert_eq!(commit.commit_type, "fix");
        assert!(commit.change.patch);
        assert!(!commit.change.minor);
    }

    #[test]
    fn scope_mismatch_leaves_commit_unclassified() {
        let commit = Commit::classify("abc123", "feat(other): add export", "core");
        assert!(!commit.is_classified());
        assert!(commit.change.is_empty());
        assert_eq!(commit.sha, "abc123");
        assert_eq!(commit.raw, vec!["feat(other): add export"]);
    }

    #[test]
    fn missing_scope_fails_configured_filter() {
        let commit = Commit::classify("abc123", "feat: add export", "core");
        assert!(!commit.is_classified());
        assert!(commit.change.is_empty());
    }

    #[test]
    fn empty_filter_accepts_any_scope() {
        let commit = Commit::classify("abc123", "feat(anything): add export", "");
        assert_eq!(commit.commit_type, "feat");
        assert_eq!(commit.scope, "anything");

        let unscoped = Commit::classify("abc124", "fix: tidy", "");
        assert_eq!(unscoped.commit_type, "fix");
        assert_eq!(unscoped.scope, "");
    }

    #[test]
    fn non_conventional_subject_is_retained_unclassified() {
        let commit = Commit::classify("abc123", "update readme", "");
        assert!(!commit.is_classified());
        assert!(commit.change.is_empty());
        assert_eq!(commit.sha, "abc123");
    }

    #[test]
    fn breaking_footer_sets_major_regardless_of_type() {
        let commit = Commit::classify(
            "abc123",
            "fix(core): drop legacy path\n\nBREAKING CHANGE: removes the v1 format",
            "core",
        );
        assert!(commit.change.major);
        assert!(commit.change.patch);
    }

    #[test]
    fn inline_bang_sets_major() {
        let commit = Commit::classify("abc123", "feat(core)!: remove legacy API", "core");
        assert!(commit.change.major);
        assert!(commit.change.minor);
        assert_eq!(commit.subject, "remove legacy API");
    }

    #[test]
    fn type_is_case_insensitive_and_normalized() {
        let commit = Commit::classify("abc123", "Feat(core): shiny", "core");
        assert_eq!(commit.commit_type, "feat");
        assert!(commit.change.minor);
    }

    #[test]
    fn scope_comparison_is_case_sensitive() {
        let commit = Commit::classify("abc123", "feat(Core): shiny", "core");
        assert!(!commit.is_classified());
    }

    #[test]
    fn other_types_carry_no_flags_but_keep_their_type() {
        let commit = Commit::classify("abc123", "chore(core): update deps", "core");
        assert_eq!(commit.commit_type, "chore");
        assert!(commit.change.is_empty());
    }

    #[test]
    fn short_sha_handles_short_input() {
        let commit = Commit::classify("ab", "chore: x", "");
        assert_eq!(commit.short_sha(), "ab");
        let commit = Commit::classify("0123456789abcdef", "chore: x", "");
        assert_eq!(commit.short_sha(), "01234567");
    }

    #[test]
    fn empty_message_yields_unclassified_commit() {
        let commit = Commit::classify("abc123", "", "");
        assert!(!commit.is_classified());
        assert!(commit.raw.is_empty());
    }
}
