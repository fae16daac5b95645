//! CI context detection.
//!
//! Supplies the branch, SHA, and slug the engine needs from its caller,
//! plus the pre-flight condition check. The values come from well-known CI
//! environment variables with a local-git fallback for development use.

use std::process::Command;

/// Typed CI facts, replacing a dynamically keyed configuration bag.
#[derive(Debug, Clone)]
pub struct CiContext {
    pub name: &'static str,
    pub branch: Option<String>,
    pub sha: Option<String>,
    pub slug: Option<String>,
    pub is_pull_request: bool,
}

pub fn detect() -> CiContext {
    detect_with_env(|key| std::env::var(key).ok())
}

fn detect_with_env<F>(env: F) -> CiContext
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| {
        env(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    if get("GITHUB_ACTIONS").is_some() {
        return CiContext {
            name: "GitHub Actions",
            branch: get("GITHUB_REF_NAME"),
            sha: get("GITHUB_SHA"),
            slug: get("GITHUB_REPOSITORY"),
            is_pull_request: get("GITHUB_EVENT_NAME")
                .is_some_and(|event| event.starts_with("pull_request")),
        };
    }

    if get("GITLAB_CI").is_some() {
        return CiContext {
            name: "GitLab CI",
            branch: get("CI_COMMIT_REF_NAME"),
            sha: get("CI_COMMIT_SHA"),
            slug: get("CI_PROJECT_PATH"),
            is_pull_request: get("CI_MERGE_REQUEST_ID").is_some(),
        };
    }

    if get("TRAVIS").is_some() {
        return CiContext {
            name: "Travis CI",
            branch: get("TRAVIS_BRANCH"),
            sha: get("TRAVIS_COMMIT"),
            slug: get("TRAVIS_REPO_SLUG"),
            is_pull_request: get("TRAVIS_PULL_REQUEST").is_some_and(|pr| pr != "false"),
        };
    }

    if get("CIRCLECI").is_some() {
        let slug = match (get("CIRCLE_PROJECT_USERNAME"), get("CIRCLE_PROJECT_REPONAME")) {
            (Some(owner), Some(repo)) => Some(format!("{owner}/{repo}")),
            _ => None,
        };
        return CiContext {
            name: "CircleCI",
            branch: get("CIRCLE_BRANCH"),
            sha: get("CIRCLE_SHA1"),
            slug,
            is_pull_request: get("CIRCLE_PULL_REQUEST").is_some(),
        };
    }

    CiContext {
        name: "none",
        branch: git_current_branch(),
        sha: git_head_sha(),
        slug: None,
        is_pull_request: false,
    }
}

/// Refuse to release from pull-request builds or from branches other than
/// the release branch. A `default_branch` of "*" (maintained-version mode)
/// accepts any branch.
pub fn check_condition(
    context: &CiContext,
    current_branch: &str,
    default_branch: &str,
) -> Result<(), String> {
    if context.is_pull_request {
        return Err("pull request builds are not released".to_string());
    }
    if default_branch != "*" && current_branch != default_branch {
        return Err(format!(
            "branch '{current_branch}' is not the release branch '{default_branch}'"
        ));
    }
    Ok(())
}

fn git_current_branch() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let branch = String::from_utf8_lossy(&output.stdout)
        .trim()
        .trim_start_matches("refs/heads/")
        .to_string();
    if branch.is_empty() || branch == "HEAD" {
        None
    } else {
        Some(branch)
    }
}

fn git_head_sha() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if sha.is_empty() { None } else { Some(sha) }
}
