use clap::Parser;
use std::path::PathBuf;

/// semrel CLI – next semantic version and changelog from conventional commits
#[derive(Debug, Parser)]
#[command(
    name = "semrel",
    version,
    about = "Automates the package release workflow: determining the next version number and generating the change log"
)]
pub struct Cli {
    /// Repository slug in owner/name form (detected from CI when omitted)
    #[arg(long)]
    pub slug: Option<String>,

    /// Provider access token (falls back to GITHUB_TOKEN or GITLAB_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// GitHub Enterprise host
    #[arg(long)]
    pub ghe_host: Option<String>,

    /// Release on GitLab instead of GitHub
    #[arg(long)]
    pub gitlab: bool,

    /// Self-hosted GitLab base URL
    #[arg(long)]
    pub gitlab_base_url: Option<String>,

    /// Numeric GitLab project id (defaults to the URL-encoded slug)
    #[arg(long)]
    pub gitlab_project_id: Option<u64>,

    /// Package scope filtering commits and tags in a multi-package repository
    #[arg(long, default_value = "")]
    pub package: String,

    /// Regex restricting which tags are considered, anchored at the start
    #[arg(long = "match", value_name = "REGEX")]
    pub match_tags: Option<String>,

    /// Maintained version or range to release on (forbidden on the default branch)
    #[arg(long, default_value = "")]
    pub maintained_version: String,

    /// Mark the created release as a pre-release
    #[arg(long)]
    pub prerelease: bool,

    /// Compute the next version and changelog without creating anything
    #[arg(long)]
    pub dry: bool,

    /// Skip the CI condition check
    #[arg(long)]
    pub noci: bool,

    /// Write the changelog to this file
    #[arg(long, value_name = "PATH")]
    pub changelog: Option<PathBuf>,

    /// Write the resolved version to a .version file
    #[arg(long)]
    pub version_file: bool,

    /// Commit the release must point at (must exist in the fetched history)
    #[arg(long, value_name = "SHA")]
    pub commit_hash: Option<String>,

    /// Override the current branch
    #[arg(long)]
    pub branch: Option<String>,

    /// Override the base branch used to recognize hotfix lines
    #[arg(long)]
    pub base_branch: Option<String>,
}

impl Cli {
    /// Fill unset values from the environment, the way CI systems provide
    /// them.
    pub fn apply_environment_fallbacks(&mut self) {
        if self.token.is_none() {
            let key = if self.gitlab { "GITLAB_TOKEN" } else { "GITHUB_TOKEN" };
            if let Ok(token) = std::env::var(key)
                && !token.is_empty()
            {
                self.token = Some(token);
            }
        }
    }
}
