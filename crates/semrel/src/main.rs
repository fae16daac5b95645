mod ci;
mod cli;

use clap::Parser;
use cli::Cli;
use semrel_core::{
    CancellationToken, Config, GitHubRepository, GitLabRepository, Outcome, Repository,
    SemrelError,
};
use std::path::Path;
use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Core(#[from] SemrelError),
    #[error("CI condition failed: {0}")]
    Condition(String),
    #[error("DRY RUN: no release was created")]
    DryRun,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Exit codes kept compatible with CI setups that branch on them:
    /// 65 for expected non-release outcomes, 66 for failed conditions.
    fn exit_code(&self) -> u8 {
        match self {
            CliError::DryRun | CliError::Core(SemrelError::CommitNotFound(_)) => 65,
            CliError::Condition(_) => 66,
            _ => 1,
        }
    }
}

fn main() -> ExitCode {
    let mut cli = Cli::parse();
    cli.apply_environment_fallbacks();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[semrel] {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let context = ci::detect();
    eprintln!("[semrel] detected CI: {}", context.name);

    let slug = cli
        .slug
        .clone()
        .or_else(|| context.slug.clone())
        .ok_or_else(|| {
            CliError::Config("repository slug not provided and not detected from CI".to_string())
        })?;
    let token = cli.token.clone().unwrap_or_default();

    let cancel = CancellationToken::new();
    let repo: Box<dyn Repository> = if cli.gitlab {
        Box::new(GitLabRepository::new(
            &slug,
            &token,
            cli.gitlab_base_url.as_deref(),
            cli.gitlab_project_id,
            cancel.clone(),
        )?)
    } else {
        Box::new(GitHubRepository::new(
            &slug,
            &token,
            cli.ghe_host.as_deref(),
            cancel.clone(),
        )?)
    };
    eprintln!("[semrel] releasing on: {}", repo.provider());

    let info = repo.info()?;
    eprintln!("[semrel] found default branch: {}", info.default_branch);
    if info.private {
        eprintln!("[semrel] repo is private");
    }

    let current_branch = cli
        .branch
        .clone()
        .or_else(|| context.branch.clone())
        .ok_or(CliError::Core(SemrelError::NoCurrentBranch))?;
    let current_sha = require_current_sha(context.sha.clone())?;
    eprintln!("[semrel] found current branch: {current_branch}");
    eprintln!("[semrel] found current sha: {current_sha}");

    if !cli.noci {
        eprintln!("[semrel] running CI condition...");
        let effective_default = if cli.maintained_version.trim().is_empty() {
            info.default_branch.as_str()
        } else {
            "*"
        };
        ci::check_condition(&context, &current_branch, effective_default)
            .map_err(CliError::Condition)?;
    }

    let config = Config {
        package_scope: cli.package.clone(),
        match_tags: cli.match_tags.clone(),
        maintained_version: cli.maintained_version.clone(),
        prerelease: cli.prerelease,
        dry_run: cli.dry,
        commit_hash: cli.commit_hash.clone(),
        current_branch,
        current_sha,
        base_branch: cli.base_branch.clone(),
    };

    eprintln!("[semrel] resolving release...");
    let outcome = semrel_core::run(repo.as_ref(), &config, &cancel)?;
    eprintln!("[semrel] previous version: {}", outcome.previous.version);
    eprintln!("[semrel] new version: {}", outcome.new_version);

    if !outcome.created {
        print!("{}", outcome.changelog);
        return Err(CliError::DryRun);
    }

    let version_path = cli.version_file.then(|| Path::new(".version"));
    write_outputs(cli.changelog.as_deref(), version_path, &outcome)?;

    eprintln!("[semrel] done.");
    Ok(())
}

/// The resolution needs a head SHA to anchor fallback releases; without one
/// the failure would only surface at the provider, so reject up front.
fn require_current_sha(sha: Option<String>) -> Result<String, CliError> {
    match sha {
        Some(sha) if !sha.is_empty() => Ok(sha),
        _ => Err(CliError::Config(
            "current commit sha not detected from CI".to_string(),
        )),
    }
}

/// Output files are written only after the release was created, so a failed
/// resolution never leaves partial artifacts behind.
fn write_outputs(
    changelog_path: Option<&Path>,
    version_path: Option<&Path>,
    outcome: &Outcome,
) -> std::io::Result<()> {
    if let Some(path) = changelog_path {
        std::fs::write(path, &outcome.changelog)?;
    }
    if let Some(path) = version_path {
        std::fs::write(path, outcome.new_version.to_string())?;
    }
    Ok(())
}
