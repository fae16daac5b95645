pub mod cancel;
pub mod changelog;
pub mod commits;
pub mod config;
pub mod errors;
pub mod github;
pub mod gitlab;
pub mod pipeline;
pub mod provider;
pub mod releases;
pub mod resolver;

// Re-export commonly used items
pub use semver;

pub use cancel::CancellationToken;
pub use commits::{Change, Commit};
pub use config::Config;
pub use errors::{Result, SemrelError};
pub use github::GitHubRepository;
pub use gitlab::GitLabRepository;
pub use pipeline::{Outcome, run};
pub use provider::{ReleaseRequest, Repository, RepositoryInfo, parse_slug};
pub use releases::{Release, Releases, TagCandidate};
pub use resolver::{apply_change, calculate_change, commits_since, fallback_version, next_version};
