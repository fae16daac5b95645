//! GitHub-backed repository provider.
//!
//! Talks to the REST API v3 (or a GitHub Enterprise host) with a blocking
//! client; tag enumeration drains every page before returning.

use crate::cancel::CancellationToken;
use crate::commits::Commit;
use crate::errors::{Result, SemrelError};
use crate::provider::{ReleaseRequest, Repository, RepositoryInfo, parse_slug};
use crate::releases::TagCandidate;
use serde::Deserialize;
use std::time::Duration;

const PAGE_SIZE: u32 = 100;
const USER_AGENT: &str = concat!("semrel/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub struct GitHubRepository {
    owner: String,
    repo: String,
    api_base: String,
    token: String,
    client: reqwest::blocking::Client,
    cancel: CancellationToken,
}

#[derive(Deserialize)]
struct RepoResponse {
    default_branch: Option<String>,
    private: bool,
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    message: String,
}

#[derive(Deserialize)]
struct RefResponse {
    #[serde(rename = "ref")]
    name: String,
    object: RefObject,
}

#[derive(Deserialize)]
struct RefObject {
    sha: String,
    #[serde(rename = "type")]
    kind: String,
}

impl GitHubRepository {
    /// Build a provider for `owner/name`, optionally against a GitHub
    /// Enterprise host.
    pub fn new(
        slug: &str,
        token: &str,
        ghe_host: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let (owner, repo) = parse_slug(slug)?;
        let api_base = match ghe_host {
            Some(host) if !host.is_empty() => format!("https://{host}/api/v3"),
            _ => "https://api.github.com".to_string(),
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(GitHubRepository {
            owner,
            repo,
            api_base,
            token: token.to_string(),
            client,
            cancel,
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}{}", self.api_base, self.owner, self.repo, path)
    }

    fn get(&self, url: &str) -> reqwest::blocking::RequestBuilder {
        self.client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", USER_AGENT)
    }

    fn post(&self, url: &str, body: &serde_json::Value) -> Result<()> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", USER_AGENT)
            .json(body)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(SemrelError::Provider(format!(
                "GitHub API {url} returned {status}: {detail}"
            )));
        }
        Ok(())
    }
}

/// Fold one page of tag refs into `candidates`, skipping annotated-tag
/// objects (only refs pointing directly at a commit carry a usable SHA).
///
/// Returns the raw page length, counted before filtering, so a page full of
/// annotated tags still advances pagination.
fn collect_ref_page(refs: Vec<RefResponse>, candidates: &mut Vec<TagCandidate>) -> usize {
    let page_len = refs.len();
    for reference in refs {
        if reference.object.kind != "commit" {
            continue;
        }
        let tag = reference
            .name
            .strip_prefix("refs/tags/")
            .unwrap_or(&reference.name)
            .to_string();
        candidates.push(TagCandidate::new(tag, reference.object.sha));
    }
    page_len
}

impl Repository for GitHubRepository {
    fn provider(&self) -> &'static str {
        "GitHub"
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn repo(&self) -> &str {
        &self.repo
    }

    fn info(&self) -> Result<RepositoryInfo> {
        self.cancel.check()?;
        let response = self.get(&self.repo_url("")).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SemrelError::Provider(format!(
                "GitHub repository lookup returned {status}"
            )));
        }
        let repo: RepoResponse = response.json()?;
        let default_branch = repo.default_branch.unwrap_or_default();
        if default_branch.is_empty() {
            return Err(SemrelError::NoDefaultBranch);
        }
        Ok(RepositoryInfo {
            default_branch,
            private: repo.private,
        })
    }

    fn commits(&self, since_sha: &str, package_scope: &str) -> Result<Vec<Commit>> {
        self.cancel.check()?;
        let mut url = self.repo_url(&format!("/commits?per_page={PAGE_SIZE}"));
        if !since_sha.is_empty() {
            url.push_str(&format!("&sha={since_sha}"));
        }
        let response = self.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SemrelError::Provider(format!(
                "GitHub commit listing returned {status}"
            )));
        }
        let commits: Vec<CommitResponse> = response.json()?;
        Ok(commits
            .into_iter()
            .map(|c| Commit::classify(&c.sha, &c.commit.message, package_scope))
            .collect())
    }

    fn release_candidates(&self, _package_scope: &str) -> Result<Vec<TagCandidate>> {
        let mut candidates = Vec::new();
        let mut page = 1u32;
        loop {
            self.cancel.check()?;
            let url =
                self.repo_url(&format!("/git/refs/tags?per_page={PAGE_SIZE}&page={page}"));
            let response = self.get(&url).send()?;
            let status = response.status();
            // An empty repository reports 404 for the tag namespace; that is
            // a first-ever release, not an error.
            if status == reqwest::StatusCode::NOT_FOUND {
                return Ok(candidates);
            }
            if !status.is_success() {
                return Err(SemrelError::Provider(format!(
                    "GitHub tag listing returned {status}"
                )));
            }
            let refs: Vec<RefResponse> = response.json()?;
            if collect_ref_page(refs, &mut candidates) < PAGE_SIZE as usize {
                return Ok(candidates);
            }
            page += 1;
        }
    }

    fn create_release(&self, request: &ReleaseRequest<'_>) -> Result<()> {
        self.cancel.check()?;
        let tag = request.tag_name();

        self.post(
            &self.repo_url("/git/refs"),
            &serde_json::json!({
                "ref": format!("refs/tags/{tag}"),
                "sha": request.release_sha,
            }),
        )?;

        self.post(
            &self.repo_url("/releases"),
            &serde_json::json!({
                "tag_name": tag,
                "name": tag,
                "target_commitish": request.release_sha,
                "body": request.changelog,
                "prerelease": request.is_prerelease(),
            }),
        )?;

        if request.targets_default_branch() {
            self.post(
                &self.repo_url("/git/refs"),
                &serde_json::json!({
                    "ref": format!("refs/heads/{}", request.branch_name()),
                    "sha": request.release_sha,
                }),
            )?;
        }

        Ok(())
    }
}
