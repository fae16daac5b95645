//! GitLab-backed repository provider.
//!
//! Talks to the API v4 on gitlab.com or a self-hosted base URL. The project
//! is addressed by numeric id when configured, otherwise by URL-encoded slug.

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
pub struct GitLabRepository {
    owner: String,
    repo: String,
    api_base: String,
    project: String,
    token: String,
    client: reqwest::blocking::Client,
    cancel: CancellationToken,
}

#[derive(Deserialize)]
struct ProjectResponse {
    default_branch: Option<String>,
    visibility: Option<String>,
}

#[derive(Deserialize)]
struct CommitResponse {
    id: String,
    message: String,
}

#[derive(Deserialize)]
struct TagResponse {
    name: String,
    commit: TagCommit,
}

#[derive(Deserialize)]
struct TagCommit {
    id: String,
}

impl GitLabRepository {
    pub fn new(
        slug: &str,
        token: &str,
        base_url: Option<&str>,
        project_id: Option<u64>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let (owner, repo) = parse_slug(slug)?;
        let api_base = match base_url {
            Some(url) if !url.is_empty() => format!("{}/api/v4", url.trim_end_matches('/')),
            _ => "https://gitlab.com/api/v4".to_string(),
        };
        let project = match project_id {
            Some(id) => id.to_string(),
            None => format!("{owner}%2F{repo}"),
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(GitLabRepository {
            owner,
            repo,
            api_base,
            project,
            token: token.to_string(),
            client,
            cancel,
        })
    }

    fn project_url(&self, path: &str) -> String {
        format!("{}/projects/{}{}", self.api_base, self.project, path)
    }

    fn get(&self, url: &str) -> reqwest::blocking::RequestBuilder {
        self.client
            .get(url)
            .header("PRIVATE-TOKEN", &self.token)
            .header("User-Agent", USER_AGENT)
    }

    fn post(&self, url: &str, body: &serde_json::Value) -> Result<()> {
        let response = self
            .client
            .post(url)
            .header("PRIVATE-TOKEN", &self.token)
            .header("User-Agent", USER_AGENT)
            .json(body)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(SemrelError::Provider(format!(
                "GitLab API {url} returned {status}: {detail}"
            )));
        }
        Ok(())
    }
}

/// Fold one page of tags into `candidates` and report the page length, so
/// the caller keeps draining until a short page.
fn collect_tag_page(tags: Vec<TagResponse>, candidates: &mut Vec<TagCandidate>) -> usize {
    let page_len = tags.len();
    for tag in tags {
        candidates.push(TagCandidate::new(tag.name, tag.commit.id));
    }
    page_len
}

impl Repository for GitLabRepository {
    fn provider(&self) -> &'static str {
        "GitLab"
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn repo(&self) -> &str {
        &self.repo
    }

    fn info(&self) -> Result<RepositoryInfo> {
        self.cancel.check()?;
        let response = self.get(&self.project_url("")).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SemrelError::Provider(format!(
                "GitLab project lookup returned {status}"
            )));
        }
        let project: ProjectResponse = response.json()?;
        let default_branch = project.default_branch.unwrap_or_default();
        if default_branch.is_empty() {
            return Err(SemrelError::NoDefaultBranch);
        }
        Ok(RepositoryInfo {
            default_branch,
            private: project.visibility.as_deref() != Some("public"),
        })
    }

    fn commits(&self, since_sha: &str, package_scope: &str) -> Result<Vec<Commit>> {
        self.cancel.check()?;
        let mut url = self.project_url(&format!("/repository/commits?per_page={PAGE_SIZE}"));
        if !since_sha.is_empty() {
            url.push_str(&format!("&ref_name={since_sha}"));
        }
        let response = self.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SemrelError::Provider(format!(
                "GitLab commit listing returned {status}"
            )));
        }
        let commits: Vec<CommitResponse> = response.json()?;
        Ok(commits
            .into_iter()
            .map(|c| Commit::classify(&c.id, &c.message, package_scope))
            .collect())
    }

    fn release_candidates(&self, _package_scope: &str) -> Result<Vec<TagCandidate>> {
        let mut candidates = Vec::new();
        let mut page = 1u32;
        loop {
            self.cancel.check()?;
            let url = self.project_url(&format!(
                "/repository/tags?per_page={PAGE_SIZE}&page={page}"
            ));
            let response = self.get(&url).send()?;
            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Ok(candidates);
            }
            if !status.is_success() {
                return Err(SemrelError::Provider(format!(
                    "GitLab tag listing returned {status}"
                )));
            }
            let tags: Vec<TagResponse> = response.json()?;
            if collect_tag_page(tags, &mut candidates) < PAGE_SIZE as usize {
                return Ok(candidates);
            }
            page += 1;
        }
    }

    fn create_release(&self, request: &ReleaseRequest<'_>) -> Result<()> {
        self.cancel.check()?;
        let tag = request.tag_name();

        self.post(
            &self.project_url("/repository/tags"),
            &serde_json::json!({
                "tag_name": tag,
                "ref": request.release_sha,
            }),
        )?;

        self.post(
            &self.project_url("/releases"),
            &serde_json::json!({
                "tag_name": tag,
                "name": tag,
                "description": request.changelog,
            }),
        )?;

        if request.targets_default_branch() {
            self.post(
                &self.project_url("/repository/branches"),
                &serde_json::json!({
                    "branch": request.branch_name(),
                    "ref": request.release_sha,
                }),
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_validates_the_slug() {
        let err = GitLabRepository::new("bad", "token", None, None, CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, SemrelError::MalformedSlug(_)));
    }

    #[test]
    fn project_id_takes_precedence_over_encoded_slug() {
        let repo = GitLabRepository::new(
            "owner/repo",
            "token",
            None,
            Some(42),
            CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(
            repo.project_url("/repository/tags"),
            "https://gitlab.com/api/v4/projects/42/repository/tags"
        );
    }

    #[test]
    fn slug_is_url_encoded_without_project_id() {
        let repo =
            GitLabRepository::new("owner/repo", "token", None, None, CancellationToken::new())
                .unwrap();
        assert_eq!(
            repo.project_url(""),
            "https://gitlab.com/api/v4/projects/owner%2Frepo"
        );
    }

    #[test]
    fn base_url_override_is_normalized() {
        let repo = GitLabRepository::new(
            "owner/repo",
            "token",
            Some("https://gitlab.example.com/"),
            None,
            CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(repo.api_base, "https://gitlab.example.com/api/v4");
        assert_eq!(repo.provider(), "GitLab");
    }

    #[test]
    fn full_tag_page_keeps_pagination_going() {
        let tags: Vec<TagResponse> = (0..PAGE_SIZE)
            .map(|i| TagResponse {
                name: format!("v1.0.{i}"),
                commit: TagCommit {
                    id: format!("sha-{i}"),
                },
            })
            .collect();
        let mut candidates = Vec::new();
        assert_eq!(collect_tag_page(tags, &mut candidates), PAGE_SIZE as usize);
        assert_eq!(candidates.len(), PAGE_SIZE as usize);
        assert_eq!(candidates[0].tag, "v1.0.0");
        assert_eq!(candidates[0].sha, "sha-0");
    }

    #[test]
    fn short_tag_page_ends_the_drain() {
        let tags = vec![TagResponse {
            name: "v2.0.0".to_string(),
            commit: TagCommit {
                id: "head".to_string(),
            },
        }];
        let mut candidates = Vec::new();
        assert!(collect_tag_page(tags, &mut candidates) < PAGE_SIZE as usize);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn canceled_token_aborts_fetches() {
        let cancel = CancellationToken::new();
        let repo =
            GitLabRepository::new("owner/repo", "token", None, None, cancel.clone()).unwrap();
        cancel.cancel();
        assert!(matches!(repo.info(), Err(SemrelError::Canceled)));
        assert!(matches!(
            repo.release_candidates(""),
            Err(SemrelError::Canceled)
        ));
    }
}
