// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! GitHub REST API release host
//!
//! Blocking client over `attohttpc`. Credentials come from `GH_TOKEN` or
//! `GITHUB_TOKEN` when set; public repositories can be listed without them.

use std::fs;
use std::path::{Path, PathBuf};

use attohttpc::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, LOCATION, USER_AGENT};
use attohttpc::{Response, Session, StatusCode};
use log::debug;
use serde::Serialize;

use crate::error::{MigrateError, Result};
use crate::release::Release;

use super::ReleaseHost;

/// Default GitHub API endpoint
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Environment variable overriding the API endpoint (set on GitHub Actions runners)
pub const API_URL_ENV: &str = "GITHUB_API_URL";

/// Environment variables searched, in order, for an API token
pub const TOKEN_ENVS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const BINARY_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Serialize)]
struct NewRelease<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
    prerelease: bool,
}

/// Release host backed by the GitHub REST API
pub struct GitHubClient {
    session: Session,
    api_base: String,
}

impl GitHubClient {
    /// Create a client for `api_base`, authenticating with `token` when given
    #[must_use]
    pub fn new(api_base: &str, token: Option<&str>) -> Self {
        let mut session = Session::new();
        session.header(USER_AGENT, format!("relayout/{}", env!("CARGO_PKG_VERSION")));
        session.header(ACCEPT, JSON_MEDIA_TYPE);
        session.header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = token {
            session.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        Self {
            session,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from `GITHUB_API_URL` and `GH_TOKEN`/`GITHUB_TOKEN`
    #[must_use]
    pub fn from_env() -> Self {
        let api_base = std::env::var(API_URL_ENV).unwrap_or_else(|_| GITHUB_API_URL.to_string());
        let token = TOKEN_ENVS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty());

        if token.is_none() {
            debug!("No GitHub token found in environment, using anonymous access");
        }

        Self::new(&api_base, token.as_deref())
    }

    fn repo_url(&self, repo: &str, path: &str) -> String {
        format!("{}/repos/{repo}/{path}", self.api_base)
    }

    fn require_release(&mut self, repo: &str, tag: &str) -> Result<Release> {
        self.view_release(repo, tag)?
            .ok_or_else(|| MigrateError::ReleaseNotFound {
                tag: tag.to_string(),
            })
    }

    fn delete_asset(&self, repo: &str, asset_id: u64) -> Result<()> {
        let url = self.repo_url(repo, &format!("releases/assets/{asset_id}"));
        let resp = self.session.delete(&url).send()?;
        check_status("DELETE", &url, resp)?;
        Ok(())
    }
}

impl ReleaseHost for GitHubClient {
    fn list_releases(&mut self, repo: &str, page: usize, per_page: usize) -> Result<Vec<Release>> {
        let url = self.repo_url(repo, "releases");
        debug!("GET {url} (page {page})");

        let resp = self
            .session
            .get(&url)
            .param("per_page", per_page)
            .param("page", page)
            .send()?;
        let resp = check_status("GET", &url, resp)?;

        let body = resp.text()?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn view_release(&mut self, repo: &str, tag: &str) -> Result<Option<Release>> {
        let url = self.repo_url(repo, &format!("releases/tags/{tag}"));
        let resp = self.session.get(&url).send()?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let resp = check_status("GET", &url, resp)?;
        Ok(Some(serde_json::from_str(&resp.text()?)?))
    }

    fn create_release(&mut self, repo: &str, tag: &str, title: &str, notes: &str) -> Result<()> {
        let url = self.repo_url(repo, "releases");
        let payload = serde_json::to_vec(&NewRelease {
            tag_name: tag,
            name: title,
            body: notes,
            draft: false,
            prerelease: false,
        })?;

        let resp = self
            .session
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .bytes(payload)
            .send()?;
        check_status("POST", &url, resp)?;
        Ok(())
    }

    fn download_asset(
        &mut self,
        repo: &str,
        tag: &str,
        name: &str,
        dir: &Path,
    ) -> Result<PathBuf> {
        let release = self.require_release(repo, tag)?;
        let asset = release
            .asset(name)
            .ok_or_else(|| MigrateError::AssetNotFound {
                tag: tag.to_string(),
                name: name.to_string(),
            })?;

        let url = self.repo_url(repo, &format!("releases/assets/{}", asset.id));
        debug!("Downloading {name} from {url}");

        // Asset bytes are served from a signed storage URL that rejects our
        // Authorization header, so the redirect is followed by hand.
        let resp = self
            .session
            .get(&url)
            .header(ACCEPT, BINARY_MEDIA_TYPE)
            .follow_redirects(false)
            .send()?;

        let resp = if resp.status().is_redirection() {
            let location = redirect_target(&resp).ok_or_else(|| MigrateError::Api {
                method: "GET",
                url: url.clone(),
                status: resp.status().as_u16(),
                message: "redirect without Location header".to_string(),
            })?;
            let target = attohttpc::get(&location)
                .header(ACCEPT, BINARY_MEDIA_TYPE)
                .send()?;
            check_status("GET", &location, target)?
        } else {
            check_status("GET", &url, resp)?
        };

        let path = dir.join(name);
        let mut file = fs::File::create(&path)?;
        let written = resp.write_to(&mut file)?;
        debug!("Wrote {written} bytes to {}", path.display());
        Ok(path)
    }

    fn upload_asset(&mut self, repo: &str, tag: &str, file: &Path) -> Result<()> {
        let release = self.require_release(repo, tag)?;
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a file: {}", file.display()),
                )
            })?;

        if let Some(existing) = release.asset(&name) {
            debug!("Replacing existing asset {name} on {tag}");
            self.delete_asset(repo, existing.id)?;
        }

        let upload_url = release
            .upload_url
            .as_deref()
            .map(upload_endpoint)
            .ok_or_else(|| MigrateError::MissingUploadUrl {
                tag: tag.to_string(),
            })?;

        let content = fs::read(file)?;
        debug!("Uploading {name} ({} bytes) to {tag}", content.len());

        let resp = self
            .session
            .post(&upload_url)
            .param("name", &name)
            .header(CONTENT_TYPE, BINARY_MEDIA_TYPE)
            .bytes(content)
            .send()?;
        check_status("POST", &upload_url, resp)?;
        Ok(())
    }

    fn delete_release(&mut self, repo: &str, tag: &str) -> Result<()> {
        let release = self.require_release(repo, tag)?;

        let url = self.repo_url(repo, &format!("releases/{}", release.id));
        let resp = self.session.delete(&url).send()?;
        check_status("DELETE", &url, resp)?;

        let ref_url = self.repo_url(repo, &format!("git/refs/tags/{tag}"));
        let resp = self.session.delete(&ref_url).send()?;
        match resp.status() {
            StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
                debug!("Tag ref {tag} already gone");
            }
            _ => {
                check_status("DELETE", &ref_url, resp)?;
            }
        }
        Ok(())
    }
}

/// Strip the RFC 6570 query template from a release `upload_url`
fn upload_endpoint(template: &str) -> String {
    template
        .split_once('{')
        .map_or(template, |(base, _)| base)
        .to_string()
}

fn redirect_target(resp: &Response) -> Option<String> {
    resp.headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(String::from)
}

/// Turn a non-success response into an `Api` error carrying GitHub's message
fn check_status(method: &'static str, url: &str, resp: Response) -> Result<Response> {
    if resp.is_success() {
        return Ok(resp);
    }

    let status = resp.status().as_u16();
    let body = resp.text().unwrap_or_default();
    Err(MigrateError::Api {
        method,
        url: url.to_string(),
        status,
        message: api_message(&body),
    })
}

fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}
