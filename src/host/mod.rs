// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Access to the remote release host
//!
//! The migration only talks to the host through [`ReleaseHost`], so the same
//! code runs against GitHub ([`GitHubClient`]) or an in-memory double
//! ([`InMemoryHost`]) that records every call.

pub mod github;
pub mod memory;

use std::path::{Path, PathBuf};

use log::debug;

use crate::config::PAGE_SIZE;
use crate::error::Result;
use crate::release::Release;

pub use github::GitHubClient;
pub use memory::{HostCall, InMemoryHost};

/// Operations the migration needs from a release host
pub trait ReleaseHost {
    /// Fetch one page (1-based) of releases, newest first as the host orders them
    ///
    /// # Errors
    /// Returns error if the request fails or the payload cannot be parsed
    fn list_releases(&mut self, repo: &str, page: usize, per_page: usize) -> Result<Vec<Release>>;

    /// Look up a release by tag; `Ok(None)` means it does not exist
    ///
    /// # Errors
    /// Returns error for any failure other than "not found"
    fn view_release(&mut self, repo: &str, tag: &str) -> Result<Option<Release>>;

    /// Create a published release for an existing or new tag
    ///
    /// # Errors
    /// Returns error if the release cannot be created
    fn create_release(&mut self, repo: &str, tag: &str, title: &str, notes: &str) -> Result<()>;

    /// Download the asset named `name` from release `tag` into `dir`
    ///
    /// # Returns
    /// Path of the written file
    ///
    /// # Errors
    /// Returns error if the release or asset is missing or the transfer fails
    fn download_asset(&mut self, repo: &str, tag: &str, name: &str, dir: &Path)
    -> Result<PathBuf>;

    /// Upload `file` to release `tag`, replacing a same-named asset
    ///
    /// # Errors
    /// Returns error if the release is missing or the upload fails
    fn upload_asset(&mut self, repo: &str, tag: &str, file: &Path) -> Result<()>;

    /// Delete release `tag` together with its git tag
    ///
    /// # Errors
    /// Returns error if the release is missing or cannot be deleted
    fn delete_release(&mut self, repo: &str, tag: &str) -> Result<()>;
}

/// List every non-draft release of `repo`, in host order
///
/// Pages of [`PAGE_SIZE`] are requested until a page comes back empty or
/// short.
///
/// # Errors
/// Propagates the first failing page request
pub fn list_all_releases<H: ReleaseHost + ?Sized>(host: &mut H, repo: &str) -> Result<Vec<Release>> {
    let mut releases = Vec::new();
    let mut page = 1;

    loop {
        let batch = host.list_releases(repo, page, PAGE_SIZE)?;
        let count = batch.len();
        debug!("Fetched page {page} of releases for {repo} ({count} entries)");

        releases.extend(batch.into_iter().filter(|r| !r.draft));

        if count < PAGE_SIZE {
            break;
        }
        page += 1;
    }

    Ok(releases)
}
