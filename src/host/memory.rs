// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! In-memory release host
//!
//! Keeps releases and asset contents in process memory and records every
//! call made against it. Used to preview and test migrations without a
//! network.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MigrateError, Result};
use crate::release::{Asset, Release};

use super::ReleaseHost;

/// A call made against [`InMemoryHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    List { page: usize, per_page: usize },
    View { tag: String },
    Create { tag: String, title: String, notes: String },
    Download { tag: String, name: String },
    Upload { tag: String, name: String },
    Delete { tag: String },
}

impl HostCall {
    /// Whether the call changes remote state
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            HostCall::Create { .. } | HostCall::Upload { .. } | HostCall::Delete { .. }
        )
    }
}

/// Release host backed by a `Vec<Release>`
///
/// Asset bytes are keyed by `(tag, name)`; assets created through
/// [`InMemoryHost::with_release`] get their name as content.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    releases: Vec<Release>,
    contents: HashMap<(String, String), Vec<u8>>,
    calls: Vec<HostCall>,
    next_id: u64,
}

impl InMemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Add a release, assigning ids to it and its assets
    #[must_use]
    pub fn with_release(mut self, mut release: Release) -> Self {
        release.id = self.allocate_id();
        for asset in &mut release.assets {
            asset.id = self.allocate_id();
            self.contents.insert(
                (release.tag_name.clone(), asset.name.clone()),
                asset.name.as_bytes().to_vec(),
            );
        }
        self.releases.push(release);
        self
    }

    /// Every call made so far, in order
    #[must_use]
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Whether any call changed remote state
    #[must_use]
    pub fn mutated(&self) -> bool {
        self.calls.iter().any(HostCall::is_mutation)
    }

    /// Current releases, in listing order
    #[must_use]
    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    #[must_use]
    pub fn release(&self, tag: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.tag_name == tag)
    }

    /// Stored bytes of an asset
    #[must_use]
    pub fn asset_content(&self, tag: &str, name: &str) -> Option<&[u8]> {
        self.contents
            .get(&(tag.to_string(), name.to_string()))
            .map(Vec::as_slice)
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    fn release_mut(&mut self, tag: &str) -> Result<&mut Release> {
        self.releases
            .iter_mut()
            .find(|r| r.tag_name == tag)
            .ok_or_else(|| MigrateError::ReleaseNotFound {
                tag: tag.to_string(),
            })
    }
}

impl ReleaseHost for InMemoryHost {
    fn list_releases(&mut self, _repo: &str, page: usize, per_page: usize) -> Result<Vec<Release>> {
        self.calls.push(HostCall::List { page, per_page });
        let start = page.saturating_sub(1).saturating_mul(per_page);
        Ok(self
            .releases
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect())
    }

    fn view_release(&mut self, _repo: &str, tag: &str) -> Result<Option<Release>> {
        self.calls.push(HostCall::View {
            tag: tag.to_string(),
        });
        Ok(self.release(tag).cloned())
    }

    fn create_release(&mut self, _repo: &str, tag: &str, title: &str, notes: &str) -> Result<()> {
        self.calls.push(HostCall::Create {
            tag: tag.to_string(),
            title: title.to_string(),
            notes: notes.to_string(),
        });
        if self.release(tag).is_some() {
            return Err(MigrateError::Api {
                method: "POST",
                url: format!("memory://releases/{tag}"),
                status: 422,
                message: "already_exists".to_string(),
            });
        }
        let release = Release {
            id: self.allocate_id(),
            tag_name: tag.to_string(),
            name: Some(title.to_string()),
            body: Some(notes.to_string()),
            ..Release::default()
        };
        // Newest first, like the real listing
        self.releases.insert(0, release);
        Ok(())
    }

    fn download_asset(
        &mut self,
        _repo: &str,
        tag: &str,
        name: &str,
        dir: &Path,
    ) -> Result<PathBuf> {
        self.calls.push(HostCall::Download {
            tag: tag.to_string(),
            name: name.to_string(),
        });
        let release = self.release(tag).ok_or_else(|| MigrateError::ReleaseNotFound {
            tag: tag.to_string(),
        })?;
        if release.asset(name).is_none() {
            return Err(MigrateError::AssetNotFound {
                tag: tag.to_string(),
                name: name.to_string(),
            });
        }
        let content = self
            .asset_content(tag, name)
            .map(<[u8]>::to_vec)
            .unwrap_or_default();
        let path = dir.join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    fn upload_asset(&mut self, _repo: &str, tag: &str, file: &Path) -> Result<()> {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.calls.push(HostCall::Upload {
            tag: tag.to_string(),
            name: name.clone(),
        });
        let content = fs::read(file)?;
        let id = self.allocate_id();
        let size = content.len() as u64;

        let release = self.release_mut(tag)?;
        release.assets.retain(|a| a.name != name);
        release.assets.push(Asset {
            id,
            name: name.clone(),
            size,
        });
        self.contents.insert((tag.to_string(), name), content);
        Ok(())
    }

    fn delete_release(&mut self, _repo: &str, tag: &str) -> Result<()> {
        self.calls.push(HostCall::Delete {
            tag: tag.to_string(),
        });
        self.release_mut(tag)?;
        self.releases.retain(|r| r.tag_name != tag);
        self.contents.retain(|(t, _), _| t != tag);
        Ok(())
    }
}
