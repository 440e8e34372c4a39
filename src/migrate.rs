// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Consolidation of legacy releases into per-loader releases
//!
//! Each group goes through the same forward-only sequence:
//! ensure the target release, download its assets into a scratch directory,
//! upload them to the target, optionally delete the old releases, and drop
//! the scratch directory. Any failure aborts the whole run.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::TempDir;

use crate::config::{ASSET_EXTENSION, MigrationConfig};
use crate::error::Result;
use crate::host::{ReleaseHost, list_all_releases};
use crate::plan::{MigrationGroup, MigrationPlan};
use crate::tag::is_legacy_tag;

/// Progress of a single group through the migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStage {
    Pending,
    TargetEnsured,
    AssetsFetched,
    AssetsPublished,
    OldReleasesDeleted,
    DeletionSkipped,
    TempCleaned,
}

impl fmt::Display for GroupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupStage::Pending => "pending",
            GroupStage::TargetEnsured => "target ensured",
            GroupStage::AssetsFetched => "assets fetched",
            GroupStage::AssetsPublished => "assets published",
            GroupStage::OldReleasesDeleted => "old releases deleted",
            GroupStage::DeletionSkipped => "deletion skipped",
            GroupStage::TempCleaned => "temp cleaned",
        };
        f.write_str(name)
    }
}

/// Counts of what a run did (or, in dry-run mode, would have done)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Groups processed
    pub groups: usize,
    /// Consolidated releases created
    pub releases_created: usize,
    /// Assets downloaded from legacy releases
    pub assets_downloaded: usize,
    /// Assets uploaded to consolidated releases
    pub assets_uploaded: usize,
    /// Legacy releases deleted
    pub releases_deleted: usize,
}

impl MigrationSummary {
    fn absorb(&mut self, other: MigrationSummary) {
        self.groups += other.groups;
        self.releases_created += other.releases_created;
        self.assets_downloaded += other.assets_downloaded;
        self.assets_uploaded += other.assets_uploaded;
        self.releases_deleted += other.releases_deleted;
    }
}

impl fmt::Display for MigrationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} group(s), {} release(s) created, {} asset(s) downloaded, {} asset(s) uploaded, {} release(s) deleted",
            self.groups,
            self.releases_created,
            self.assets_downloaded,
            self.assets_uploaded,
            self.releases_deleted
        )
    }
}

/// List, group and migrate all legacy releases of `config.repository`
///
/// Returns an empty summary when no legacy release exists.
///
/// # Errors
/// Returns the first host or filesystem error; groups already migrated stay
/// migrated
pub fn run_migration<H: ReleaseHost + ?Sized>(
    config: &MigrationConfig,
    host: &mut H,
) -> Result<MigrationSummary> {
    let releases = list_all_releases(host, &config.repository)?;
    debug!(
        "Found {} published release(s) in {}",
        releases.len(),
        config.repository
    );

    let plan = MigrationPlan::build(&releases);
    if plan.is_empty() {
        info!("No legacy releases found to migrate.");
        return Ok(MigrationSummary::default());
    }

    let mut summary = MigrationSummary::default();
    for group in plan.groups() {
        summary.absorb(migrate_group(config, host, group)?);
    }

    info!("Release migration complete.");
    Ok(summary)
}

/// Migrate a single group into its consolidated release
///
/// # Errors
/// Returns the first host or filesystem error
pub fn migrate_group<H: ReleaseHost + ?Sized>(
    config: &MigrationConfig,
    host: &mut H,
    group: &MigrationGroup,
) -> Result<MigrationSummary> {
    let repo = config.repository.as_str();
    let new_tag = group.new_tag();
    let mut summary = MigrationSummary {
        groups: 1,
        ..MigrationSummary::default()
    };
    let mut stage = GroupStage::Pending;

    info!("Migrating -> {new_tag} ({} assets)", group.assets().len());

    if ensure_release(config, host, &new_tag, &group.title(), &group.notes())? {
        summary.releases_created += 1;
    }
    advance(&new_tag, &mut stage, GroupStage::TargetEnsured);

    let temp_dir = tempfile::Builder::new()
        .prefix(&format!(
            "fb-cape-migrate-{}-{}-",
            group.mod_version(),
            group.loader()
        ))
        .tempdir()?;
    debug!("Using scratch directory {}", temp_dir.path().display());

    for asset in group.unique_assets() {
        if config.dry_run {
            info!("[dry-run] would download {} from {}", asset.name, asset.tag);
            continue;
        }
        host.download_asset(repo, &asset.tag, &asset.name, temp_dir.path())?;
        summary.assets_downloaded += 1;
    }
    advance(&new_tag, &mut stage, GroupStage::AssetsFetched);

    if config.dry_run {
        let count = group.unique_assets().len();
        if count > 0 {
            info!("[dry-run] would upload {count} asset(s) to {new_tag}");
        }
    } else {
        for file in staged_files(temp_dir.path())? {
            debug!("Uploading {} to {new_tag}", file.display());
            host.upload_asset(repo, &new_tag, &file)?;
            summary.assets_uploaded += 1;
        }
    }
    advance(&new_tag, &mut stage, GroupStage::AssetsPublished);

    if config.delete_old {
        for old_tag in group.old_tags() {
            if !is_legacy_tag(old_tag) {
                continue;
            }
            if config.dry_run {
                info!("[dry-run] would delete old release {old_tag}");
                continue;
            }
            host.delete_release(repo, old_tag)?;
            summary.releases_deleted += 1;
        }
        advance(&new_tag, &mut stage, GroupStage::OldReleasesDeleted);
    } else {
        advance(&new_tag, &mut stage, GroupStage::DeletionSkipped);
    }

    cleanup_temp_dir(temp_dir);
    advance(&new_tag, &mut stage, GroupStage::TempCleaned);

    Ok(summary)
}

/// Make sure the release `tag` exists, creating it when the host reports it missing
///
/// Returns whether a release was (or, in dry-run mode, would be) created.
fn ensure_release<H: ReleaseHost + ?Sized>(
    config: &MigrationConfig,
    host: &mut H,
    tag: &str,
    title: &str,
    notes: &str,
) -> Result<bool> {
    if host.view_release(&config.repository, tag)?.is_some() {
        debug!("Release {tag} already exists");
        return Ok(false);
    }

    if config.dry_run {
        info!("[dry-run] would create release {tag}");
    } else {
        host.create_release(&config.repository, tag, title, notes)?;
        info!("Created release {tag}");
    }
    Ok(true)
}

/// Asset files waiting in the scratch directory, in name order
fn staged_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_asset = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == ASSET_EXTENSION);
        if is_asset {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn cleanup_temp_dir(temp_dir: TempDir) {
    let path = temp_dir.path().to_path_buf();
    if let Err(e) = temp_dir.close() {
        warn!(
            "Failed to remove scratch directory {}: {e}",
            path.display()
        );
    }
}

fn advance(tag: &str, stage: &mut GroupStage, next: GroupStage) {
    debug!("{tag}: {stage} -> {next}");
    *stage = next;
}
