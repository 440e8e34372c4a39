// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Release layout migration library
//!
//! Consolidates legacy releases tagged per Minecraft version
//! (`v<mc>-<mod>-<loader>`) into one release per mod version and loader
//! (`v<mod>-<loader>`), carrying every matching asset over and optionally
//! deleting the old releases.

pub mod config;
pub mod error;
pub mod host;
pub mod migrate;
pub mod plan;
pub mod release;
pub mod tag;

// Re-export commonly used items at the crate root for convenience
pub use config::{DEFAULT_REPOSITORY, MigrationConfig, REPOSITORY_ENV};
pub use error::{MigrateError, Result};
pub use host::{GitHubClient, HostCall, InMemoryHost, ReleaseHost, list_all_releases};
pub use migrate::{MigrationSummary, migrate_group, run_migration};
pub use plan::{AssetRef, GroupKey, MigrationGroup, MigrationPlan};
pub use release::{Asset, Release};
pub use tag::{LegacyTag, Loader, consolidated_tag, is_legacy_tag};
