// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Migration configuration and fixed naming constants

use crate::error::{MigrateError, Result};

/// Repository migrated when nothing else is configured
pub const DEFAULT_REPOSITORY: &str = "fishbatteryapp/fishbattery-cape-bridge";

/// Environment variable overriding the repository
pub const REPOSITORY_ENV: &str = "CAPE_BRIDGE_REPO";

/// Every migrated asset file name starts with this prefix
pub const ASSET_PREFIX: &str = "fishbattery-cape-bridge-";

/// Extension (without the dot) of migrated asset files
pub const ASSET_EXTENSION: &str = "jar";

/// Number of releases requested per page when listing
pub const PAGE_SIZE: usize = 100;

/// Options recognized by the migration entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    /// Repository as `owner/name`
    pub repository: String,
    /// Delete the legacy releases (and their tags) once migrated
    pub delete_old: bool,
    /// Only log what would be done; perform no remote writes
    pub dry_run: bool,
}

impl MigrationConfig {
    /// Create a configuration for `repository` with deletion and dry run disabled
    ///
    /// # Errors
    /// Returns `InvalidRepository` unless `repository` looks like `owner/name`
    pub fn new(repository: impl Into<String>) -> Result<Self> {
        let repository = repository.into().trim().to_string();
        validate_repository(&repository)?;
        Ok(Self {
            repository,
            delete_old: false,
            dry_run: false,
        })
    }

    #[must_use]
    pub fn delete_old(mut self, delete_old: bool) -> Self {
        self.delete_old = delete_old;
        self
    }

    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            delete_old: false,
            dry_run: false,
        }
    }
}

fn validate_repository(repository: &str) -> Result<()> {
    let valid = match repository.split_once('/') {
        Some((owner, name)) => {
            !owner.is_empty()
                && !name.is_empty()
                && !name.contains('/')
                && !repository.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(MigrateError::InvalidRepository(repository.to_string()))
    }
}
