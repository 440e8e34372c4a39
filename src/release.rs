// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Release and asset records as returned by the hosting API
//!
//! Only the fields the migration reads are modelled. Missing optional fields
//! deserialize to their defaults so partial payloads (and hand-built test
//! fixtures) are accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A release on the hosting platform
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Release {
    /// Numeric release id, used by mutating API calls
    #[serde(default)]
    pub id: u64,
    /// Git tag the release is attached to
    #[serde(default)]
    pub tag_name: String,
    /// Release title
    #[serde(default)]
    pub name: Option<String>,
    /// Release notes
    #[serde(default)]
    pub body: Option<String>,
    /// Draft releases are never migrated
    #[serde(default)]
    pub draft: bool,
    /// Upload endpoint template (e.g. `https://uploads.github.com/...{?name,label}`)
    #[serde(default)]
    pub upload_url: Option<String>,
    /// Publication time, absent for drafts
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Attached binary files
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A binary file attached to a release
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Asset {
    /// Numeric asset id
    #[serde(default)]
    pub id: u64,
    /// File name, e.g. `fishbattery-cape-bridge-1.2.0-1.20.1-fabric.jar`
    #[serde(default)]
    pub name: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
}

impl Release {
    /// Build a published release with the given tag and asset names
    #[must_use]
    pub fn new(tag_name: &str, asset_names: &[&str]) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            name: Some(tag_name.to_string()),
            assets: asset_names
                .iter()
                .map(|name| Asset {
                    name: (*name).to_string(),
                    ..Asset::default()
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Find an attached asset by exact name
    #[must_use]
    pub fn asset(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.name == name)
    }

    /// Tag name with surrounding whitespace removed
    #[must_use]
    pub fn tag(&self) -> &str {
        self.tag_name.trim()
    }
}
