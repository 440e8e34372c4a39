// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Release tag naming schemes
//!
//! Legacy releases were tagged per Minecraft version as
//! `v<mc>-<modVersion>-<loader>` (e.g. `v1.20.1-1.2.0-fabric`). Consolidated
//! releases drop the Minecraft version: `v<modVersion>-<loader>`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::ASSET_EXTENSION;

static LEGACY_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v(?<mc>\d+\.\d+(?:\.\d+)?)-(?<mod>[0-9A-Za-z][0-9A-Za-z.+-]*)-(?<loader>fabric|quilt)$",
    )
    .expect("legacy tag pattern is valid")
});

/// Mod loading platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Loader {
    Fabric,
    Quilt,
}

impl Loader {
    /// Lowercase name as used in tags and file names
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Loader::Fabric => "fabric",
            Loader::Quilt => "quilt",
        }
    }
}

impl fmt::Display for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Loader {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fabric" => Ok(Loader::Fabric),
            "quilt" => Ok(Loader::Quilt),
            other => Err(format!("unknown loader: {other}")),
        }
    }
}

/// A tag in the legacy per-Minecraft-version scheme
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LegacyTag {
    /// Minecraft version, e.g. `1.20.1`
    pub mc: String,
    /// Mod version, e.g. `1.2.0`
    pub mod_version: String,
    pub loader: Loader,
}

impl LegacyTag {
    /// Classify a raw tag
    ///
    /// Returns `None` for anything outside the legacy grammar; such tags are
    /// simply not part of the migration.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        let caps = LEGACY_TAG_RE.captures(tag.trim())?;
        Some(Self {
            mc: caps["mc"].to_string(),
            mod_version: caps["mod"].to_string(),
            loader: caps["loader"].parse().ok()?,
        })
    }

    /// Suffix every asset built for this tag's target ends with: `-<mc>-<loader>.jar`
    #[must_use]
    pub fn asset_suffix(&self) -> String {
        format!("-{}-{}.{ASSET_EXTENSION}", self.mc, self.loader)
    }

    /// Whether `name` ends with this tag's asset suffix, ignoring case
    #[must_use]
    pub fn matches_asset(&self, name: &str) -> bool {
        name.to_lowercase().ends_with(&self.asset_suffix())
    }

    /// Tag of the consolidated release this legacy release migrates into
    #[must_use]
    pub fn consolidated_tag(&self) -> String {
        consolidated_tag(&self.mod_version, self.loader)
    }
}

impl fmt::Display for LegacyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}-{}-{}", self.mc, self.mod_version, self.loader)
    }
}

/// Check whether a tag belongs to the legacy scheme
#[must_use]
pub fn is_legacy_tag(tag: &str) -> bool {
    LegacyTag::parse(tag).is_some()
}

/// Tag of a consolidated release: `v<modVersion>-<loader>`
#[must_use]
pub fn consolidated_tag(mod_version: &str, loader: Loader) -> String {
    format!("v{mod_version}-{loader}")
}

/// Description attached to a newly created consolidated release
#[must_use]
pub fn release_notes(mod_version: &str, loader: Loader) -> String {
    format!(
        "Consolidated {loader} release for version {mod_version}. Includes all supported Minecraft targets."
    )
}
