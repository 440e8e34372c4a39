// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Grouping of legacy releases into consolidation units
//!
//! Legacy releases sharing a mod version and loader are merged into one
//! group, regardless of which Minecraft version they targeted. A group knows
//! which old tags feed it and which assets (per old tag) it will carry over.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::config::{ASSET_EXTENSION, ASSET_PREFIX};
use crate::release::Release;
use crate::tag::{LegacyTag, Loader, consolidated_tag, release_notes};

/// Key of a consolidation group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub mod_version: String,
    pub loader: Loader,
}

impl GroupKey {
    /// Tag of the consolidated release for this key
    #[must_use]
    pub fn new_tag(&self) -> String {
        consolidated_tag(&self.mod_version, self.loader)
    }
}

/// An asset to carry over, located by the old release it lives on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    /// Tag of the legacy release holding the asset
    pub tag: String,
    /// Asset file name
    pub name: String,
}

/// All legacy releases that consolidate into one new release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationGroup {
    pub key: GroupKey,
    old_tags: Vec<String>,
    assets: Vec<AssetRef>,
}

impl MigrationGroup {
    fn new(key: GroupKey) -> Self {
        Self {
            key,
            old_tags: Vec::new(),
            assets: Vec::new(),
        }
    }

    fn add_old_tag(&mut self, tag: &str) {
        if !self.old_tags.iter().any(|t| t == tag) {
            self.old_tags.push(tag.to_string());
        }
    }

    #[must_use]
    pub fn mod_version(&self) -> &str {
        &self.key.mod_version
    }

    #[must_use]
    pub fn loader(&self) -> Loader {
        self.key.loader
    }

    /// Contributing legacy tags, deduplicated, in first-seen order
    #[must_use]
    pub fn old_tags(&self) -> &[String] {
        &self.old_tags
    }

    /// Every matching asset across all contributing releases, in listing order
    #[must_use]
    pub fn assets(&self) -> &[AssetRef] {
        &self.assets
    }

    /// Assets with duplicate names removed; the first occurrence wins
    #[must_use]
    pub fn unique_assets(&self) -> Vec<&AssetRef> {
        let mut seen = HashSet::new();
        self.assets
            .iter()
            .filter(|asset| seen.insert(asset.name.as_str()))
            .collect()
    }

    /// Tag of the consolidated release
    #[must_use]
    pub fn new_tag(&self) -> String {
        self.key.new_tag()
    }

    /// Title of the consolidated release (same as its tag)
    #[must_use]
    pub fn title(&self) -> String {
        self.new_tag()
    }

    /// Description of the consolidated release
    #[must_use]
    pub fn notes(&self) -> String {
        release_notes(&self.key.mod_version, self.key.loader)
    }
}

/// Ordered set of consolidation groups derived from a release listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPlan {
    groups: Vec<MigrationGroup>,
}

impl MigrationPlan {
    /// Fold a release listing into consolidation groups
    ///
    /// Releases whose tag is not a legacy tag are skipped. Groups appear in
    /// the order their first release appears in `releases`.
    #[must_use]
    pub fn build(releases: &[Release]) -> Self {
        let mut groups: Vec<MigrationGroup> = Vec::new();
        let mut index: HashMap<GroupKey, usize> = HashMap::new();

        for release in releases {
            let tag = release.tag();
            let Some(legacy) = LegacyTag::parse(tag) else {
                debug!("Skipping non-legacy tag {tag:?}");
                continue;
            };

            match release.published_at {
                Some(published) => debug!("Classified {legacy} (published {published})"),
                None => debug!("Classified {legacy}"),
            }

            let key = GroupKey {
                mod_version: legacy.mod_version.clone(),
                loader: legacy.loader,
            };
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                groups.push(MigrationGroup::new(key));
                groups.len() - 1
            });
            let group = &mut groups[slot];

            group.add_old_tag(tag);
            for asset in &release.assets {
                if is_candidate_asset(&asset.name) && legacy.matches_asset(&asset.name) {
                    group.assets.push(AssetRef {
                        tag: tag.to_string(),
                        name: asset.name.clone(),
                    });
                }
            }
        }

        Self { groups }
    }

    #[must_use]
    pub fn groups(&self) -> &[MigrationGroup] {
        &self.groups
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Look up a group by mod version and loader
    #[must_use]
    pub fn group(&self, mod_version: &str, loader: Loader) -> Option<&MigrationGroup> {
        self.groups
            .iter()
            .find(|g| g.key.mod_version == mod_version && g.key.loader == loader)
    }
}

/// Whether a file name follows the published asset naming (`<prefix>...<.jar>`)
#[must_use]
pub fn is_candidate_asset(name: &str) -> bool {
    name.starts_with(ASSET_PREFIX)
        && name
            .strip_suffix(ASSET_EXTENSION)
            .is_some_and(|stem| stem.ends_with('.'))
}
