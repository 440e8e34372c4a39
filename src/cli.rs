// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
// CLI argument definitions for relayout
//
// Separated from main.rs so that build.rs can include this file
// to generate the man page via clap_mangen.

use clap::Parser;

/// CLI argument parser - bools required for clap flag parsing
#[derive(Parser)]
#[command(
    name = "relayout",
    version,
    about = "Consolidate per-Minecraft-version releases into per-loader releases"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Repository to migrate, as OWNER/NAME
    #[arg(long = "repo", value_name = "OWNER/NAME", env = "CAPE_BRIDGE_REPO")]
    pub repo: Option<String>,

    /// Delete the legacy releases and their tags after migrating
    #[arg(long = "delete-old")]
    pub delete_old: bool,

    /// Show what would be done without changing any release
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Make the operation more talkative
    #[arg(short, long)]
    pub verbose: bool,
}
