// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
// Allow multiple crate versions for Windows-only dependencies (we only target Linux)
#![allow(clippy::multiple_crate_versions)]
//! Release layout migration (relayout) - Main Application
//!
//! Consolidates the legacy per-Minecraft-version releases of a GitHub
//! repository into one release per mod version and loader.
//!
//! The application supports:
//! - Previewing the migration plan without touching any release (`--dry-run`)
//! - Deleting the legacy releases and tags once migrated (`--delete-old`)
//! - Targeting another repository (`--repo` or `CAPE_BRIDGE_REPO`)

mod cli;

use std::io::Write;
use std::process::exit;

use clap::Parser;
use env_logger::Env;
use log::info;

use cli::Cli;
use relayout::{DEFAULT_REPOSITORY, GitHubClient, MigrationConfig, run_migration};

/// Main application entry point
///
/// Builds the migration configuration from the command line, runs the
/// migration against GitHub and exits non-zero on the first error.
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        exit(1);
    }
}

fn run(cli: Cli) -> relayout::Result<()> {
    let repository = cli.repo.unwrap_or_else(|| DEFAULT_REPOSITORY.to_string());
    let config = MigrationConfig::new(repository)?
        .delete_old(cli.delete_old)
        .dry_run(cli.dry_run);

    if config.dry_run {
        info!("Dry run for {}: no release will be changed", config.repository);
    }

    let mut host = GitHubClient::from_env();
    let summary = run_migration(&config, &mut host)?;

    if summary.groups > 0 {
        info!("Summary: {summary}");
    }
    Ok(())
}

/// Progress lines go to stdout through `log`; `RUST_LOG` overrides the default level
fn init_logging(verbose: bool) {
    let default_level = if verbose {
        "warn,relayout=debug"
    } else {
        "warn,relayout=info"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            if record.level() <= log::Level::Warn {
                writeln!(buf, "{}: {}", record.level(), record.args())
            } else {
                writeln!(buf, "{}", record.args())
            }
        })
        .target(env_logger::Target::Stdout)
        .init();
}
