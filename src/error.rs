// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Error types for release migration
//!
//! Every failure that reaches the process boundary is one of these variants.
//! Tags that do not match the legacy naming scheme are not errors and never
//! show up here.

use thiserror::Error;

/// Result type alias for migration operations
pub type Result<T> = std::result::Result<T, MigrateError>;

/// Main error type for all migration operations
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Transport-level HTTP failure (DNS, TLS, connection reset, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] attohttpc::Error),

    /// Local filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Response body was not the JSON we expected
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered with a non-success status
    #[error("{method} {url} failed ({status}): {message}")]
    Api {
        /// HTTP method of the failed request
        method: &'static str,
        /// Request URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Message returned by the API, or the raw body
        message: String,
    },

    /// A release that must exist for the operation was not found
    #[error("Release {tag} not found")]
    ReleaseNotFound {
        /// Tag of the missing release
        tag: String,
    },

    /// The named asset is not attached to the release
    #[error("No asset named {name} on release {tag}")]
    AssetNotFound {
        /// Tag of the release that was searched
        tag: String,
        /// Asset name that was requested
        name: String,
    },

    /// Release metadata carried no upload URL
    #[error("Release {tag} has no upload URL")]
    MissingUploadUrl {
        /// Tag of the release
        tag: String,
    },

    /// Repository identifier is not `owner/name`
    #[error("Invalid repository '{0}': expected OWNER/NAME")]
    InvalidRepository(String),
}
