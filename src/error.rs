//! Error types.

use crate::config::ConfigReport;
use trust_dns_proto::error::ProtoError;

/// Error enumerates the possible DDNS Gate error states.
///
/// Authentication failures are not errors: they are per-request
/// [`Outcome`][crate::auth::Outcome]s that are only ever reported as `badauth`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a loaded configuration document parses, but breaks one or more of the
    /// structural rules checked by [`Config::validate`][crate::config::Config::validate]. The
    /// report lists every violation, one per line.
    #[error("invalid configuration:\n{0}")]
    InvalidConfig(ConfigReport),

    /// Returned when a requested hostname is not a valid DNS name.
    #[error("invalid hostname \"{0}\"")]
    InvalidHostname(String, #[source] ProtoError),

    /// Returned when the [`UpdateExecutor`][crate::update::UpdateExecutor] can't apply an
    /// authenticated update.
    #[error("update failed: {0}")]
    Update(String),

    /// Returned when a new password hash can't be produced.
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when processing JSON from disk (e.g.
    /// [trying to load a `Config`][crate::config::Config::try_from_file]) fails due to invalid
    /// JSON content, or content of the wrong shape.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),
}
