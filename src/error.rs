use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Errors that abort a snapshot run. Every variant names the group or path
/// involved so the caller can tell which source failed.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The HTTP client itself could not be constructed.
    #[error("failed to build http client: {0}")]
    ClientSetup(#[source] reqwest::Error),

    /// Network or HTTP failure reaching the meetup API for one group.
    #[error("request to meetup failed for group {group}: {source}")]
    Transport {
        group: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API responded but reported errors in its envelope.
    #[error("meetup returned errors for group {group}: {message}")]
    RemoteApi { group: String, message: String },

    /// A response or event node is missing required structure.
    #[error("malformed data for group {group}: {message}")]
    MalformedData { group: String, message: String },

    /// `groupByUrlname` resolved to null, i.e. the urlname is not recognized.
    #[error("meetup does not know group {group}")]
    UnknownGroup { group: String },

    /// Reading or writing the snapshot file failed.
    #[error("snapshot I/O failed for {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file exists but does not decode, or encoding failed.
    #[error("snapshot at {path} is not valid: {message}")]
    SnapshotFormat { path: PathBuf, message: String },

    #[error("configuration at {path} is invalid: {message}")]
    Config { path: PathBuf, message: String },
}
