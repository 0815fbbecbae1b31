use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by user-supplied version generators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Core error type for swpack operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No worker entries configured")]
    NoEntries,

    #[error("Invalid worker entry #{position}: {reason}")]
    InvalidEntry { position: usize, reason: String },

    #[error("Destination `{destination}` is used by more than one worker entry")]
    DuplicateDestination { destination: String },

    #[error("Entry index {index} is used by more than one worker entry")]
    DuplicateIndex { index: usize },

    #[error("No package.json found for package `{package}` at {path}")]
    ManifestNotFound { package: String, path: PathBuf },

    #[error("Failed to parse package.json for `{package}`: {source}")]
    ManifestParse {
        package: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Package `{package}` has no `module` field and cannot be loaded as an ES module")]
    UnsupportedModule { package: String },

    #[error("{destination} not found in bundle")]
    DestinationNotInOutput { destination: String },

    #[error("No version token computed for `{destination}`")]
    MissingVersion { destination: String },

    #[error("Module not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Malformed virtual module id `{id}`")]
    MalformedIdentifier { id: String },

    #[error("Virtual module id `{id}` refers to unknown entry index {index}")]
    UnknownEntry { id: String, index: usize },

    #[error("Import span at offset {start} does not match the source: {reason}")]
    InvalidSpan { start: usize, reason: &'static str },

    #[error("Version generator for `{destination}` failed: {source}")]
    VersionGenerator {
        destination: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to parse imports of {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl Error {
    /// Whether this error is a configuration problem detected before any build work.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigRead { .. }
                | Self::ConfigParse { .. }
                | Self::NoEntries
                | Self::InvalidEntry { .. }
                | Self::DuplicateDestination { .. }
                | Self::DuplicateIndex { .. }
        )
    }

    pub(crate) fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }
}

/// Map a file read failure to `NotFound` when the file is missing.
pub(crate) fn read_error(path: &std::path::Path, err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        Error::not_found(path)
    } else {
        Error::Io(err)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
