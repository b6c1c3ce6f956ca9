//! Error types shared by the decoder, the assembler and the storage layer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while decoding share links and assembling configurations
#[derive(Debug, Error)]
pub enum Error {
    /// No registered decoder recognizes the link's scheme
    #[error("unsupported share link scheme: {scheme}")]
    UnsupportedScheme {
        /// The scheme found in the link, or the raw prefix when none was found
        scheme: String,
    },

    /// The scheme was recognized but the link body is structurally broken
    #[error("malformed endpoint: {0}")]
    MalformedEndpoint(String),

    /// A descriptor was rejected at construction time
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// Assembly attempted with a missing inbound or outbound set
    #[error("incomplete configuration: {0}")]
    IncompleteConfiguration(String),

    /// Unknown log level name
    #[error("unknown log level: {0}")]
    InvalidLogLevel(String),

    /// Reading or writing the configuration file failed
    #[error("failed to access configuration file {}: {source}", path.display())]
    Storage {
        /// The file that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The configuration file exists but its content could not be (de)serialized
    #[error("malformed configuration file {}: {source}", path.display())]
    StorageFormat {
        /// The file that was being accessed
        path: PathBuf,
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Returns `true` for failures raised by the storage layer.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::StorageFormat { .. })
    }
}
