/*!
 * Error types for the scripttm application.
 *
 * This module contains custom error types for the different parts of the
 * application, using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to a translation backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The backend did not answer in time
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
}

/// Errors raised by the translation memory store
#[derive(Error, Debug)]
pub enum StoreError {
    /// A blank Japanese key was used for insertion
    #[error("Japanese key is empty or whitespace-only")]
    BlankKey,

    /// The durable artifact could not be read or written
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The durable artifact is not a valid store document
    #[error("Invalid store document {path:?}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The mandatory backup before a destructive operation failed
    #[error("Backup to {path:?} failed: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while writing export artifacts
#[derive(Error, Debug)]
pub enum ExportError {
    /// File system failure
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// BSON encoding failure
    #[error("BSON encoding failed: {0}")]
    Bson(#[from] bson::ser::Error),

    /// MessagePack encoding failure
    #[error("MessagePack encoding failed: {0}")]
    MessagePack(#[from] rmp_serde::encode::Error),
}
