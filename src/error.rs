//! Error types for RPC calls and asset downloads.
//!
//! Every failure the client can report is a variant of [`ContentDmError`],
//! so callers can branch on the kind instead of matching message text.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// reqwest failed to connect, resolve, or read the response.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The byte stream broke off with an I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while talking to a CONTENTdm server.
#[derive(Debug, Error)]
pub enum ContentDmError {
    /// No server descriptor is set; nothing was sent.
    #[error("CONTENTdm server settings are not set")]
    NotConfigured,

    /// The server answered with a status other than 200.
    #[error("request failed with HTTP {status}: {url}")]
    RequestFailed {
        /// The requested URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body was not valid JSON for the expected result.
    #[error("malformed JSON response from {url}: {source}")]
    MalformedResponse {
        /// The requested URL.
        url: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Connection, DNS, or stream failure reported by the transport.
    #[error("transport error requesting {url}: {source}")]
    Transport {
        /// The requested URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: TransportError,
    },

    /// Publishing the finished download under its final name failed.
    #[error("failed to rename {from} to {to}: {source}")]
    RenameFailed {
        /// The partial file, still on disk.
        from: PathBuf,
        /// The intended final path.
        to: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Creating or writing the partial file failed.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The asset filename is empty or would resolve outside the target directory.
    #[error("invalid asset filename: {filename:?}")]
    InvalidFilename {
        /// The rejected filename.
        filename: String,
    },

    /// The default HTTP transport could not be built.
    #[error("failed to initialize HTTP transport: {0}")]
    Init(#[source] TransportError),
}

impl ContentDmError {
    /// Creates a request-failed error.
    pub fn request_failed(url: impl Into<String>, status: u16) -> Self {
        Self::RequestFailed {
            url: url.into(),
            status,
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            source,
        }
    }

    /// Creates a transport error.
    pub fn transport(url: impl Into<String>, source: impl Into<TransportError>) -> Self {
        Self::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Creates a rename error.
    pub fn rename_failed(
        from: impl Into<PathBuf>,
        to: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::RenameFailed {
            from: from.into(),
            to: to.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid-filename error.
    pub fn invalid_filename(filename: impl Into<String>) -> Self {
        Self::InvalidFilename {
            filename: filename.into(),
        }
    }

    /// Returns the HTTP status code for [`RequestFailed`](Self::RequestFailed).
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>` for ContentDmError: every
// variant needs the url or path the source error lacks.
