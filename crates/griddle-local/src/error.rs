// Griddle - Asset sync for DCC pipelines
// Copyright (C) 2025 Griddle Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Error types for local sync operations

use griddle_remote::RemoteError;
use griddle_store::StoreError;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Result type alias for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced by the sync engine and its components
///
/// Every variant maps to a stable [`kind`](SyncError::kind) string that callers
/// across a process boundary can match on.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Asset, version, index entry or local folder does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Filesystem failure
    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Remote unreachable or returned an unusable response
    #[error("network error: {0}")]
    Network(String),

    /// Remote refused the request
    #[error("remote rejected request ({status}): {message}")]
    RemoteRejected { status: u16, message: String },

    /// Remote requires a login
    #[error("not authenticated")]
    Unauthenticated,

    /// Archive data is corrupt or unsafe
    #[error("invalid archive: {0}")]
    Format(String),

    /// Persisted state could not be read or written
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Caller supplied an unusable argument
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SyncError {
    pub fn not_found(what: impl Into<String>) -> Self {
        SyncError::NotFound(what.into())
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        SyncError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        SyncError::Format(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        SyncError::InvalidInput(msg.into())
    }

    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::NotFound(_) => "not_found",
            SyncError::Io { .. } => "io",
            SyncError::Network(_) => "network",
            SyncError::RemoteRejected { .. } => "remote_rejected",
            SyncError::Unauthenticated => "unauthenticated",
            SyncError::Format(_) => "format",
            SyncError::Store(_) => "store",
            SyncError::InvalidInput(_) => "invalid_input",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound(_))
    }
}

impl From<RemoteError> for SyncError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound(what) => SyncError::NotFound(what),
            RemoteError::Rejected { status, message } => {
                SyncError::RemoteRejected { status, message }
            }
            RemoteError::Unauthenticated => SyncError::Unauthenticated,
            RemoteError::Network(e) => SyncError::Network(e.to_string()),
            RemoteError::Decode(msg) => SyncError::Network(format!("invalid response: {}", msg)),
        }
    }
}

/// Attach a path and action to `std::io` failures
pub(crate) trait IoResultExt<T> {
    fn at_path(self, action: &str, path: &Path) -> SyncResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at_path(self, action: &str, path: &Path) -> SyncResult<T> {
        self.map_err(|e| SyncError::io(format!("{} {}", action, path.display()), e))
    }
}
