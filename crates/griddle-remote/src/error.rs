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

use thiserror::Error;

/// Result type for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Remote repository errors
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Asset, version or file does not exist (HTTP 404)
    #[error("not found: {0}")]
    NotFound(String),

    /// Server refused the request
    #[error("server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// No bearer token, or the server did not accept it
    #[error("not authenticated")]
    Unauthenticated,

    /// Transport failure (connect, timeout, TLS)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn not_found(what: impl Into<String>) -> Self {
        RemoteError::NotFound(what.into())
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        RemoteError::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }
}
