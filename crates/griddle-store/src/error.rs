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

//! Store error types

use std::io;
use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing persisted state
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error on the backing file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Value could not be serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisted data does not have the expected shape
    #[error("corrupt value at '{location}': {reason}")]
    Corrupt { location: String, reason: String },

    /// Invalid key (empty)
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Schema migration failed
    #[error("migration failed: {0}")]
    Migration(String),
}

impl StoreError {
    pub fn corrupt(location: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Corrupt {
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn migration(msg: impl Into<String>) -> Self {
        StoreError::Migration(msg.into())
    }
}
