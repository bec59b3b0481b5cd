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

//! # Griddle local sync
//!
//! The local half of Griddle's asset workflow. Remote assets are lists of
//! immutable versions; locally each asset has one mutable working folder. This
//! crate keeps the two reconciled:
//!
//! - [`hash`]: content hash of a folder, used to detect local edits
//! - [`index`]: which version of which asset is materialized, and where
//! - [`archive`]: deterministic ZIP packing and atomic unpacking
//! - [`fingerprint`]: the hash recorded when a folder last matched the remote
//! - [`engine`]: sync, commit, dirty check and unsync on top of the above
//! - [`launch`]: handing a working folder to a file browser or DCC
//!
//! # Example
//!
//! ```rust,no_run
//! use griddle_local::{SyncEngine, SyncEngineConfig};
//! use griddle_remote::MockRemote;
//! use griddle_store::MemoryStore;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> griddle_local::SyncResult<()> {
//! let remote = MockRemote::new();
//! let asset = remote.add_asset("Chair").await;
//!
//! let engine = SyncEngine::open(
//!     SyncEngineConfig::new("/tmp/griddle"),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(remote),
//! )
//! .await?;
//!
//! engine.ensure_materialized(asset.id, None).await?;
//! assert!(!engine.is_dirty(asset.id).await?);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod hash;
pub mod index;
pub mod launch;
pub mod naming;
mod walk;

pub use archive::LocalFile;
pub use engine::{AssetStatus, SyncEngine, SyncEngineConfig};
pub use error::{SyncError, SyncResult};
pub use fingerprint::{FingerprintRecord, FingerprintStore};
pub use hash::{hash_folder, hash_folder_blocking, ContentHash};
pub use index::{DownloadedEntry, VersionIndex};
pub use launch::{CommandLauncher, LaunchRequest, Launcher};
