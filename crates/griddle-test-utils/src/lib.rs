// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2025 Griddle Contributors

//! # Griddle Test Utilities
//!
//! Shared test utilities for Griddle crates providing:
//! - Asset folder fixtures with deterministic content
//! - Sandboxed client workspaces (store, config, download root)
//! - CLI command helpers for testing the `griddle` binary
//! - Custom assertions for comparing folder trees

pub mod assertions;
pub mod cli;
pub mod fixtures;
pub mod workspace;

// Re-export commonly used items at crate root
pub use assertions::*;
pub use cli::{griddle, GriddleCommand};
pub use fixtures::{AssetTree, TestFixtures};
pub use workspace::TestWorkspace;
