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

//! Griddle client library
//!
//! The `griddle` binary is a thin layer over these modules:
//!
//! - [`context`] wires configuration, the persisted store, the HTTP remote and
//!   the sync engine together
//! - [`ipc`] is the typed request/response surface used by the desktop shell,
//!   served as JSON lines by `griddle ipc`
//! - [`output`] and [`progress`] handle terminal presentation

pub mod context;
pub mod ipc;
pub mod output;
pub mod progress;

pub use context::AppContext;
pub use ipc::{Dispatcher, ErrorBody, Request, Response};
