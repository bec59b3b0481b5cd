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

// Command modules for the griddle CLI
pub mod asset;
pub mod auth;
pub mod commit;
pub mod files;
pub mod ipc;
pub mod list;
pub mod root;
pub mod sync;
pub mod unsync;

pub use asset::AssetCmd;
pub use auth::{LoginCmd, LogoutCmd, WhoamiCmd};
pub use commit::CommitCmd;
pub use files::{FilesCmd, LaunchCmd, OpenCmd};
pub use ipc::IpcCmd;
pub use list::{ListCmd, StatusCmd};
pub use root::RootCmd;
pub use sync::{InitCmd, SyncCmd};
pub use unsync::UnsyncCmd;
