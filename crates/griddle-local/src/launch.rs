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

//! Hand-off of materialized folders to external tools
//!
//! Opening a folder in the system file browser and starting a DCC on an
//! asset are the same operation: spawn a program with arguments derived from
//! the folder. The program is not awaited.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use std::fmt::Debug;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

/// Placeholder replaced by the folder path in argument templates
pub const FOLDER_PLACEHOLDER: &str = "{folder}";
/// Placeholder replaced by the asset name in argument templates
pub const ASSET_NAME_PLACEHOLDER: &str = "{asset_name}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub folder: PathBuf,
    pub asset_name: String,
}

#[async_trait]
pub trait Launcher: Send + Sync + Debug {
    async fn launch(&self, request: &LaunchRequest) -> SyncResult<()>;
}

/// Spawns `program` with templated arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLauncher {
    program: String,
    args: Vec<String>,
}

impl CommandLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The platform's default file browser
    pub fn file_browser() -> Self {
        let program = if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(windows) {
            "explorer"
        } else {
            "xdg-open"
        };
        Self::new(program, vec![FOLDER_PLACEHOLDER.to_string()])
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with placeholders substituted
    pub fn render_args(&self, request: &LaunchRequest) -> Vec<String> {
        let folder = request.folder.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(FOLDER_PLACEHOLDER, &folder)
                    .replace(ASSET_NAME_PLACEHOLDER, &request.asset_name)
            })
            .collect()
    }
}

#[async_trait]
impl Launcher for CommandLauncher {
    async fn launch(&self, request: &LaunchRequest) -> SyncResult<()> {
        if !request.folder.is_dir() {
            return Err(SyncError::not_found(format!(
                "folder {}",
                request.folder.display()
            )));
        }

        let args = self.render_args(request);
        info!(program = %self.program, ?args, "Launching");

        Command::new(&self.program)
            .args(&args)
            .current_dir(&request.folder)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SyncError::io(format!("launching {}", self.program), e))?;
        Ok(())
    }
}
