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

use anyhow::{Context, Result};
use clap::Parser;
use griddle_cli::output;
use griddle_cli::AppContext;
use std::path::PathBuf;

/// Show or change the download folder
///
/// Existing working copies are not moved.
#[derive(Parser, Debug)]
pub struct RootCmd {
    /// New download folder
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
}

impl RootCmd {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let Some(path) = &self.path else {
            println!("{}", ctx.engine().download_root().await.display());
            return Ok(());
        };

        let path = std::path::absolute(path)
            .with_context(|| format!("Invalid path {}", path.display()))?;
        ctx.engine().set_download_root(&path).await?;
        output::success(&format!("Download folder set to {}", path.display()));
        Ok(())
    }
}
