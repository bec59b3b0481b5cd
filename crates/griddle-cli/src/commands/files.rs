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

use anyhow::{anyhow, Result};
use clap::Parser;
use griddle_cli::output;
use griddle_cli::AppContext;
use griddle_local::CommandLauncher;
use indicatif::HumanBytes;
use uuid::Uuid;

/// List the files in an asset's working folder
#[derive(Parser, Debug)]
pub struct FilesCmd {
    /// Asset id
    #[arg(value_name = "ASSET_ID")]
    pub asset_id: Uuid,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

impl FilesCmd {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let files = ctx.engine().list_local_files(self.asset_id).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&files)?);
            return Ok(());
        }

        if files.is_empty() {
            output::info("Working folder is empty");
        }
        for file in &files {
            println!("  {:>10}  {}", HumanBytes(file.size).to_string(), file.path);
        }
        Ok(())
    }
}

/// Open an asset's working folder in the file browser
#[derive(Parser, Debug)]
pub struct OpenCmd {
    /// Asset id
    #[arg(value_name = "ASSET_ID")]
    pub asset_id: Uuid,

    /// Print the folder path instead of opening it
    #[arg(long)]
    pub print: bool,
}

impl OpenCmd {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        if self.print {
            let folder = ctx.engine().local_folder(self.asset_id).await?;
            println!("{}", folder.display());
            return Ok(());
        }

        ctx.engine()
            .launch(self.asset_id, &CommandLauncher::file_browser())
            .await?;
        Ok(())
    }
}

/// Open an asset's working folder in a configured DCC
#[derive(Parser, Debug)]
pub struct LaunchCmd {
    /// Asset id
    #[arg(value_name = "ASSET_ID")]
    pub asset_id: Uuid,

    /// Launcher name from the `[launchers]` config table
    #[arg(value_name = "LAUNCHER")]
    pub launcher: String,
}

impl LaunchCmd {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let config = ctx.config().launcher(&self.launcher).ok_or_else(|| {
            let known: Vec<&str> = ctx.config().launchers.keys().map(String::as_str).collect();
            anyhow!(
                "Unknown launcher '{}' (configured: {})",
                self.launcher,
                if known.is_empty() { "none".to_string() } else { known.join(", ") }
            )
        })?;

        let launcher = CommandLauncher::new(config.program.clone(), config.args.clone());
        ctx.engine().launch(self.asset_id, &launcher).await?;
        output::success(&format!("Launched {}", launcher.program()));
        Ok(())
    }
}
