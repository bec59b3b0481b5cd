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
use griddle_local::DownloadedEntry;
use uuid::Uuid;

/// Download a version of an asset into its working folder
#[derive(Parser, Debug)]
pub struct SyncCmd {
    /// Asset id
    #[arg(value_name = "ASSET_ID")]
    pub asset_id: Uuid,

    /// Version to sync; the latest when omitted
    #[arg(short, long, value_name = "SEMVER")]
    pub semver: Option<String>,
}

impl SyncCmd {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let pb = ctx.progress().transfer(&format!("Syncing {}", self.asset_id));
        let result = ctx
            .engine()
            .ensure_materialized(self.asset_id, self.semver.as_deref())
            .await;
        pb.finish_and_clear();

        let entries = result.with_context(|| format!("Failed to sync asset {}", self.asset_id))?;
        report(ctx, &entries, self.asset_id, "Synced").await;
        Ok(())
    }
}

/// Create the working folder for an asset that has no versions yet
#[derive(Parser, Debug)]
pub struct InitCmd {
    /// Asset id
    #[arg(value_name = "ASSET_ID")]
    pub asset_id: Uuid,
}

impl InitCmd {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let entries = ctx
            .engine()
            .create_initial_version(self.asset_id)
            .await
            .with_context(|| format!("Failed to create working copy for {}", self.asset_id))?;
        report(ctx, &entries, self.asset_id, "Created").await;
        Ok(())
    }
}

/// Print the entry a command just wrote
pub(crate) async fn report(ctx: &AppContext, entries: &[DownloadedEntry], asset_id: Uuid, verb: &str) {
    let Some(entry) = entries.iter().find(|e| e.asset_id == asset_id) else {
        return;
    };

    output::success(&format!(
        "{} {} {}",
        verb,
        entry.folder_name,
        output::version_label(entry.semver.as_deref())
    ));
    let folder = ctx.engine().download_root().await.join(&entry.folder_name);
    output::detail("Folder", &folder.display().to_string());
}
