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

use anyhow::Result;
use clap::Parser;
use console::style;
use griddle_cli::output;
use griddle_cli::AppContext;
use griddle_local::{AssetStatus, DownloadedEntry};
use serde::Serialize;
use uuid::Uuid;

/// List downloaded assets
#[derive(Parser, Debug)]
pub struct ListCmd {
    /// Print the index as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListCmd {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let entries = ctx.engine().list_downloaded().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }

        if entries.is_empty() {
            output::info("No assets downloaded");
            return Ok(());
        }

        let root = ctx.engine().download_root().await;
        output::header(&format!("Downloaded assets in {}", root.display()));
        for entry in &entries {
            print_entry(entry);
        }
        Ok(())
    }
}

fn print_entry(entry: &DownloadedEntry) {
    println!(
        "  {:<32} {:<14} {}",
        style(&entry.folder_name).yellow(),
        output::version_label(entry.semver.as_deref()),
        style(entry.asset_id).dim()
    );
}

#[derive(Debug, Serialize)]
struct StatusRow {
    asset_id: Uuid,
    #[serde(flatten)]
    status: AssetStatus,
}

/// Show whether working copies have uncommitted changes
#[derive(Parser, Debug)]
pub struct StatusCmd {
    /// Only this asset; all downloaded assets when omitted
    #[arg(value_name = "ASSET_ID")]
    pub asset_id: Option<Uuid>,

    /// Print statuses as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusCmd {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let engine = ctx.engine();
        let ids: Vec<Uuid> = match self.asset_id {
            Some(id) => vec![id],
            None => engine
                .list_downloaded()
                .await?
                .into_iter()
                .map(|e| e.asset_id)
                .collect(),
        };

        let mut rows = Vec::with_capacity(ids.len());
        for asset_id in ids {
            match engine.status(asset_id).await {
                Ok(status) => rows.push(StatusRow { asset_id, status }),
                Err(e) if e.is_not_found() && self.asset_id.is_none() => {
                    output::warning(&format!("{}: {}", asset_id, e));
                }
                Err(e) => return Err(e.into()),
            }
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        for row in &rows {
            let (label, semver) = match &row.status {
                AssetStatus::NoLocalCopy => (style("not downloaded").dim(), None),
                AssetStatus::Clean { semver } => (style("clean").green(), semver.as_deref()),
                AssetStatus::Dirty { semver } => (style("modified").red().bold(), semver.as_deref()),
            };
            println!(
                "  {} {:<14} {}",
                row.asset_id,
                output::version_label(semver),
                label
            );
        }
        Ok(())
    }
}
