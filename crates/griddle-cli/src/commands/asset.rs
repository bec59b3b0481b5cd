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

use super::sync::report;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use griddle_cli::output;
use griddle_cli::AppContext;
use griddle_remote::{AssetCreate, RemoteRepository};
use serde_json::json;
use uuid::Uuid;

/// Create, edit and inspect assets on the server
#[derive(Parser, Debug)]
pub struct AssetCmd {
    #[command(subcommand)]
    pub command: AssetSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AssetSubcommand {
    /// List assets on the server, optionally filtered by name
    List {
        /// Case-insensitive substring of the asset name
        #[arg(short, long)]
        search: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register a new asset
    New {
        /// Display name
        #[arg(value_name = "NAME")]
        name: String,

        /// Comma-separated keywords
        #[arg(short, long, default_value = "")]
        keywords: String,

        /// Thumbnail URI
        #[arg(long)]
        image_uri: Option<String>,

        /// Also create the empty working folder
        #[arg(long)]
        sync: bool,
    },

    /// Change an asset's metadata; omitted fields are kept
    Update {
        /// Asset id
        #[arg(value_name = "ASSET_ID")]
        asset_id: Uuid,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        keywords: Option<String>,

        #[arg(long)]
        image_uri: Option<String>,
    },

    /// Show an asset and its full version history
    Show {
        /// Asset id
        #[arg(value_name = "ASSET_ID")]
        asset_id: Uuid,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl AssetCmd {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        match &self.command {
            AssetSubcommand::List { search, json } => {
                let assets = ctx
                    .remote()
                    .list_assets(search.as_deref())
                    .await
                    .context("Failed to list assets")?;

                if *json {
                    println!("{}", serde_json::to_string_pretty(&assets)?);
                    return Ok(());
                }

                if assets.is_empty() {
                    match search {
                        Some(search) => output::info(&format!("No assets match \"{}\"", search)),
                        None => output::info("No assets on the server"),
                    }
                    return Ok(());
                }
                for asset in &assets {
                    println!(
                        "  {}  {:<32} {}",
                        style(asset.id).dim(),
                        asset.asset_name,
                        style(&asset.keywords).cyan()
                    );
                }
                Ok(())
            }
            AssetSubcommand::New {
                name,
                keywords,
                image_uri,
                sync,
            } => {
                let asset = ctx
                    .remote()
                    .create_asset(&AssetCreate {
                        asset_name: name.clone(),
                        keywords: keywords.clone(),
                        image_uri: image_uri.clone(),
                    })
                    .await
                    .context("Failed to create asset")?;
                output::success(&format!("Created asset {}", asset.asset_name));
                output::detail("Id", &asset.id.to_string());

                if *sync {
                    let entries = ctx.engine().create_initial_version(asset.id).await?;
                    report(ctx, &entries, asset.id, "Created").await;
                }
                Ok(())
            }
            AssetSubcommand::Update {
                asset_id,
                name,
                keywords,
                image_uri,
            } => {
                let current = ctx.remote().asset_info(*asset_id).await?.asset;
                let update = AssetCreate {
                    asset_name: name.clone().unwrap_or(current.asset_name),
                    keywords: keywords.clone().unwrap_or(current.keywords),
                    image_uri: image_uri.clone().or(current.image_uri),
                };
                let asset = ctx
                    .remote()
                    .update_asset(*asset_id, &update)
                    .await
                    .with_context(|| format!("Failed to update asset {}", asset_id))?;
                output::success(&format!("Updated asset {}", asset.asset_name));
                Ok(())
            }
            AssetSubcommand::Show { asset_id, json } => {
                let info = ctx.remote().asset_info(*asset_id).await?;
                let versions = ctx.remote().list_versions(*asset_id).await?;

                if *json {
                    let doc = json!({ "asset": info.asset, "versions": versions });
                    println!("{}", serde_json::to_string_pretty(&doc)?);
                    return Ok(());
                }

                output::header(&info.asset.asset_name);
                output::detail("Id", &info.asset.id.to_string());
                output::detail("Author", &info.asset.author_pennkey);
                if !info.asset.keywords.is_empty() {
                    output::detail("Keywords", &info.asset.keywords);
                }
                if versions.is_empty() {
                    output::info("No versions yet");
                }
                for version in &versions {
                    println!(
                        "  {:<8} {} {:<10} {}",
                        style(format!("v{}", version.semver)).yellow(),
                        version.date.format("%Y-%m-%d %H:%M"),
                        version.author_pennkey,
                        version.message
                    );
                }
                Ok(())
            }
        }
    }
}
