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

use anyhow::{bail, Result};
use clap::Parser;
use console::Term;
use dialoguer::Confirm;
use griddle_cli::output;
use griddle_cli::AppContext;
use griddle_local::AssetStatus;
use uuid::Uuid;

/// Delete an asset's working folder
#[derive(Parser, Debug)]
pub struct UnsyncCmd {
    /// Asset id
    #[arg(value_name = "ASSET_ID")]
    pub asset_id: Uuid,

    /// Discard uncommitted changes without asking
    #[arg(short, long)]
    pub yes: bool,
}

impl UnsyncCmd {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let engine = ctx.engine();

        let status = match engine.status(self.asset_id).await {
            Ok(status) => status,
            // folder already gone; unsync only has to forget the entry
            Err(e) if e.is_not_found() => AssetStatus::Clean { semver: None },
            Err(e) => return Err(e.into()),
        };

        match status {
            AssetStatus::NoLocalCopy => {
                output::info(&format!("No local copy of {}", self.asset_id));
                return Ok(());
            }
            AssetStatus::Dirty { .. } if !self.yes => {
                if !Term::stdout().is_term() {
                    bail!(
                        "Working copy of {} has uncommitted changes; pass --yes to discard them",
                        self.asset_id
                    );
                }
                let confirmed = Confirm::new()
                    .with_prompt("Working copy has uncommitted changes. Delete it anyway?")
                    .default(false)
                    .interact()?;
                if !confirmed {
                    output::info("Aborted");
                    return Ok(());
                }
            }
            _ => {}
        }

        engine.unsync(self.asset_id).await?;
        output::success(&format!("Removed working copy of {}", self.asset_id));
        Ok(())
    }
}
