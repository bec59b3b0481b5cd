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
use clap::Parser;
use griddle_cli::AppContext;
use uuid::Uuid;

/// Upload the working folder as a new version
#[derive(Parser, Debug)]
pub struct CommitCmd {
    /// Asset id
    #[arg(value_name = "ASSET_ID")]
    pub asset_id: Uuid,

    /// Version message
    #[arg(short, long)]
    pub message: String,

    /// Bump the major version (X.Y -> X+1.0) instead of the minor one
    #[arg(long)]
    pub major: bool,
}

impl CommitCmd {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let pb = ctx.progress().transfer("Uploading working copy");
        let result = ctx
            .engine()
            .commit(self.asset_id, &self.message, self.major)
            .await;
        pb.finish_and_clear();

        let entries = result.with_context(|| format!("Failed to commit asset {}", self.asset_id))?;
        report(ctx, &entries, self.asset_id, "Committed").await;
        Ok(())
    }
}
