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
use griddle_cli::{ipc, AppContext};
use tokio::io::BufReader;

/// Serve desktop-shell requests as JSON lines on stdin/stdout
///
/// Logs go to stderr; stdout carries responses only.
#[derive(Parser, Debug)]
pub struct IpcCmd {}

impl IpcCmd {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let dispatcher = ctx.dispatcher();
        ipc::serve(&dispatcher, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
        Ok(())
    }
}
