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
use dialoguer::Password;
use griddle_cli::output;
use griddle_cli::AppContext;
use griddle_remote::AuthState;
use std::io::BufRead;

/// Log in to the asset server
#[derive(Parser, Debug)]
pub struct LoginCmd {
    /// PennKey
    #[arg(value_name = "USERNAME")]
    pub username: String,

    /// Read the password from the first line of stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

impl LoginCmd {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let password = if self.password_stdin {
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("Failed to read password from stdin")?;
            line.trim_end_matches(['\r', '\n']).to_string()
        } else {
            Password::new().with_prompt("Password").interact()?
        };

        ctx.login(&self.username, &password).await?;
        output::success(&format!("Logged in as {}", self.username));
        Ok(())
    }
}

/// Forget the saved session
#[derive(Parser, Debug)]
pub struct LogoutCmd {}

impl LogoutCmd {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        ctx.logout().await?;
        output::success("Logged out");
        Ok(())
    }
}

/// Show the logged-in user
#[derive(Parser, Debug)]
pub struct WhoamiCmd {}

impl WhoamiCmd {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        match ctx.remote().current_user().await? {
            AuthState::LoggedIn { user } => {
                output::info(&format!("{} {} ({})", user.first_name, user.last_name, user.pennkey));
                output::detail("School", &user.school);
            }
            AuthState::LoggedOut => output::info("Not logged in"),
        }
        Ok(())
    }
}
