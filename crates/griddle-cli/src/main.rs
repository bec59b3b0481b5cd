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

mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use commands::*;
use griddle_cli::{output, AppContext};
use griddle_config::GriddleConfig;
use griddle_observability::{init_tracing_with_config, LogConfig, LogFormat};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "griddle")]
#[command(version, about = "Asset sync for DCC pipelines")]
#[command(
    long_about = "Griddle keeps one working folder per asset in step with the versions stored on
the asset server: sync a version down, edit it in your DCC, commit it back up."
)]
#[command(propagate_version = true)]
#[command(author = "Griddle Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress logs and progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Colored output (always|auto|never)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List downloaded assets
    List(ListCmd),

    /// Download a version of an asset
    Sync(SyncCmd),

    /// Create the working folder for an asset without versions
    Init(InitCmd),

    /// Upload the working folder as a new version
    Commit(CommitCmd),

    /// Delete an asset's working folder
    Unsync(UnsyncCmd),

    /// Show which working copies have changes
    Status(StatusCmd),

    /// List files in an asset's working folder
    Files(FilesCmd),

    /// Open an asset's working folder
    Open(OpenCmd),

    /// Open an asset in a configured DCC
    Launch(LaunchCmd),

    /// Show or change the download folder
    Root(RootCmd),

    /// Create, edit and inspect assets
    Asset(AssetCmd),

    /// Log in to the asset server
    Login(LoginCmd),

    /// Forget the saved session
    Logout(LogoutCmd),

    /// Show the logged-in user
    Whoami(WhoamiCmd),

    /// Serve desktop-shell requests over stdin/stdout
    Ipc(IpcCmd),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        command,
        config,
        verbose,
        quiet,
        color,
    } = Cli::parse();

    match color.as_str() {
        "never" => console::set_colors_enabled(false),
        "always" => console::set_colors_enabled(true),
        "auto" => {}
        _ => {
            output::error(&format!("Invalid color option: {}", color));
            std::process::exit(2);
        }
    }

    let command = match command {
        None => {
            Cli::command().print_help()?;
            return Ok(());
        }
        Some(Commands::Version) => {
            print_version();
            return Ok(());
        }
        Some(Commands::Completions { shell }) => {
            generate(shell, &mut Cli::command(), "griddle", &mut io::stdout());
            return Ok(());
        }
        Some(command) => command,
    };

    if let Err(e) = run(command, config, verbose, quiet).await {
        output::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Commands, config_path: Option<PathBuf>, verbose: bool, quiet: bool) -> Result<()> {
    let config = AppContext::load_config(config_path.as_deref()).await?;
    let ipc = matches!(command, Commands::Ipc(_));
    if !quiet {
        init_logging(&config, verbose, ipc);
    }

    let ctx = AppContext::open(config, quiet || ipc).await?;

    match command {
        Commands::List(cmd) => cmd.execute(&ctx).await,
        Commands::Sync(cmd) => cmd.execute(&ctx).await,
        Commands::Init(cmd) => cmd.execute(&ctx).await,
        Commands::Commit(cmd) => cmd.execute(&ctx).await,
        Commands::Unsync(cmd) => cmd.execute(&ctx).await,
        Commands::Status(cmd) => cmd.execute(&ctx).await,
        Commands::Files(cmd) => cmd.execute(&ctx).await,
        Commands::Open(cmd) => cmd.execute(&ctx).await,
        Commands::Launch(cmd) => cmd.execute(&ctx).await,
        Commands::Root(cmd) => cmd.execute(&ctx).await,
        Commands::Asset(cmd) => cmd.execute(&ctx).await,
        Commands::Login(cmd) => cmd.execute(&ctx).await,
        Commands::Logout(cmd) => cmd.execute(&ctx).await,
        Commands::Whoami(cmd) => cmd.execute(&ctx).await,
        Commands::Ipc(cmd) => cmd.execute(&ctx).await,
        Commands::Version | Commands::Completions { .. } => Ok(()),
    }
}

fn init_logging(config: &GriddleConfig, verbose: bool, ipc: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        config.observability.log_level.clone()
    };

    let log_config = if ipc {
        LogConfig::for_ipc()
    } else {
        let format = config
            .observability
            .log_format
            .parse()
            .unwrap_or(LogFormat::Pretty);
        LogConfig::new().with_format(format)
    };

    // Ignore errors if already initialized
    init_tracing_with_config(log_config.with_level(level)).ok();
}

fn print_version() {
    println!("griddle {}", env!("CARGO_PKG_VERSION"));
    println!("rust-version: {}", env!("CARGO_PKG_RUST_VERSION"));
    println!("license: {}", env!("CARGO_PKG_LICENSE"));
}
