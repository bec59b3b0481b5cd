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

//! Shared output formatting for CLI commands.
//!
//! ```rust
//! use griddle_cli::output;
//!
//! output::success("Asset synced");
//! output::detail("Version", "1.2");
//! ```

use console::style;

/// Print a success message with a green check mark.
pub fn success(msg: &str) {
    println!("{} {}", style("✅").green().bold(), msg);
}

/// Print an error message to stderr with a red cross.
pub fn error(msg: &str) {
    eprintln!("{} {}", style("❌").red().bold(), msg);
}

/// Print an informational message.
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ️").cyan(), msg);
}

/// Print a warning message.
pub fn warning(msg: &str) {
    println!("{} {}", style("⚠️").yellow(), msg);
}

/// Print an indented `key: value` line with the value highlighted.
pub fn detail(key: &str, value: &str) {
    println!("  {}: {}", key, style(value).cyan());
}

/// Print a section header.
pub fn header(msg: &str) {
    println!("{} {}", style("📦").green().bold(), msg);
}

/// Human label for an optional version tag.
pub fn version_label(semver: Option<&str>) -> String {
    semver.map_or_else(|| "(no version)".to_string(), |v| format!("v{v}"))
}
