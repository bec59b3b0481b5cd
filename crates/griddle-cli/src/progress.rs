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

//! Terminal progress indicators.
//!
//! Spinners draw on stderr so stdout stays clean for piping.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Creates spinners for long-running remote operations
#[derive(Debug, Clone, Copy)]
pub struct ProgressTracker {
    quiet: bool,
}

impl ProgressTracker {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Spinner for a transfer (download, upload)
    pub fn transfer(&self, msg: &str) -> ProgressBar {
        self.spinner(msg, "{spinner:.cyan} {msg} ({elapsed})")
    }

    /// Spinner for local work (hashing, unpacking)
    pub fn local(&self, msg: &str) -> ProgressBar {
        self.spinner(msg, "{spinner:.yellow} {msg}")
    }

    fn spinner(&self, msg: &str, template: &str) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        // templates are static; a bad one falls back to the default style
        if let Ok(style) = ProgressStyle::default_spinner().template(template) {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_spinners_are_hidden() {
        let tracker = ProgressTracker::new(true);
        assert!(tracker.transfer("Downloading").is_hidden());
        assert!(tracker.local("Hashing").is_hidden());
    }
}
