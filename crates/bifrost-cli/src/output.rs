// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Shared output formatting for CLI commands.
//!
//! User-facing status lines are colored via `console` and always written to
//! stderr, because stdout is the filter payload channel.

use console::style;

/// Print a success message.
pub fn success(msg: &str) {
    eprintln!("{} {}", style("ok").green().bold(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", style("error:").red().bold(), msg);
}

/// Print an informational message.
pub fn info(msg: &str) {
    eprintln!("{} {}", style("info:").cyan(), msg);
}

/// Print a warning message.
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("warning:").yellow().bold(), msg);
}

/// Print a key-value detail line.
pub fn detail(key: &str, value: &str) {
    eprintln!("  {}: {}", key, style(value).cyan());
}
