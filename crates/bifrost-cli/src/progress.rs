// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Progress reporting for hook runs.

use indicatif::{ProgressBar, ProgressStyle};

/// Percentage bar on stderr for a scan over a known number of items.
///
/// The length starts unknown; the first update sets it.
pub fn percentage_bar(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {percent}%")
            .expect("static progress template"),
    );
    pb.set_message(msg.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_bar_template_is_valid() {
        let pb = percentage_bar("Checking staged files");
        pb.set_length(10);
        pb.set_position(5);
        pb.finish_and_clear();
    }
}
