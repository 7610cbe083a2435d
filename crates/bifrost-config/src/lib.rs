// Git-Bifrost - Large File Transport for Git
// Copyright (C) 2026 Bifrost Contributors
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

//! Configuration layer for git-bifrost
//!
//! This crate turns the `store.<name>.<key>` entries found in a repository's
//! `.gitbifrost` file (optionally overlaid by `.gitbifrostuser`) into a typed,
//! ordered catalog of store records, and carries the size thresholds enforced
//! by the pre-commit guard.
//!
//! The crate is deliberately free of any git plumbing: callers read the raw
//! config lines through the VCS adapter (`git config --get-regexp`) and feed
//! them to [`Catalog::from_config_lines`]. That keeps the grouping reduction
//! pure and directly testable.
//!
//! # Examples
//!
//! ```
//! use bifrost_config::Catalog;
//!
//! let lines = vec![
//!     "store.depot.url ftp://ftp.example.com/bifrost".to_string(),
//!     "store.depot.remote /srv/git/project.git".to_string(),
//!     "store.depot.primary true".to_string(),
//! ];
//! let catalog = Catalog::from_config_lines(lines)?;
//!
//! // The internal cache pseudo-store is always first.
//! assert_eq!(catalog.stores().len(), 2);
//! assert!(catalog.stores()[0].is_internal());
//! # Ok::<(), bifrost_config::ConfigError>(())
//! ```

pub mod catalog;
pub mod error;
pub mod thresholds;

pub use catalog::{normalize_remote, Catalog, StoreRecord, INTERNAL_STORE_NAME};
pub use error::{ConfigError, ConfigResult};
pub use thresholds::{
    SizeThresholds, DEFAULT_BINARY_THRESHOLD, DEFAULT_TEXT_THRESHOLD, THRESHOLD_DISABLED,
};

/// Repository-visible config file holding store declarations and thresholds.
pub const CONFIG_FILE: &str = ".gitbifrost";

/// Optional per-user overlay; entries here shadow `.gitbifrost` by `(name, key)`.
pub const USER_CONFIG_FILE: &str = ".gitbifrostuser";
