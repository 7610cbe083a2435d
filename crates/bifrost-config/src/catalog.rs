// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Store catalog built from `store.<name>.<key>` config entries
//!
//! The catalog is an ordered list of [`StoreRecord`]s. Order matters: the
//! smudge filter tries stores in catalog order and the internal cache
//! pseudo-store is always first. Construction is a grouping reduction over
//! parsed `(name, key, value)` tuples; a later line for the same `(name, key)`
//! pair overrides an earlier one, which is how the `.gitbifrostuser` overlay
//! shadows `.gitbifrost`.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;
use url::Url;

/// Reserved name of the local cache pseudo-store.
///
/// The smudge filter consults the local cache through this record before any
/// remote store; it never goes through the transport registry.
pub const INTERNAL_STORE_NAME: &str = "store.BIFROST.INTERNAL";

const INTERNAL_STORE_URL: &str = "bifrost-internal:///";

/// A single configured store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRecord {
    /// Unique store identifier from the config section name
    pub name: String,

    /// Absolute URI; the scheme selects the transport
    pub url: Url,

    /// Logical VCS remote this store backs, if any
    pub remote: Option<String>,

    /// Whether a push must update this store for the push to succeed
    pub primary: bool,

    /// Credentials for transports that need them
    pub username: Option<String>,
    pub password: Option<String>,
}

impl StoreRecord {
    /// The record representing the local cache.
    pub fn internal() -> Self {
        StoreRecord {
            name: INTERNAL_STORE_NAME.to_string(),
            url: Url::parse(INTERNAL_STORE_URL).expect("static internal store url"),
            remote: None,
            primary: false,
            username: None,
            password: None,
        }
    }

    /// Whether this record is the local cache pseudo-store.
    pub fn is_internal(&self) -> bool {
        self.name == INTERNAL_STORE_NAME
    }

    /// Whether this record backs the given remote URL (normalized comparison).
    pub fn backs_remote(&self, remote_url: &str) -> bool {
        match &self.remote {
            Some(remote) => normalize_remote(remote) == normalize_remote(remote_url),
            None => false,
        }
    }
}

/// Ordered collection of store records, internal cache first
#[derive(Debug, Clone)]
pub struct Catalog {
    stores: Vec<StoreRecord>,
}

impl Catalog {
    /// Build a catalog from `store.<name>.<key> <value>` lines.
    ///
    /// Lines arrive in file order, `.gitbifrost` first and `.gitbifrostuser`
    /// appended; the fold below makes later `(name, key)` pairs win, giving
    /// the overlay its shadowing semantics. Store order is order of first
    /// appearance, with the internal cache record prepended.
    pub fn from_config_lines<I>(lines: I) -> ConfigResult<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut order: Vec<String> = Vec::new();
        let mut grouped: HashMap<String, HashMap<String, String>> = HashMap::new();

        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }
            let (name, key, value) = parse_store_line(line)?;
            let entry = grouped.entry(name.clone()).or_insert_with(|| {
                order.push(name.clone());
                HashMap::new()
            });
            entry.insert(key, value);
        }

        let mut stores = vec![StoreRecord::internal()];
        for name in order {
            let keys = grouped.remove(&name).unwrap_or_default();
            stores.push(record_from_keys(name, keys)?);
        }

        debug!(stores = stores.len(), "store catalog loaded");
        Ok(Catalog { stores })
    }

    /// All records in catalog order.
    pub fn stores(&self) -> &[StoreRecord] {
        &self.stores
    }

    /// Records whose `remote` matches the destination URL, in catalog order.
    ///
    /// The internal pseudo-store never matches; records without a `remote`
    /// are ignored for push purposes.
    pub fn stores_for_remote(&self, remote_url: &str) -> Vec<&StoreRecord> {
        self.stores
            .iter()
            .filter(|record| record.backs_remote(remote_url))
            .collect()
    }

    /// Look up a record by its url string, used by `verify` to pick up
    /// configured credentials for an explicitly named store.
    pub fn store_by_url(&self, url: &Url) -> Option<&StoreRecord> {
        self.stores.iter().find(|record| &record.url == url)
    }
}

/// Normalize a remote path or URL for comparison.
///
/// Remote declarations and push destinations may be filesystem paths or
/// URLs. URLs compare by their canonical string form; bare paths are made
/// absolute so `./repo.git` and `/work/repo.git` compare equal when they
/// name the same location. Trailing slashes are insignificant either way.
pub fn normalize_remote(remote: &str) -> String {
    if let Ok(url) = Url::parse(remote) {
        // Single-letter schemes are Windows drive prefixes, not URLs.
        if url.scheme().len() > 1 {
            return url.as_str().trim_end_matches('/').to_string();
        }
    }

    let path = Path::new(remote);
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    absolute
        .to_string_lossy()
        .trim_end_matches(std::path::MAIN_SEPARATOR)
        .to_string()
}

fn parse_store_line(line: &str) -> ConfigResult<(String, String, String)> {
    // `git config --get-regexp` prints `<key> <value>` with a single space;
    // the value may itself contain spaces.
    let (full_key, value) = line
        .split_once(' ')
        .ok_or_else(|| ConfigError::MalformedLine(line.to_string()))?;

    let rest = full_key
        .strip_prefix("store.")
        .ok_or_else(|| ConfigError::MalformedLine(line.to_string()))?;

    // The store name may contain dots; the key is the final component.
    let (name, key) = rest
        .rsplit_once('.')
        .ok_or_else(|| ConfigError::MalformedLine(line.to_string()))?;

    Ok((
        name.to_string(),
        key.to_ascii_lowercase(),
        value.to_string(),
    ))
}

fn record_from_keys(name: String, mut keys: HashMap<String, String>) -> ConfigResult<StoreRecord> {
    let url_value = keys
        .remove("url")
        .ok_or_else(|| ConfigError::MissingUrl(name.clone()))?;

    let url = Url::parse(&url_value).map_err(|source| ConfigError::InvalidUrl {
        name: name.clone(),
        url: url_value,
        source,
    })?;

    let primary = match keys.remove("primary") {
        None => false,
        Some(value) => match value.as_str() {
            "true" => true,
            "false" => false,
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: format!("store.{name}.primary"),
                    value,
                })
            }
        },
    };

    let remote = keys.remove("remote");
    let username = keys.remove("username");
    let password = keys.remove("password");

    for unknown in keys.keys() {
        debug!(store = %name, key = %unknown, "ignoring unrecognized store key");
    }

    Ok(StoreRecord {
        name,
        url,
        remote,
        primary,
        username,
        password,
    })
}
