// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Proxy file codec
//!
//! A proxy is the four-line surrogate committed to git history in place of a
//! large blob:
//!
//! ```text
//! ~*@git-bifrost@*~
//! 1
//! 2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED
//! 11
//! ```
//!
//! Line 1 is a fixed sentinel, line 2 the format version, line 3 the SHA-1
//! digest of the original blob in uppercase hex, line 4 its byte length. All
//! lines are LF-terminated. A file whose first line equals the sentinel is
//! conclusively a proxy; anything else is raw content.

use crate::error::{GitError, GitResult};
use sha1::{Digest, Sha1};
use std::fmt;

/// First line of every proxy file.
pub const SENTINEL: &str = "~*@git-bifrost@*~";

/// Current proxy format version.
pub const PROXY_VERSION: u32 = 1;

/// SHA-1 content digest of a byte sequence, as 40 uppercase hex characters.
pub fn digest_hex(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hex::encode_upper(hasher.finalize())
}

/// Parsed form of a proxy file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyFile {
    /// Format version from line 2
    pub version: u32,

    /// Blob digest from line 3, 40 uppercase hex characters
    pub digest: String,

    /// Blob byte length from line 4
    pub size: u64,
}

impl ProxyFile {
    /// Create a proxy for a known digest and length.
    pub fn new(digest: String, size: u64) -> Self {
        ProxyFile {
            version: PROXY_VERSION,
            digest,
            size,
        }
    }

    /// Create the proxy describing `data`.
    pub fn for_content(data: &[u8]) -> Self {
        ProxyFile::new(digest_hex(data), data.len() as u64)
    }

    /// Whether `content` begins with the sentinel line.
    ///
    /// This is the conclusive proxy test: the sentinel must occupy the whole
    /// first line. A blob whose first bytes merely share a prefix with the
    /// sentinel is raw content.
    pub fn is_proxy(content: &[u8]) -> bool {
        match first_line(content) {
            Some(line) => line == SENTINEL.as_bytes(),
            None => false,
        }
    }

    /// Decode a proxy from raw bytes.
    ///
    /// Returns [`GitError::NotAProxy`] when the first line is not the
    /// sentinel, and [`GitError::CorruptProxy`] when the sentinel is present
    /// but the three body lines do not follow the format.
    pub fn parse(content: &[u8]) -> GitResult<Self> {
        if !Self::is_proxy(content) {
            return Err(GitError::NotAProxy);
        }

        let text = std::str::from_utf8(content)
            .map_err(|_| GitError::CorruptProxy("proxy body is not valid text".to_string()))?;

        let mut lines = text.lines().skip(1);

        let version_line = lines
            .next()
            .ok_or_else(|| GitError::CorruptProxy("missing version line".to_string()))?;
        let version: u32 = version_line.trim().parse().map_err(|_| {
            GitError::CorruptProxy(format!("invalid version '{}'", version_line.trim()))
        })?;
        if version == 0 {
            return Err(GitError::CorruptProxy("version must be positive".to_string()));
        }

        let digest_line = lines
            .next()
            .ok_or_else(|| GitError::CorruptProxy("missing digest line".to_string()))?;
        let digest = digest_line.trim();
        if digest.len() != 40 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(GitError::CorruptProxy(format!("invalid digest '{digest}'")));
        }

        let size_line = lines
            .next()
            .ok_or_else(|| GitError::CorruptProxy("missing length line".to_string()))?;
        let size: u64 = size_line.trim().parse().map_err(|_| {
            GitError::CorruptProxy(format!("invalid length '{}'", size_line.trim()))
        })?;

        Ok(ProxyFile {
            version,
            digest: digest.to_ascii_uppercase(),
            size,
        })
    }

    /// Encode the four-line proxy representation.
    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Whether `data` is the blob this proxy describes.
    pub fn matches(&self, data: &[u8]) -> bool {
        data.len() as u64 == self.size && digest_hex(data) == self.digest
    }
}

impl fmt::Display for ProxyFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SENTINEL}\n{}\n{}\n{}\n", self.version, self.digest, self.size)
    }
}

fn first_line(content: &[u8]) -> Option<&[u8]> {
    if content.is_empty() {
        return None;
    }
    match content.iter().position(|&b| b == b'\n') {
        Some(end) => Some(&content[..end]),
        None => Some(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_DIGEST: &str = "2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED";

    #[test]
    fn test_digest_hex_is_uppercase_sha1() {
        assert_eq!(digest_hex(b"hello world"), HELLO_DIGEST);
    }

    #[test]
    fn test_digest_of_empty_blob() {
        assert_eq!(digest_hex(b""), "DA39A3EE5E6B4B0D3255BFEF95601890AFD80709");
    }

    #[test]
    fn test_encode_matches_wire_format() {
        let proxy = ProxyFile::for_content(b"hello world");
        let expected = format!("{SENTINEL}\n1\n{HELLO_DIGEST}\n11\n");
        assert_eq!(proxy.encode(), expected.as_bytes());
    }

    #[test]
    fn test_roundtrip() {
        let proxy = ProxyFile::new(HELLO_DIGEST.to_string(), 11);
        let parsed = ProxyFile::parse(&proxy.encode()).unwrap();
        assert_eq!(parsed, proxy);
    }

    #[test]
    fn test_parse_rejects_raw_content() {
        assert!(matches!(
            ProxyFile::parse(b"just some file content\n"),
            Err(GitError::NotAProxy)
        ));
    }

    #[test]
    fn test_partial_sentinel_prefix_is_not_a_proxy() {
        assert!(!ProxyFile::is_proxy(b"~*@git-bif"));
        assert!(!ProxyFile::is_proxy(b"~*@git-bifrost@*~ trailing\n1\n"));
    }

    #[test]
    fn test_empty_input_is_not_a_proxy() {
        assert!(!ProxyFile::is_proxy(b""));
        assert!(matches!(ProxyFile::parse(b""), Err(GitError::NotAProxy)));
    }

    #[test]
    fn test_sentinel_without_body_is_corrupt() {
        let content = format!("{SENTINEL}\n");
        assert!(matches!(
            ProxyFile::parse(content.as_bytes()),
            Err(GitError::CorruptProxy(_))
        ));
    }

    #[test]
    fn test_bad_version_is_corrupt() {
        let content = format!("{SENTINEL}\nzero\n{HELLO_DIGEST}\n11\n");
        assert!(matches!(
            ProxyFile::parse(content.as_bytes()),
            Err(GitError::CorruptProxy(_))
        ));

        let content = format!("{SENTINEL}\n0\n{HELLO_DIGEST}\n11\n");
        assert!(matches!(
            ProxyFile::parse(content.as_bytes()),
            Err(GitError::CorruptProxy(_))
        ));
    }

    #[test]
    fn test_bad_digest_is_corrupt() {
        let content = format!("{SENTINEL}\n1\nnot-a-digest\n11\n");
        assert!(matches!(
            ProxyFile::parse(content.as_bytes()),
            Err(GitError::CorruptProxy(_))
        ));
    }

    #[test]
    fn test_bad_length_is_corrupt() {
        let content = format!("{SENTINEL}\n1\n{HELLO_DIGEST}\neleven\n");
        assert!(matches!(
            ProxyFile::parse(content.as_bytes()),
            Err(GitError::CorruptProxy(_))
        ));
    }

    #[test]
    fn test_trailing_whitespace_is_tolerated() {
        let content = format!("{SENTINEL}\n1 \n{HELLO_DIGEST} \n11 \n");
        let parsed = ProxyFile::parse(content.as_bytes()).unwrap();
        assert_eq!(parsed.digest, HELLO_DIGEST);
        assert_eq!(parsed.size, 11);
    }

    #[test]
    fn test_lowercase_digest_is_normalized() {
        let content = format!("{SENTINEL}\n1\n{}\n11\n", HELLO_DIGEST.to_ascii_lowercase());
        assert_eq!(ProxyFile::parse(content.as_bytes()).unwrap().digest, HELLO_DIGEST);
    }

    #[test]
    fn test_matches_checks_both_digest_and_length() {
        let proxy = ProxyFile::for_content(b"hello world");
        assert!(proxy.matches(b"hello world"));
        // Same length, different bytes.
        assert!(!proxy.matches(b"HELLO WORLD"));
        // Different length.
        assert!(!proxy.matches(b"hello"));
    }
}
