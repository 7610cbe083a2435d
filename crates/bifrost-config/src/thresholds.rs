// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Size thresholds enforced by the pre-commit guard

use serde::{Deserialize, Serialize};

/// Default maximum size for unfiltered text blobs: 5 MiB.
pub const DEFAULT_TEXT_THRESHOLD: i64 = 5 * 1024 * 1024;

/// Default maximum size for unfiltered binary blobs: 100 KiB.
pub const DEFAULT_BINARY_THRESHOLD: i64 = 100 * 1024;

/// Sentinel config value that disables a threshold check.
pub const THRESHOLD_DISABLED: i64 = -1;

/// Size limits for unfiltered staged blobs.
///
/// Read from `repo.text-size-threshold` and `repo.bin-size-threshold` in
/// `.gitbifrost`; a value of `-1` disables the corresponding check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeThresholds {
    pub text: i64,
    pub binary: i64,
}

impl Default for SizeThresholds {
    fn default() -> Self {
        SizeThresholds {
            text: DEFAULT_TEXT_THRESHOLD,
            binary: DEFAULT_BINARY_THRESHOLD,
        }
    }
}

impl SizeThresholds {
    /// Build thresholds from config lookups, falling back to the defaults.
    pub fn from_config_values(text: Option<i64>, binary: Option<i64>) -> Self {
        SizeThresholds {
            text: text.unwrap_or(DEFAULT_TEXT_THRESHOLD),
            binary: binary.unwrap_or(DEFAULT_BINARY_THRESHOLD),
        }
    }

    /// Threshold applicable to a blob of the given kind.
    pub fn limit_for(&self, binary: bool) -> i64 {
        if binary {
            self.binary
        } else {
            self.text
        }
    }

    /// Whether a blob of `size` bytes exceeds the applicable threshold.
    ///
    /// A blob exactly at the threshold passes; `-1` disables the check.
    pub fn exceeded(&self, size: u64, binary: bool) -> bool {
        let limit = self.limit_for(binary);
        if limit == THRESHOLD_DISABLED {
            return false;
        }
        size > limit as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let thresholds = SizeThresholds::default();
        assert_eq!(thresholds.text, 5_242_880);
        assert_eq!(thresholds.binary, 102_400);
    }

    #[test]
    fn test_exactly_at_threshold_passes() {
        let thresholds = SizeThresholds::default();
        assert!(!thresholds.exceeded(5_242_880, false));
        assert!(thresholds.exceeded(5_242_881, false));
        assert!(!thresholds.exceeded(102_400, true));
        assert!(thresholds.exceeded(102_401, true));
    }

    #[test]
    fn test_disabled_threshold_never_flags() {
        let thresholds = SizeThresholds {
            text: THRESHOLD_DISABLED,
            binary: THRESHOLD_DISABLED,
        };
        assert!(!thresholds.exceeded(u64::MAX, false));
        assert!(!thresholds.exceeded(u64::MAX, true));
    }

    #[test]
    fn test_zero_threshold_flags_any_nonempty_blob() {
        let thresholds = SizeThresholds { text: 0, binary: 0 };
        assert!(!thresholds.exceeded(0, false));
        assert!(thresholds.exceeded(1, false));
    }

    #[test]
    fn test_config_values_override_defaults() {
        let thresholds = SizeThresholds::from_config_values(Some(1024), None);
        assert_eq!(thresholds.text, 1024);
        assert_eq!(thresholds.binary, DEFAULT_BINARY_THRESHOLD);
    }
}
