// Per-platform upload ceilings
//
// The values currently coincide; they are kept as separate entries so either
// platform can change without touching the other.

use super::Platform;
use serde::{Deserialize, Serialize};

const MIB: u64 = 1024 * 1024;

/// Maximum IPA size: 512 MiB
pub const DEFAULT_MAX_IOS_SIZE: u64 = 512 * MIB;

/// Maximum APK size: 512 MiB
pub const DEFAULT_MAX_ANDROID_SIZE: u64 = 512 * MIB;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeLimits {
    pub ios: u64,
    pub android: u64,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            ios: DEFAULT_MAX_IOS_SIZE,
            android: DEFAULT_MAX_ANDROID_SIZE,
        }
    }
}

impl SizeLimits {
    /// Build a table from whole megabytes, as stored in user config.
    pub fn from_mb(ios_mb: u64, android_mb: u64) -> Self {
        Self {
            ios: ios_mb.saturating_mul(MIB),
            android: android_mb.saturating_mul(MIB),
        }
    }

    pub fn max_for(&self, platform: Platform) -> u64 {
        match platform {
            Platform::Ios => self.ios,
            Platform::Android => self.android,
        }
    }
}

/// Bytes to MB for display, rounded to nearest.
pub(crate) fn bytes_to_mb(bytes: u64) -> u64 {
    (bytes as f64 / MIB as f64).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match() {
        let limits = SizeLimits::default();
        assert_eq!(limits.max_for(Platform::Ios), 512 * MIB);
        assert_eq!(limits.max_for(Platform::Android), 512 * MIB);
    }

    #[test]
    fn test_bytes_to_mb_rounds() {
        assert_eq!(bytes_to_mb(512 * MIB), 512);
        assert_eq!(bytes_to_mb(MIB + MIB / 2), 2);
        assert_eq!(bytes_to_mb(MIB + MIB / 2 - 1), 1);
    }

    #[test]
    fn test_from_mb() {
        assert_eq!(SizeLimits::from_mb(1, 2), SizeLimits { ios: MIB, android: 2 * MIB });
    }
}
