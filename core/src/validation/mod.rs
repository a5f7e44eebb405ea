//! Upload gatekeeping for build artifacts
//!
//! Only the file name and byte size are inspected; the archive contents are
//! never opened. The extension decides the platform, and each platform has its
//! own size ceiling.

mod limits;

pub use limits::{SizeLimits, DEFAULT_MAX_ANDROID_SIZE, DEFAULT_MAX_IOS_SIZE};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extensions accepted for upload, in the order they are reported.
pub const ALLOWED_EXTENSIONS: [&str; 2] = [".ipa", ".apk"];

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid file type. Only .ipa (iOS) and .apk (Android) files are allowed")]
    UnsupportedType,

    #[error("File too large. Maximum size for {platform} builds is {max_mb}MB")]
    TooLarge { platform: Platform, max_mb: u64 },
}

// ============================================================================
// PLATFORM
// ============================================================================

/// Target platform of a build, inferred from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    /// Lowercase wire name (`ios` / `android`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Android => "android",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Ios => ".ipa",
            Self::Android => ".apk",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ios => write!(f, "iOS"),
            Self::Android => write!(f, "Android"),
        }
    }
}

// ============================================================================
// RESULT
// ============================================================================

/// Outcome of a full file check.
///
/// Serializes to `{"valid":true,"platform":"ios"}` or
/// `{"valid":false,"error":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ValidationReport", try_from = "ValidationReport")]
pub enum FileValidationResult {
    Valid { platform: Platform },
    Invalid { error: String },
}

impl FileValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn platform(&self) -> Option<Platform> {
        match self {
            Self::Valid { platform } => Some(*platform),
            Self::Invalid { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid { error } => Some(error),
        }
    }
}

impl From<Result<Platform, ValidationError>> for FileValidationResult {
    fn from(result: Result<Platform, ValidationError>) -> Self {
        match result {
            Ok(platform) => Self::Valid { platform },
            Err(e) => Self::Invalid {
                error: e.to_string(),
            },
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ValidationReport {
    valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    platform: Option<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<FileValidationResult> for ValidationReport {
    fn from(result: FileValidationResult) -> Self {
        match result {
            FileValidationResult::Valid { platform } => Self {
                valid: true,
                platform: Some(platform),
                error: None,
            },
            FileValidationResult::Invalid { error } => Self {
                valid: false,
                platform: None,
                error: Some(error),
            },
        }
    }
}

impl TryFrom<ValidationReport> for FileValidationResult {
    type Error = String;

    fn try_from(report: ValidationReport) -> Result<Self, Self::Error> {
        match (report.valid, report.platform, report.error) {
            (true, Some(platform), _) => Ok(Self::Valid { platform }),
            (false, _, Some(error)) => Ok(Self::Invalid { error }),
            (true, None, _) => Err("valid result without platform".to_string()),
            (false, _, None) => Err("invalid result without error".to_string()),
        }
    }
}

// ============================================================================
// CHECKS
// ============================================================================

/// Map a file name to its platform by extension.
///
/// The extension runs from the last `.` to the end and is compared
/// case-insensitively.
pub fn validate_file_extension(file_name: &str) -> Result<Platform, ValidationError> {
    let extension = match file_name.rfind('.') {
        Some(idx) => file_name[idx..].to_ascii_lowercase(),
        None => return Err(ValidationError::UnsupportedType),
    };

    match extension.as_str() {
        ".ipa" => Ok(Platform::Ios),
        ".apk" => Ok(Platform::Android),
        _ => Err(ValidationError::UnsupportedType),
    }
}

/// Check a byte size against the platform's ceiling. Equal to the ceiling passes.
pub fn validate_file_size(
    platform: Platform,
    file_size: u64,
    limits: &SizeLimits,
) -> Result<(), ValidationError> {
    let max = limits.max_for(platform);
    if file_size > max {
        return Err(ValidationError::TooLarge {
            platform,
            max_mb: limits::bytes_to_mb(max),
        });
    }
    Ok(())
}

/// Full check with the default size table.
pub fn validate_file(file_name: &str, file_size: u64) -> FileValidationResult {
    validate_file_with_limits(file_name, file_size, &SizeLimits::default())
}

/// Full check against an explicit size table. Size is never inspected when the
/// extension is rejected.
pub fn validate_file_with_limits(
    file_name: &str,
    file_size: u64,
    limits: &SizeLimits,
) -> FileValidationResult {
    validate_file_extension(file_name)
        .and_then(|platform| validate_file_size(platform, file_size, limits).map(|_| platform))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    #[test]
    fn test_ipa_is_ios() {
        let result = validate_file("app.ipa", 100 * MB);
        assert_eq!(
            result,
            FileValidationResult::Valid {
                platform: Platform::Ios
            }
        );
    }

    #[test]
    fn test_apk_is_android_case_insensitive() {
        assert_eq!(validate_file_extension("Release.APK"), Ok(Platform::Android));
        assert_eq!(validate_file_extension("my.app.v2.Ipa"), Ok(Platform::Ios));
    }

    #[test]
    fn test_unknown_extension_lists_allowed_types() {
        let result = validate_file("app.exe", 10);
        let error = result.error().unwrap();
        assert!(error.contains(".ipa"));
        assert!(error.contains(".apk"));
    }

    #[test]
    fn test_no_extension_rejected() {
        assert_eq!(validate_file_extension("ipa"), Err(ValidationError::UnsupportedType));
        assert_eq!(validate_file_extension(""), Err(ValidationError::UnsupportedType));
    }

    #[test]
    fn test_oversized_apk_names_ceiling() {
        let result = validate_file("app.apk", 600 * MB);
        let error = result.error().unwrap();
        assert!(error.contains("512MB"));
        assert!(error.contains("Android"));
    }

    #[test]
    fn test_size_at_ceiling_passes() {
        assert!(validate_file("app.ipa", 512 * MB).is_valid());
        assert!(!validate_file("app.ipa", 512 * MB + 1).is_valid());
    }

    #[test]
    fn test_extension_checked_before_size() {
        let result = validate_file("huge.zip", u64::MAX);
        assert_eq!(
            result.error().unwrap(),
            ValidationError::UnsupportedType.to_string()
        );
    }

    #[test]
    fn test_custom_limits_per_platform() {
        let limits = SizeLimits {
            ios: 100 * MB,
            android: 200 * MB,
        };
        assert!(!validate_file_with_limits("a.ipa", 150 * MB, &limits).is_valid());
        assert!(validate_file_with_limits("a.apk", 150 * MB, &limits).is_valid());

        let err = validate_file_size(Platform::Ios, 150 * MB, &limits).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLarge {
                platform: Platform::Ios,
                max_mb: 100
            }
        );
    }

    #[test]
    fn test_result_json_shape() {
        let ok = serde_json::to_value(validate_file("a.ipa", 1)).unwrap();
        assert_eq!(ok, serde_json::json!({"valid": true, "platform": "ios"}));

        let bad = serde_json::to_value(validate_file("a.txt", 1)).unwrap();
        assert_eq!(bad["valid"], false);
        assert!(bad.get("platform").is_none());
        assert!(bad["error"].as_str().unwrap().contains(".apk"));
    }
}
