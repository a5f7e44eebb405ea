//! Device classification from a browser user agent
//!
//! Detection is substring based and never fails: anything unrecognized is a
//! desktop. iPadOS asks for desktop-class pages and reports itself as a
//! Macintosh, so a touch-capable Macintosh is treated as iOS.

use crate::validation::Platform;
use serde::{Deserialize, Serialize};

/// Coarse form factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mobile => write!(f, "mobile"),
            Self::Tablet => write!(f, "tablet"),
            Self::Desktop => write!(f, "desktop"),
        }
    }
}

/// Capabilities reported by the browser alongside the user agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatorHint {
    /// `navigator.maxTouchPoints`
    pub max_touch_points: Option<u32>,
}

impl NavigatorHint {
    pub fn with_touch_points(max_touch_points: u32) -> Self {
        Self {
            max_touch_points: Some(max_touch_points),
        }
    }

    fn is_touch_capable(&self) -> bool {
        self.max_touch_points.unwrap_or(0) > 0
    }
}

/// Classification of the requesting device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    #[serde(rename = "isIOS")]
    pub is_ios: bool,
    #[serde(rename = "isAndroid")]
    pub is_android: bool,
    /// True for tablets as well as phones.
    #[serde(rename = "isMobile")]
    pub is_mobile: bool,
    /// The user agent exactly as supplied.
    #[serde(rename = "userAgent")]
    pub user_agent: String,
}

impl DeviceInfo {
    /// Mobile platform of the device, if any.
    pub fn platform(&self) -> Option<Platform> {
        if self.is_ios {
            Some(Platform::Ios)
        } else if self.is_android {
            Some(Platform::Android)
        } else {
            None
        }
    }

    /// Whether a build for `platform` can be installed directly on this device.
    pub fn can_install(&self, platform: Platform) -> bool {
        self.platform() == Some(platform)
    }
}

/// Classify a user agent.
pub fn detect_device(user_agent: &str, hint: Option<&NavigatorHint>) -> DeviceInfo {
    let ua = user_agent.to_lowercase();

    let mut is_ios = ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod");
    if !is_ios && ua.contains("macintosh") && hint.is_some_and(NavigatorHint::is_touch_capable) {
        is_ios = true;
    }

    let is_android = ua.contains("android");
    let is_mobile = is_ios || is_android || ua.contains("mobile");
    let is_tablet = (is_ios && ua.contains("ipad")) || (is_android && ua.contains("tablet"));

    let device_type = if is_tablet {
        DeviceType::Tablet
    } else if is_mobile {
        DeviceType::Mobile
    } else {
        DeviceType::Desktop
    };

    DeviceInfo {
        device_type,
        is_ios,
        is_android,
        is_mobile,
        user_agent: user_agent.to_string(),
    }
}
