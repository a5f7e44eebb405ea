//! iOS over-the-air installation
//!
//! An iOS device installs an ad-hoc build by opening an `itms-services://`
//! link that points at a manifest plist. The manifest tells the OS where the
//! IPA lives and under which bundle identity to install it. Any malformed
//! byte in the manifest makes the install fail silently on-device.

mod install_url;
mod manifest;

pub use install_url::{encode_uri_component, generate_ios_install_url, ITMS_SERVICES_PREFIX};
pub use manifest::{
    generate_manifest_plist, xml_escape, ManifestDescriptor, MANIFEST_CONTENT_TYPE, PLIST_DOCTYPE,
};
