// itms-services deep link construction

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const ITMS_SERVICES_PREFIX: &str = "itms-services://?action=download-manifest&url=";

/// Characters escaped by `encodeURIComponent`: everything except
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Build the link that triggers an OTA install of the manifest at `manifest_url`.
///
/// One trailing slash is stripped first; a slash after the plist path breaks
/// the manifest fetch on some servers. The URL itself is not validated.
pub fn generate_ios_install_url(manifest_url: &str) -> String {
    let cleaned = manifest_url.strip_suffix('/').unwrap_or(manifest_url);
    format!("{}{}", ITMS_SERVICES_PREFIX, encode_uri_component(cleaned))
}

/// Percent-encode with `encodeURIComponent` rules.
pub fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}
