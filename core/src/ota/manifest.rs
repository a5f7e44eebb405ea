// Manifest plist generation
//
// Layout follows Apple's OTA manifest: one `items` entry whose `assets` hold
// the software package (plus icons when given) and whose `metadata` names the
// bundle. Every interpolated value goes through `xml_escape`.

use serde::{Deserialize, Serialize};

/// Content type the manifest must be served with.
pub const MANIFEST_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

pub const PLIST_DOCTYPE: &str = r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#;

/// Everything the device needs to know about the build to install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDescriptor {
    pub ipa_url: String,
    pub bundle_id: String,
    pub version: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

impl ManifestDescriptor {
    pub fn new(
        ipa_url: impl Into<String>,
        bundle_id: impl Into<String>,
        version: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            ipa_url: ipa_url.into(),
            bundle_id: bundle_id.into(),
            version: version.into(),
            title: title.into(),
            icon_url: None,
        }
    }

    pub fn with_icon(mut self, icon_url: impl Into<String>) -> Self {
        self.icon_url = Some(icon_url.into());
        self
    }
}

/// Escape the five XML special characters.
pub fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the manifest plist for `descriptor`.
///
/// The icon assets (`display-image`, `full-size-image`) are emitted only when
/// `icon_url` is set; the image itself is not checked.
pub fn generate_manifest_plist(descriptor: &ManifestDescriptor) -> String {
    let mut assets = asset_dict("software-package", &descriptor.ipa_url, false);
    if let Some(icon_url) = &descriptor.icon_url {
        assets.push_str(&asset_dict("display-image", icon_url, true));
        assets.push_str(&asset_dict("full-size-image", icon_url, true));
    }

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(PLIST_DOCTYPE);
    out.push('\n');
    out.push_str("<plist version=\"1.0\">\n");
    out.push_str("<dict>\n");
    out.push_str("  <key>items</key>\n");
    out.push_str("  <array>\n");
    out.push_str("    <dict>\n");
    out.push_str("      <key>assets</key>\n");
    out.push_str("      <array>\n");
    out.push_str(&assets);
    out.push_str("      </array>\n");
    out.push_str("      <key>metadata</key>\n");
    out.push_str("      <dict>\n");
    push_entry(&mut out, "bundle-identifier", &descriptor.bundle_id);
    push_entry(&mut out, "bundle-version", &descriptor.version);
    push_entry(&mut out, "kind", "software");
    push_entry(&mut out, "title", &descriptor.title);
    out.push_str("      </dict>\n");
    out.push_str("    </dict>\n");
    out.push_str("  </array>\n");
    out.push_str("</dict>\n");
    out.push_str("</plist>\n");
    out
}

fn asset_dict(kind: &str, url: &str, needs_shine: bool) -> String {
    let mut dict = String::from("        <dict>\n");
    dict.push_str("          <key>kind</key>\n");
    dict.push_str(&format!("          <string>{}</string>\n", kind));
    if needs_shine {
        dict.push_str("          <key>needs-shine</key>\n");
        dict.push_str("          <true/>\n");
    }
    dict.push_str("          <key>url</key>\n");
    dict.push_str(&format!("          <string>{}</string>\n", xml_escape(url)));
    dict.push_str("        </dict>\n");
    dict
}

fn push_entry(out: &mut String, key: &str, value: &str) {
    out.push_str(&format!("        <key>{}</key>\n", key));
    out.push_str(&format!("        <string>{}</string>\n", xml_escape(value)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ManifestDescriptor {
        ManifestDescriptor::new("https://x/a.ipa", "com.a&b", "1.0", "<T>")
    }

    #[test]
    fn test_xml_escape_all_five() {
        assert_eq!(xml_escape(r#"&<>"'"#), "&amp;&lt;&gt;&quot;&apos;");
        assert_eq!(xml_escape("&amp;"), "&amp;amp;");
        assert_eq!(xml_escape("plain"), "plain");
    }

    #[test]
    fn test_header_and_doctype() {
        let plist = generate_manifest_plist(&descriptor());
        assert!(plist.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(plist.contains(PLIST_DOCTYPE));
        assert!(plist.contains("<plist version=\"1.0\">"));
        assert!(plist.trim_end().ends_with("</plist>"));
    }

    #[test]
    fn test_metadata_escaped() {
        let plist = generate_manifest_plist(&descriptor());
        assert!(plist.contains("<string>com.a&amp;b</string>"));
        assert!(plist.contains("<string>&lt;T&gt;</string>"));
        assert!(!plist.contains("<T>"));
        assert!(plist.contains("<key>bundle-version</key>\n        <string>1.0</string>"));
        assert!(plist.contains("<key>kind</key>\n        <string>software</string>"));
    }

    #[test]
    fn test_no_icons_without_icon_url() {
        let plist = generate_manifest_plist(&descriptor());
        assert_eq!(plist.matches("<string>software-package</string>").count(), 1);
        assert!(!plist.contains("display-image"));
        assert!(!plist.contains("full-size-image"));
        assert!(!plist.contains("needs-shine"));
    }

    #[test]
    fn test_icons_with_icon_url() {
        let plist = generate_manifest_plist(&descriptor().with_icon("https://x/icon.png"));
        assert!(plist.contains("<string>display-image</string>"));
        assert!(plist.contains("<string>full-size-image</string>"));
        assert_eq!(plist.matches("<key>needs-shine</key>").count(), 2);
        assert_eq!(plist.matches("<string>https://x/icon.png</string>").count(), 2);
    }

    #[test]
    fn test_icon_asset_layout() {
        assert_eq!(
            asset_dict("display-image", "https://x/i.png?a&b", true),
            concat!(
                "        <dict>\n",
                "          <key>kind</key>\n",
                "          <string>display-image</string>\n",
                "          <key>needs-shine</key>\n",
                "          <true/>\n",
                "          <key>url</key>\n",
                "          <string>https://x/i.png?a&amp;b</string>\n",
                "        </dict>\n",
            )
        );
    }

    #[test]
    fn test_single_item() {
        let plist = generate_manifest_plist(&descriptor());
        assert_eq!(plist.matches("<key>items</key>").count(), 1);
        assert_eq!(plist.matches("<key>assets</key>").count(), 1);
        assert_eq!(plist.matches("<key>metadata</key>").count(), 1);
    }

    #[test]
    fn test_ipa_url_query_escaped() {
        let d = ManifestDescriptor::new("https://x/a.ipa?sig=1&exp=2", "com.a", "1", "A");
        let plist = generate_manifest_plist(&d);
        assert!(plist.contains("<string>https://x/a.ipa?sig=1&amp;exp=2</string>"));
    }

    #[test]
    fn test_exact_document() {
        let d = ManifestDescriptor::new("https://x/a.ipa", "com.a", "2.1", "App");
        let expected = concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
            "<plist version=\"1.0\">\n",
            "<dict>\n",
            "  <key>items</key>\n",
            "  <array>\n",
            "    <dict>\n",
            "      <key>assets</key>\n",
            "      <array>\n",
            "        <dict>\n",
            "          <key>kind</key>\n",
            "          <string>software-package</string>\n",
            "          <key>url</key>\n",
            "          <string>https://x/a.ipa</string>\n",
            "        </dict>\n",
            "      </array>\n",
            "      <key>metadata</key>\n",
            "      <dict>\n",
            "        <key>bundle-identifier</key>\n",
            "        <string>com.a</string>\n",
            "        <key>bundle-version</key>\n",
            "        <string>2.1</string>\n",
            "        <key>kind</key>\n",
            "        <string>software</string>\n",
            "        <key>title</key>\n",
            "        <string>App</string>\n",
            "      </dict>\n",
            "    </dict>\n",
            "  </array>\n",
            "</dict>\n",
            "</plist>\n",
        );
        assert_eq!(generate_manifest_plist(&d), expected);
    }
}
