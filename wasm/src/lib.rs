// betadrop-wasm: WebAssembly bindings for browser environments

pub mod navigator;

use betadrop_core::{
    detect_device as core_detect_device, generate_ios_install_url as core_install_url,
    generate_manifest_plist as core_manifest_plist, generate_short_token as core_short_token,
    is_valid_short_token as core_is_valid_short_token, validate_file as core_validate_file,
    DeviceInfo, ManifestDescriptor, NavigatorHint,
};
use std::sync::Once;
use wasm_bindgen::prelude::*;

static LOGGING: Once = Once::new();

/// Install the panic hook and console tracing. Later calls are no-ops.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    LOGGING.call_once(tracing_wasm::set_as_global_default);
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// `{ type, isIOS, isAndroid, isMobile, userAgent }` for an explicit user agent.
#[wasm_bindgen(js_name = detectDevice)]
pub fn detect_device(user_agent: &str, max_touch_points: Option<u32>) -> Result<JsValue, JsValue> {
    let hint = NavigatorHint { max_touch_points };
    to_js(&core_detect_device(user_agent, Some(&hint)))
}

/// Detect the device this page is running on.
#[wasm_bindgen(js_name = detectCurrentDevice)]
pub fn detect_current_device() -> Result<JsValue, JsValue> {
    let info: DeviceInfo = navigator::current_device()?;
    to_js(&info)
}

#[wasm_bindgen(js_name = generateIOSInstallUrl)]
pub fn generate_ios_install_url(manifest_url: &str) -> String {
    core_install_url(manifest_url)
}

/// Accepts `{ ipaUrl, bundleId, version, title, iconUrl? }`.
#[wasm_bindgen(js_name = generateManifestPlist)]
pub fn generate_manifest_plist(options: JsValue) -> Result<String, JsValue> {
    let options: ManifestOptions = serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from_str(&format!("Invalid manifest options: {}", e)))?;
    Ok(core_manifest_plist(&options.into()))
}

/// `{ valid: true, platform }` or `{ valid: false, error }`.
#[wasm_bindgen(js_name = validateFile)]
pub fn validate_file(file_name: &str, file_size: f64) -> Result<JsValue, JsValue> {
    // JS sizes are doubles; negative or NaN sizes count as empty.
    let size = if file_size.is_finite() && file_size > 0.0 {
        file_size as u64
    } else {
        0
    };
    to_js(&core_validate_file(file_name, size))
}

#[wasm_bindgen(js_name = generateShortToken)]
pub fn generate_short_token(length: Option<usize>) -> String {
    core_short_token(length.unwrap_or(betadrop_core::DEFAULT_TOKEN_LENGTH))
}

#[wasm_bindgen(js_name = isValidShortToken)]
pub fn is_valid_short_token(token: &str) -> bool {
    core_is_valid_short_token(token)
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestOptions {
    ipa_url: String,
    bundle_id: String,
    version: String,
    title: String,
    #[serde(default)]
    icon_url: Option<String>,
}

impl From<ManifestOptions> for ManifestDescriptor {
    fn from(options: ManifestOptions) -> Self {
        Self {
            ipa_url: options.ipa_url,
            bundle_id: options.bundle_id,
            version: options.version,
            title: options.title,
            icon_url: options.icon_url,
        }
    }
}
