// Live navigator access
//
// Reads `navigator.userAgent` and `navigator.maxTouchPoints` from the page's
// window. Outside a window (workers, tests in Node) there is nothing to read.

use betadrop_core::{detect_device, DeviceInfo, NavigatorHint};
use wasm_bindgen::JsValue;

/// Classify the device running the current page.
pub fn current_device() -> Result<DeviceInfo, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;
    let navigator = window.navigator();

    let user_agent = navigator.user_agent()?;
    let touch_points = navigator.max_touch_points();
    let hint = NavigatorHint {
        max_touch_points: u32::try_from(touch_points).ok(),
    };

    let info = detect_device(&user_agent, Some(&hint));
    tracing::debug!("Detected {} device", info.device_type);
    Ok(info)
}
