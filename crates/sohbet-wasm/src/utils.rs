use wasm_bindgen::JsValue;

/// Get the full page URL, the base for relative hub addresses
pub fn get_page_url() -> Result<String, JsValue> {
    web_sys::window()
        .and_then(|w| w.location().href().ok())
        .ok_or_else(|| JsValue::from_str("Failed to get page url"))
}

/// Escape HTML to prevent XSS
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render a `JsValue` error for logs and error variants
pub fn js_error_text(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
