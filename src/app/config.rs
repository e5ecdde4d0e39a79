use serde::{Deserialize, Serialize};

/// Window property a page may set before the module loads to override any of
/// these settings.
pub const CONFIG_GLOBAL: &str = "METIS_UI_CONFIG";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UiConfig {
    pub toast_container_id: String,
    pub nav_link_selector: String,
    pub active_class: String,
    pub csrf_meta_name: String,
    pub csrf_header: String,
    pub default_error_message: String,
    pub log_level: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            toast_container_id: "toastContainer".to_string(),
            nav_link_selector: ".navbar-nav .nav-link".to_string(),
            active_class: "active".to_string(),
            csrf_meta_name: "csrf-token".to_string(),
            csrf_header: "X-CSRF-Token".to_string(),
            default_error_message: crate::app::errors::DEFAULT_ERROR_MESSAGE.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl UiConfig {
    pub fn level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }

    /// Reads `window.METIS_UI_CONFIG`; absent or malformed means defaults.
    pub fn from_window() -> UiConfig {
        let Some(window) = web_sys::window() else { return UiConfig::default() };
        let raw = js_sys::Reflect::get(&window, &wasm_bindgen::JsValue::from_str(CONFIG_GLOBAL))
            .unwrap_or(wasm_bindgen::JsValue::UNDEFINED);
        if raw.is_undefined() || raw.is_null() {
            return UiConfig::default();
        }
        match serde_wasm_bindgen::from_value::<UiConfig>(raw) {
            Ok(config) => config,
            Err(e) => {
                web_sys::console::warn_1(&format!("[Config] ignoring {}: {}", CONFIG_GLOBAL, e).into());
                UiConfig::default()
            }
        }
    }
}
