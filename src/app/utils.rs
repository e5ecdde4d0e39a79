use crate::app::types::Timestamp;
use regex::Regex;
use std::sync::LazyLock;

pub const UNKNOWN_TIMESTAMP: &str = "Unknown";

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(https?://\S+)").unwrap());
static CODE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```([^`]+)```").unwrap());
static INLINE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    const K: u64 = 1024;
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut scale = 1u64;
    while unit < UNITS.len() - 1 && bytes >= scale * K {
        scale *= K;
        unit += 1;
    }
    let value = format!("{:.2}", bytes as f64 / scale as f64);
    let value = value.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", value, UNITS[unit])
}

pub fn format_timestamp(ts: Option<&Timestamp>) -> String {
    format_timestamp_with(ts, locale_string)
}

/// Blank input short-circuits to "Unknown" before `render` is consulted.
pub fn format_timestamp_with(ts: Option<&Timestamp>, render: impl FnOnce(&Timestamp) -> String) -> String {
    match ts {
        Some(t) if !t.is_blank() => render(t),
        _ => UNKNOWN_TIMESTAMP.to_string(),
    }
}

#[cfg(target_arch = "wasm32")]
fn locale_string(ts: &Timestamp) -> String {
    use wasm_bindgen::{JsCast, JsValue};
    let arg = match ts {
        Timestamp::Millis(ms) => JsValue::from_f64(*ms),
        Timestamp::Text(s) => JsValue::from_str(s),
    };
    let date = js_sys::Date::new(&arg);
    js_sys::Reflect::get(&date, &JsValue::from_str("toLocaleString"))
        .ok()
        .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
        .and_then(|f| f.call0(&date).ok())
        .and_then(|s| s.as_string())
        .unwrap_or_else(|| "Invalid Date".to_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn locale_string(ts: &Timestamp) -> String {
    ts.to_string()
}

/// Turns raw chat text into display HTML: links, fenced code, inline code,
/// line breaks. The input is NOT escaped; run untrusted text through
/// [`escape_html`] first. Apply once per raw message.
pub fn format_message(content: &str) -> String {
    let content = URL_RE.replace_all(content, r#"<a href="${1}" target="_blank">${1}</a>"#);
    let content = CODE_BLOCK_RE.replace_all(&content, "<pre><code>${1}</code></pre>");
    let content = INLINE_CODE_RE.replace_all(&content, "<code>${1}</code>");
    content.replace('\n', "<br>")
}

pub fn escape_html(unsafe_text: &str) -> String {
    unsafe_text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}
