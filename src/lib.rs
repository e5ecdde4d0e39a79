//! Browser helpers for the Metis RAG pages: formatting, toasts, API error
//! surfacing, nav highlighting and CSRF-aware requests.
//!
//! Every helper is exported to page scripts under its camelCase name.

pub mod app;

use app::api::{self, OutgoingRequest, RequestBody};
use app::config::UiConfig;
use app::errors::{self, ApiError};
use app::toast::Notifier;
use app::types::{ErrorBody, Method, Severity, Timestamp};
use app::utils;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let config = UiConfig::from_window();
    if console_log::init_with_level(config.level()).is_err() {
        web_sys::console::warn_1(&"[Init] logger already set".into());
    }
    log::debug!("[Init] {:?}", config);
    app::init(config);
}

#[wasm_bindgen(js_name = formatTimestamp)]
pub fn format_timestamp(timestamp: JsValue) -> String {
    let ts = if timestamp.is_falsy() {
        None
    } else if let Some(ms) = timestamp.as_f64() {
        Some(Timestamp::Millis(ms))
    } else if let Some(text) = timestamp.as_string() {
        Some(Timestamp::Text(text))
    } else {
        timestamp
            .dyn_ref::<js_sys::Date>()
            .map(|d| Timestamp::Millis(d.get_time()))
    };
    utils::format_timestamp(ts.as_ref())
}

#[wasm_bindgen(js_name = showToast)]
pub fn show_toast(message: &str, kind: Option<String>) {
    let severity = kind.as_deref().map(Severity::parse).unwrap_or_default();
    app::with_page(|page| page.toaster.show(message, severity));
}

/// Negative, fractional and non-finite sizes are clamped to whole bytes.
#[wasm_bindgen(js_name = formatFileSize)]
pub fn format_file_size(bytes: f64) -> String {
    let bytes = if bytes.is_finite() && bytes > 0.0 { bytes as u64 } else { 0 };
    utils::format_file_size(bytes)
}

#[wasm_bindgen(js_name = formatMessage)]
pub fn format_message(content: &str) -> String {
    utils::format_message(content)
}

#[wasm_bindgen(js_name = escapeHtml)]
pub fn escape_html(unsafe_text: &str) -> String {
    utils::escape_html(unsafe_text)
}

#[wasm_bindgen(js_name = handleApiError)]
pub fn handle_api_error(error: JsValue, default_message: Option<String>) -> String {
    let api_error = api_error_from_js(&error);
    app::with_page(|page| {
        let fallback = default_message.as_deref().unwrap_or(&page.config.default_error_message);
        errors::handle_api_error(&page.toaster, &api_error, Some(fallback))
    })
}

/// `fetch(url, options)` through the page client, so installed interceptors
/// apply. `options` follows `RequestInit`: `method`, `headers` (object,
/// `Headers` or pairs) and `body` (string or any body `fetch` accepts).
/// Resolves to the raw `Response` whatever its status; rejects on network
/// failure.
#[wasm_bindgen(js_name = apiFetch)]
pub fn api_fetch(url: String, options: JsValue) -> js_sys::Promise {
    wasm_bindgen_futures::future_to_promise(async move {
        let (method, headers, body) = request_options_from_js(&options)?;
        let client = api::client();
        let request: OutgoingRequest = client.prepare_with(method, &url, headers, body);
        let resp = client
            .dispatch(request)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok::<JsValue, JsValue>(JsValue::from(web_sys::Response::from(resp)))
    })
}

type RequestOptions = (Method, Vec<(String, String)>, Option<RequestBody>);

fn request_options_from_js(options: &JsValue) -> Result<RequestOptions, JsValue> {
    let method = match js_get(options, "method").as_string() {
        None => Method::Get,
        Some(m) => Method::parse(&m).ok_or_else(|| JsValue::from_str(&format!("unsupported method {}", m)))?,
    };
    let headers = header_pairs(&js_get(options, "headers"))?;
    let body = js_get(options, "body");
    let body = if body.is_undefined() || body.is_null() {
        None
    } else if let Some(text) = body.as_string() {
        Some(RequestBody::Text(text))
    } else {
        Some(RequestBody::Js(body))
    };
    Ok((method, headers, body))
}

fn header_pairs(headers: &JsValue) -> Result<Vec<(String, String)>, JsValue> {
    if !headers.is_object() {
        return Ok(Vec::new());
    }
    let entries: Vec<JsValue> = match js_sys::try_iter(headers)? {
        Some(iter) => iter.collect::<Result<_, _>>()?,
        None => js_sys::Object::entries(headers.unchecked_ref()).iter().collect(),
    };
    let mut pairs = Vec::with_capacity(entries.len());
    for entry in entries {
        let pair: js_sys::Array = entry.dyn_into()?;
        if let (Some(name), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
            pairs.push((name, value));
        }
    }
    Ok(pairs)
}

fn js_get(target: &JsValue, key: &str) -> JsValue {
    if !target.is_object() {
        return JsValue::UNDEFINED;
    }
    js_sys::Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

/// Reads `{ message, response: { status, data: { detail } } }` off a thrown
/// JS value. `Error.message` is not enumerable, hence `Reflect`.
fn api_error_from_js(error: &JsValue) -> ApiError {
    let message = js_get(error, "message").as_string().unwrap_or_default();
    let response = js_get(error, "response");
    if !response.is_object() {
        return ApiError::Network(message);
    }
    let status = js_get(&response, "status")
        .as_f64()
        .map(|s| s as u16)
        .unwrap_or_default();
    let detail = js_get(&js_get(&response, "data"), "detail");
    let detail = if detail.is_falsy() {
        None
    } else if let Some(text) = detail.as_string() {
        Some(serde_json::Value::String(text))
    } else {
        serde_wasm_bindgen::from_value::<serde_json::Value>(detail).ok()
    };
    let body = detail.map(|d| ErrorBody { detail: Some(d), ..ErrorBody::default() });
    ApiError::Response { status, message, body }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn js(expr: &str) -> JsValue {
        js_sys::Function::new_no_args(&format!("return {};", expr))
            .call0(&JsValue::NULL)
            .unwrap()
    }

    #[wasm_bindgen_test]
    fn reads_detail_from_axios_style_errors() {
        let err = api_error_from_js(&js("{ message: 'Request failed', response: { status: 422, data: { detail: 'bad input' } } }"));
        assert_eq!(err.status(), Some(422));
        assert_eq!(errors::error_message(&err, "fallback"), "bad input");
    }

    #[wasm_bindgen_test]
    fn falls_back_to_error_message_then_default() {
        let err = api_error_from_js(&js("new Error('boom')"));
        assert_eq!(errors::error_message(&err, "fallback"), "boom");

        let err = api_error_from_js(&js("{ message: 'boom', response: { data: { detail: 0 } } }"));
        assert_eq!(errors::error_message(&err, "fallback"), "boom");

        let err = api_error_from_js(&JsValue::from_str("just a string"));
        assert_eq!(errors::error_message(&err, "fallback"), "fallback");
    }

    #[wasm_bindgen_test]
    fn list_details_render_as_json() {
        let err = api_error_from_js(&js("{ response: { data: { detail: [{ msg: 'field required' }] } } }"));
        assert_eq!(errors::error_message(&err, "fallback"), r#"[{"msg":"field required"}]"#);
    }

    #[wasm_bindgen_test]
    fn options_carry_method_headers_and_body() {
        let (method, headers, body) = request_options_from_js(&js(
            "{ method: 'post', headers: { 'Content-Type': 'application/json', Authorization: 'Bearer t' }, body: '{\"q\":1}' }",
        ))
        .unwrap();
        assert_eq!(method, Method::Post);
        assert_eq!(
            headers,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), "Bearer t".to_string()),
            ]
        );
        assert_eq!(body, Some(RequestBody::Text(r#"{"q":1}"#.to_string())));
    }

    #[wasm_bindgen_test]
    fn options_accept_headers_objects_pairs_and_raw_bodies() {
        let (_, headers, body) =
            request_options_from_js(&js("{ headers: new Headers([['X-Trace', 'abc']]), body: new FormData() }")).unwrap();
        assert_eq!(headers, vec![("x-trace".to_string(), "abc".to_string())]);
        assert!(matches!(body, Some(RequestBody::Js(_))));

        let (method, headers, body) = request_options_from_js(&js("{ headers: [['Accept', 'text/plain']] }")).unwrap();
        assert_eq!(method, Method::Get);
        assert_eq!(headers, vec![("Accept".to_string(), "text/plain".to_string())]);
        assert_eq!(body, None);

        let (method, headers, _) = request_options_from_js(&JsValue::UNDEFINED).unwrap();
        assert_eq!(method, Method::Get);
        assert!(headers.is_empty());

        assert!(request_options_from_js(&js("{ method: 'TRACE' }")).is_err());
    }

    #[wasm_bindgen_test]
    fn csrf_header_merges_with_caller_headers() {
        let client = api::ApiClient::new("https://metis.local")
            .with_interceptor(api::CsrfInterceptor::new("tok", "X-CSRF-Token", "https://metis.local"));
        let (method, headers, body) =
            request_options_from_js(&js("{ method: 'POST', headers: { 'Content-Type': 'application/json' }, body: '{}' }")).unwrap();
        let request = client.prepare_with(method, "/api/chat", headers, body);
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.header("X-CSRF-Token"), Some("tok"));
    }
}
