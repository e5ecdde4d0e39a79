use crate::app::config::UiConfig;
use crate::app::errors::ApiError;
use crate::app::types::{ErrorBody, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::OnceCell;
use std::rc::Rc;
use wasm_bindgen::JsValue;

#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Text(String),
    /// FormData, Blob, typed arrays: handed to `fetch` untouched.
    Js(JsValue),
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl OutgoingRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: Vec::new(), body: None }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_header(&mut self, name: &str, value: &str) {
        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }
}

/// Runs on every request an [`ApiClient`] prepares, in registration order.
pub trait RequestInterceptor {
    fn intercept(&self, request: &mut OutgoingRequest);
}

/// Root-relative URLs and URLs under the page origin. Protocol-relative
/// `//host` URLs and look-alike hosts (`https://app.example.evil`) are not.
pub fn is_same_origin(url: &str, origin: &str) -> bool {
    if url.starts_with("//") {
        return false;
    }
    if url.starts_with('/') {
        return true;
    }
    if origin.is_empty() {
        return false;
    }
    match url.strip_prefix(origin) {
        Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
        None => false,
    }
}

pub struct CsrfInterceptor {
    token: String,
    header: String,
    origin: String,
}

impl CsrfInterceptor {
    pub fn new(token: impl Into<String>, header: impl Into<String>, origin: impl Into<String>) -> Self {
        Self { token: token.into(), header: header.into(), origin: origin.into() }
    }
}

impl RequestInterceptor for CsrfInterceptor {
    fn intercept(&self, request: &mut OutgoingRequest) {
        if is_same_origin(&request.url, &self.origin) {
            request.set_header(&self.header, &self.token);
        }
    }
}

#[derive(Clone, Default)]
pub struct ApiClient {
    origin: String,
    interceptors: Vec<Rc<dyn RequestInterceptor>>,
}

impl ApiClient {
    pub fn new(origin: impl Into<String>) -> Self {
        Self { origin: origin.into(), interceptors: Vec::new() }
    }

    pub fn with_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptors.push(Rc::new(interceptor));
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn prepare(&self, method: Method, url: &str, body: Option<RequestBody>) -> OutgoingRequest {
        self.prepare_with(method, url, Vec::new(), body)
    }

    /// Caller headers go in first; interceptors see and may override them.
    pub fn prepare_with(
        &self,
        method: Method,
        url: &str,
        headers: Vec<(String, String)>,
        body: Option<RequestBody>,
    ) -> OutgoingRequest {
        let mut request = OutgoingRequest::new(method, url);
        for (name, value) in &headers {
            request.set_header(name, value);
        }
        request.body = body;
        for interceptor in &self.interceptors {
            interceptor.intercept(&mut request);
        }
        request
    }

    /// Sends without looking at the status, like `fetch`.
    pub async fn dispatch(&self, request: OutgoingRequest) -> Result<gloo_net::http::Response, ApiError> {
        let mut builder = gloo_net::http::RequestBuilder::new(&request.url).method(gloo_method(request.method));
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let built = match request.body {
            Some(RequestBody::Text(text)) => builder.body(text),
            Some(RequestBody::Js(raw)) => builder.body(raw),
            None => builder.build(),
        }
        .map_err(|e| ApiError::Network(e.to_string()))?;
        built.send().await.map_err(|e| ApiError::Network(e.to_string()))
    }

    pub async fn send(&self, request: OutgoingRequest) -> Result<gloo_net::http::Response, ApiError> {
        let url = request.url.clone();
        let resp = self.dispatch(request).await?;
        if resp.ok() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let err = response_error(resp.status(), &resp.status_text(), &body);
        log::warn!("[Api] {} -> {}", url, resp.status());
        Err(err)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let resp = self.send(self.prepare(Method::Get, url, None)).await?;
        resp.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T, ApiError> {
        let payload = serde_json::to_string(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        let mut request = self.prepare(Method::Post, url, Some(payload.into()));
        request.set_header("Content-Type", "application/json");
        let resp = self.send(request).await?;
        resp.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn delete(&self, url: &str) -> Result<(), ApiError> {
        self.send(self.prepare(Method::Delete, url, None)).await?;
        Ok(())
    }
}

fn gloo_method(method: Method) -> gloo_net::http::Method {
    match method {
        Method::Get => gloo_net::http::Method::GET,
        Method::Post => gloo_net::http::Method::POST,
        Method::Put => gloo_net::http::Method::PUT,
        Method::Patch => gloo_net::http::Method::PATCH,
        Method::Delete => gloo_net::http::Method::DELETE,
    }
}

/// Error for a non-2xx response. HTTP/2 responses carry no status text.
pub fn response_error(status: u16, status_text: &str, body: &str) -> ApiError {
    let message = if status_text.is_empty() {
        format!("Request failed with status code {}", status)
    } else {
        status_text.to_string()
    };
    let body = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| ErrorBody::from_value(&v));
    ApiError::Response { status, message, body }
}

thread_local! {
    static PAGE_CLIENT: OnceCell<ApiClient> = const { OnceCell::new() };
}

/// Installs the page-wide client. Only the first call wins.
pub fn install(client: ApiClient) -> bool {
    PAGE_CLIENT.with(|cell| cell.set(client).is_ok())
}

pub fn is_installed() -> bool {
    PAGE_CLIENT.with(|cell| cell.get().is_some())
}

/// The installed client, or a bare one for the page origin.
pub fn client() -> ApiClient {
    PAGE_CLIENT.with(|cell| cell.get().cloned()).unwrap_or_else(|| ApiClient::new(page_origin()))
}

fn page_origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

fn read_meta(name: &str) -> Option<String> {
    let doc = web_sys::window()?.document()?;
    let meta = doc.query_selector(&format!("meta[name=\"{}\"]", name)).ok()??;
    meta.get_attribute("content").filter(|c| !c.is_empty())
}

/// Page-load hook: with a CSRF meta tag present, every same-origin request
/// made through [`client`] carries the token for the rest of the page.
pub fn install_csrf_client(config: &UiConfig) -> bool {
    let Some(token) = read_meta(&config.csrf_meta_name) else {
        log::debug!("[Api] no {} meta tag, requests go out unmodified", config.csrf_meta_name);
        return false;
    };
    let origin = page_origin();
    let client = ApiClient::new(origin.clone())
        .with_interceptor(CsrfInterceptor::new(token, config.csrf_header.clone(), origin));
    let installed = install(client);
    if installed {
        log::info!("[Api] CSRF header {} enabled for same-origin requests", config.csrf_header);
    }
    installed
}
