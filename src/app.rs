pub mod api;
pub mod config;
pub mod errors;
pub mod nav;
pub mod toast;
pub mod toast_dom;
pub mod types;
pub mod utils;

use crate::app::config::UiConfig;
use crate::app::toast_dom::DomToaster;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Per-page state shared by the exported helpers.
#[derive(Clone)]
pub struct Page {
    pub config: UiConfig,
    pub toaster: DomToaster,
}

impl Page {
    pub fn new(config: UiConfig) -> Self {
        let toaster = DomToaster::new(config.toast_container_id.clone());
        Self { config, toaster }
    }
}

thread_local! {
    static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
}

/// Runs `f` on a snapshot of the page state so callbacks may re-enter.
pub fn with_page<R>(f: impl FnOnce(&Page) -> R) -> R {
    let page = PAGE.with(|cell| {
        cell.borrow_mut()
            .get_or_insert_with(|| Page::new(UiConfig::from_window()))
            .clone()
    });
    f(&page)
}

/// Stores the page state and runs the page-load hooks once the DOM is parsed.
pub fn init(config: UiConfig) {
    PAGE.with(|cell| *cell.borrow_mut() = Some(Page::new(config.clone())));

    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        log::warn!("[Init] no document, page hooks skipped");
        return;
    };
    if doc.ready_state() != "loading" {
        on_page_ready(&config);
        return;
    }
    let on_ready = Closure::once_into_js(move || on_page_ready(&config));
    if let Err(e) = doc.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref()) {
        log::error!("[Init] could not register DOMContentLoaded: {:?}", e);
    }
}

fn on_page_ready(config: &UiConfig) {
    nav::highlight_active_links(&config.nav_link_selector, &config.active_class);
    api::install_csrf_client(config);
}
