use crate::app::toast::{Notifier, SystemClock, Toast, ToastCenter};
use crate::app::types::Severity;
use leptos::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

const CONTAINER_CLASS: &str = "toast-container position-fixed bottom-0 end-0 p-3";
const HIDDEN_EVENT: &str = "hidden.bs.toast";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = bootstrap, js_name = Toast)]
    type BootstrapToast;

    #[wasm_bindgen(catch, constructor, js_namespace = bootstrap, js_class = "Toast")]
    fn new(element: &web_sys::Element) -> Result<BootstrapToast, JsValue>;

    #[wasm_bindgen(method)]
    fn show(this: &BootstrapToast);
}

/// Bootstrap toasts appended to a shared fixed-position container.
#[derive(Clone)]
pub struct DomToaster {
    center: Rc<ToastCenter<SystemClock>>,
    container_id: String,
}

impl DomToaster {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self { center: Rc::new(ToastCenter::new(SystemClock)), container_id: container_id.into() }
    }

    pub fn live_toasts(&self) -> usize {
        self.center.len()
    }

    fn ensure_container(&self, doc: &web_sys::Document) -> Result<web_sys::HtmlElement, JsValue> {
        if let Some(existing) = doc.get_element_by_id(&self.container_id) {
            return existing.dyn_into::<web_sys::HtmlElement>().map_err(JsValue::from);
        }
        let container = doc.create_element("div")?;
        container.set_id(&self.container_id);
        container.set_class_name(CONTAINER_CLASS);
        let body = doc.body().ok_or_else(|| JsValue::from_str("document has no body"))?;
        body.append_child(&container)?;
        log::debug!("[Toast] created container #{}", self.container_id);
        container.dyn_into::<web_sys::HtmlElement>().map_err(JsValue::from)
    }

    fn render(&self, message: &str, severity: Severity) -> Result<(), JsValue> {
        let doc = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let container = self.ensure_container(&doc)?;

        let toast = self.center.push(message, severity);
        let id = toast.id.clone();
        let handle = leptos::mount::mount_to(container, move || toast_view(toast));

        let Some(element) = doc.get_element_by_id(id.as_str()) else {
            self.center.dismiss(&id);
            return Err(JsValue::from_str("toast element missing after mount"));
        };

        let widget = match BootstrapToast::new(&element) {
            Ok(widget) => widget,
            Err(e) => {
                log::warn!("[Toast] bootstrap.Toast unavailable, dropping {}: {:?}", id, e);
                drop(handle);
                self.center.dismiss(&id);
                return Ok(());
            }
        };

        let mounted = Rc::new(RefCell::new(Some(handle)));
        let center = self.center.clone();
        let on_hidden = {
            let mounted = mounted.clone();
            let id = id.clone();
            Closure::once_into_js(move |_ev: web_sys::Event| {
                if mounted.borrow_mut().take().is_some() {
                    center.dismiss(&id);
                    log::debug!("[Toast] removed {}", id);
                }
            })
        };
        if let Err(e) = element.add_event_listener_with_callback(HIDDEN_EVENT, on_hidden.unchecked_ref()) {
            mounted.borrow_mut().take();
            self.center.dismiss(&id);
            return Err(e);
        }

        widget.show();
        Ok(())
    }
}

impl Notifier for DomToaster {
    fn show(&self, message: &str, severity: Severity) {
        if let Err(e) = self.render(message, severity) {
            log::error!("[Toast] failed to show toast: {:?}", e);
        }
    }
}

fn toast_view(toast: Toast) -> impl IntoView {
    let class = toast.class_name();
    let Toast { id, message, .. } = toast;
    view! {
        <div
            class=class
            id=id.to_string()
            role="alert"
            aria-live="assertive"
            aria-atomic="true"
        >
            <div class="d-flex">
                <div class="toast-body" inner_html=message></div>
                <button
                    type="button"
                    class="btn-close btn-close-white me-2 m-auto"
                    data-bs-dismiss="toast"
                    aria-label="Close"
                ></button>
            </div>
        </div>
    }
}
