use crate::app::types::Severity;
use std::cell::{Cell, RefCell};
use std::fmt;

pub trait Clock {
    fn now_millis(&self) -> u64;
}

/// Wall clock of the host: `Date.now()` in the browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_millis(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_millis(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToastId(String);

impl ToastId {
    fn from_millis(ms: u64) -> Self {
        ToastId(format!("toast-{}", ms))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: ToastId,
    pub severity: Severity,
    /// Raw HTML, inserted as-is.
    pub message: String,
}

impl Toast {
    pub fn class_name(&self) -> String {
        format!("toast align-items-center text-white bg-{} border-0", self.severity)
    }
}

/// Anything that can put a message in front of the user.
pub trait Notifier {
    fn show(&self, message: &str, severity: Severity);
}

/// Live toasts in insertion order. `dismiss` is the hide-complete callback.
pub struct ToastCenter<C: Clock = SystemClock> {
    clock: C,
    last_millis: Cell<Option<u64>>,
    toasts: RefCell<Vec<Toast>>,
}

impl<C: Clock> ToastCenter<C> {
    pub fn new(clock: C) -> Self {
        Self { clock, last_millis: Cell::new(None), toasts: RefCell::new(Vec::new()) }
    }

    pub fn push(&self, message: &str, severity: Severity) -> Toast {
        let toast = Toast { id: self.next_id(), severity, message: message.to_string() };
        self.toasts.borrow_mut().push(toast.clone());
        toast
    }

    pub fn dismiss(&self, id: &ToastId) -> bool {
        let mut toasts = self.toasts.borrow_mut();
        let before = toasts.len();
        toasts.retain(|t| &t.id != id);
        toasts.len() != before
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.toasts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.borrow().is_empty()
    }

    // Two toasts in the same millisecond would share an id.
    fn next_id(&self) -> ToastId {
        let now = self.clock.now_millis();
        let ms = match self.last_millis.get() {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last_millis.set(Some(ms));
        ToastId::from_millis(ms)
    }
}

impl<C: Clock> Notifier for ToastCenter<C> {
    fn show(&self, message: &str, severity: Severity) {
        self.push(message, severity);
    }
}
