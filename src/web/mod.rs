use crate::dom::{Dom, ScrollContainer};
use crate::support::STICKY_PREFIXES;
use std::cell::{OnceCell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{EventTarget, HtmlElement};

thread_local! {
    // Probed on first use, then read for the life of the page.
    static STICKY_PROBE: OnceCell<Option<String>> = const { OnceCell::new() };
}

/// Write every prefixed `sticky` value to a scratch style and keep the one
/// the engine accepted.
fn probe_sticky_position() -> Option<String> {
    let head = web_sys::window()?.document()?.head()?;
    let style = head.style();
    for prefix in STICKY_PREFIXES {
        let _ = style.set_property("position", &format!("{prefix}sticky"));
    }
    let accepted = style.get_property_value("position").unwrap_or_default();
    let _ = style.remove_property("position");
    if accepted.is_empty() {
        None
    } else {
        Some(accepted)
    }
}

type FrameSlot = Rc<RefCell<Option<Box<dyn FnOnce()>>>>;

fn run_slot(slot: &FrameSlot) {
    let f = slot.borrow_mut().take();
    if let Some(f) = f {
        f();
    }
}

/// A scroll subscription on the window or an element.
pub struct WebListener {
    target: EventTarget,
    closure: Closure<dyn FnMut()>,
}

impl std::fmt::Debug for WebListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebListener").field("target", &self.target).finish()
    }
}

/// [`Dom`] over the real browser document.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebDom;

impl WebDom {
    pub fn new() -> Self {
        Self
    }

    fn event_target(container: &ScrollContainer<HtmlElement>) -> Option<EventTarget> {
        match container {
            ScrollContainer::Window => web_sys::window().map(EventTarget::from),
            ScrollContainer::Element(el) => Some(EventTarget::from(el.clone())),
        }
    }
}

impl Dom for WebDom {
    type Node = HtmlElement;
    type Listener = WebListener;
    type Timer = i32;

    fn style(&self, node: &HtmlElement, property: &str) -> String {
        node.style().get_property_value(property).unwrap_or_default()
    }

    fn set_style(&self, node: &HtmlElement, property: &str, value: &str) {
        let _ = node.style().set_property(property, value);
    }

    fn clear_style(&self, node: &HtmlElement, property: &str) {
        let _ = node.style().remove_property(property);
    }

    fn has_class(&self, node: &HtmlElement, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&self, node: &HtmlElement, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&self, node: &HtmlElement, class: &str) {
        let _ = node.class_list().remove_1(class);
    }

    fn bounding_top(&self, node: &HtmlElement) -> f64 {
        node.get_bounding_client_rect().top()
    }

    fn offset_height(&self, node: &HtmlElement) -> f64 {
        f64::from(node.offset_height())
    }

    fn client_height(&self, node: &HtmlElement) -> f64 {
        f64::from(node.client_height())
    }

    fn is_connected(&self, node: &HtmlElement) -> bool {
        node.is_connected()
    }

    fn parent(&self, node: &HtmlElement) -> Option<HtmlElement> {
        node.parent_element()
            .and_then(|p| p.dyn_into::<HtmlElement>().ok())
    }

    fn query_all(&self, selector: &str) -> Vec<HtmlElement> {
        let Some(list) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.query_selector_all(selector).ok())
        else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|n| n.dyn_into::<HtmlElement>().ok())
            .collect()
    }

    fn scroll_offset(&self, container: &ScrollContainer<HtmlElement>) -> f64 {
        match container {
            ScrollContainer::Window => web_sys::window()
                .and_then(|w| w.scroll_y().or_else(|_| w.page_y_offset()).ok())
                .unwrap_or(0.0),
            ScrollContainer::Element(el) => f64::from(el.scroll_top()),
        }
    }

    fn sticky_position(&self) -> Option<String> {
        STICKY_PROBE.with(|cell| cell.get_or_init(probe_sticky_position).clone())
    }

    fn request_frame(&self, f: Box<dyn FnOnce()>) {
        let slot: FrameSlot = Rc::new(RefCell::new(Some(f)));
        let Some(win) = web_sys::window() else {
            run_slot(&slot);
            return;
        };
        let deferred = slot.clone();
        let cb = Closure::once_into_js(move || run_slot(&deferred));
        if win.request_animation_frame(cb.as_ref().unchecked_ref()).is_err() {
            run_slot(&slot);
        }
    }

    fn set_timeout(&self, ms: i32, f: Box<dyn FnOnce()>) -> Option<i32> {
        let win = web_sys::window()?;
        let cb = Closure::once_into_js(move || f());
        win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), ms)
            .ok()
    }

    fn clear_timeout(&self, timer: i32) {
        if let Some(win) = web_sys::window() {
            win.clear_timeout_with_handle(timer);
        }
    }

    fn listen_scroll(
        &self,
        container: &ScrollContainer<HtmlElement>,
        f: Box<dyn FnMut()>,
    ) -> Option<WebListener> {
        let target = Self::event_target(container)?;
        let closure = Closure::wrap(f);
        target
            .add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref())
            .ok()?;
        Some(WebListener { target, closure })
    }

    fn unlisten_scroll(&self, listener: WebListener) {
        let _ = listener
            .target
            .remove_event_listener_with_callback("scroll", listener.closure.as_ref().unchecked_ref());
    }
}
