//! The slice of the host DOM the sticky core depends on.
//!
//! Everything that touches a real document goes through [`Dom`], so the
//! offset calculator and the state machine run unchanged against
//! [`crate::web::WebDom`] in the browser and an in-memory fake in tests.

#[cfg(test)]
pub(crate) mod fake;

use std::cell::Cell;
use std::rc::Rc;

/// The element (or the window) whose scroll offset drives an instance.
#[derive(Clone, Debug, PartialEq)]
pub enum ScrollContainer<N> {
    Window,
    Element(N),
}

impl<N> ScrollContainer<N> {
    pub fn is_window(&self) -> bool {
        matches!(self, Self::Window)
    }
}

/// Host capabilities used by the sticky core.
///
/// Implementations swallow host failures: a rejected write is a no-op and
/// a failed geometry read is `0.0`.
pub trait Dom: Clone + 'static {
    type Node: Clone + PartialEq + std::fmt::Debug + 'static;
    /// Owns a subscribed scroll callback until it is handed back.
    type Listener;
    type Timer: Copy + std::fmt::Debug + 'static;

    /// Inline style value, empty when unset.
    fn style(&self, node: &Self::Node, property: &str) -> String;
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);
    fn clear_style(&self, node: &Self::Node, property: &str);

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);

    /// Viewport-relative top of the border box.
    fn bounding_top(&self, node: &Self::Node) -> f64;
    fn offset_height(&self, node: &Self::Node) -> f64;
    fn client_height(&self, node: &Self::Node) -> f64;
    fn is_connected(&self, node: &Self::Node) -> bool;
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn query_all(&self, selector: &str) -> Vec<Self::Node>;
    fn query(&self, selector: &str) -> Option<Self::Node> {
        self.query_all(selector).into_iter().next()
    }

    /// Vertical scroll offset of the window or of an element.
    fn scroll_offset(&self, container: &ScrollContainer<Self::Node>) -> f64;

    /// The `position` value that gives native sticky behaviour, if any.
    fn sticky_position(&self) -> Option<String>;

    /// Run `f` before the next paint, or right away when the host has no
    /// animation-frame hook.
    fn request_frame(&self, f: Box<dyn FnOnce()>);
    fn set_timeout(&self, ms: i32, f: Box<dyn FnOnce()>) -> Option<Self::Timer>;
    fn clear_timeout(&self, timer: Self::Timer);

    fn listen_scroll(
        &self,
        container: &ScrollContainer<Self::Node>,
        f: Box<dyn FnMut()>,
    ) -> Option<Self::Listener>;
    fn unlisten_scroll(&self, listener: Self::Listener);
}

/// One deferred DOM write.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation<N> {
    AddClass(N, String),
    RemoveClass(N, String),
    SetStyle(N, &'static str, String),
    ClearStyle(N, &'static str),
}

/// When a batch of mutations lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timing {
    Immediate,
    NextFrame,
}

pub fn apply_mutations<D: Dom>(dom: &D, batch: Vec<Mutation<D::Node>>) {
    for m in batch {
        match m {
            Mutation::AddClass(node, cls) => {
                if !dom.has_class(&node, &cls) {
                    dom.add_class(&node, &cls);
                }
            }
            Mutation::RemoveClass(node, cls) => {
                if dom.has_class(&node, &cls) {
                    dom.remove_class(&node, &cls);
                }
            }
            Mutation::SetStyle(node, prop, value) => dom.set_style(&node, prop, &value),
            Mutation::ClearStyle(node, prop) => dom.clear_style(&node, prop),
        }
    }
}

/// Apply `batch` now or on the next frame.
///
/// A deferred batch is dropped if `live` was cleared before the frame ran.
pub fn commit<D: Dom>(
    dom: &D,
    timing: Timing,
    batch: Vec<Mutation<D::Node>>,
    live: &Rc<Cell<bool>>,
) {
    if batch.is_empty() || !live.get() {
        return;
    }
    match timing {
        Timing::Immediate => apply_mutations(dom, batch),
        Timing::NextFrame => {
            let d = dom.clone();
            let live = live.clone();
            dom.request_frame(Box::new(move || {
                if live.get() {
                    apply_mutations(&d, batch);
                }
            }));
        }
    }
}
