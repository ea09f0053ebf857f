//! In-memory document for exercising the sticky core without a browser.

use super::{Dom, ScrollContainer};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct NodeId(usize);

#[derive(Default)]
struct FakeNode {
    parent: Option<NodeId>,
    /// Top in document coordinates, before any scrolling.
    doc_top: f64,
    height: f64,
    client_height: Option<f64>,
    /// Custom scroll container this node scrolls inside of.
    scrolled_by: Option<NodeId>,
    scroll_top: f64,
    connected: bool,
    classes: BTreeSet<String>,
    styles: BTreeMap<String, String>,
}

type Callback = Box<dyn FnMut()>;

struct State {
    nodes: Vec<FakeNode>,
    selectors: BTreeMap<String, Vec<NodeId>>,
    window_scroll: f64,
    sticky: Option<String>,
    frames_supported: bool,
    frames: Vec<Box<dyn FnOnce()>>,
    timers: BTreeMap<usize, Box<dyn FnOnce()>>,
    listeners: BTreeMap<usize, (Option<NodeId>, Option<Callback>)>,
    next_id: usize,
    writes: usize,
}

#[derive(Clone)]
pub(crate) struct FakeDom(Rc<RefCell<State>>);

impl FakeDom {
    pub(crate) fn new() -> Self {
        Self(Rc::new(RefCell::new(State {
            nodes: Vec::new(),
            selectors: BTreeMap::new(),
            window_scroll: 0.0,
            sticky: Some("sticky".to_string()),
            frames_supported: true,
            frames: Vec::new(),
            timers: BTreeMap::new(),
            listeners: BTreeMap::new(),
            next_id: 1,
            writes: 0,
        })))
    }

    pub(crate) fn create(&self, parent: Option<NodeId>, doc_top: f64, height: f64) -> NodeId {
        let mut s = self.0.borrow_mut();
        let scrolled_by = parent.and_then(|p| s.nodes[p.0].scrolled_by);
        s.nodes.push(FakeNode {
            parent,
            doc_top,
            height,
            scrolled_by,
            connected: true,
            ..Default::default()
        });
        NodeId(s.nodes.len() - 1)
    }

    /// Make `node` (and nodes created under it afterwards) scroll inside `container`.
    pub(crate) fn scroll_inside(&self, node: NodeId, container: NodeId) {
        self.0.borrow_mut().nodes[node.0].scrolled_by = Some(container);
    }

    pub(crate) fn name(&self, selector: &str, node: NodeId) {
        self.0
            .borrow_mut()
            .selectors
            .entry(selector.to_string())
            .or_default()
            .push(node);
    }

    pub(crate) fn set_height(&self, node: NodeId, height: f64) {
        self.0.borrow_mut().nodes[node.0].height = height;
    }

    pub(crate) fn set_client_height(&self, node: NodeId, height: f64) {
        self.0.borrow_mut().nodes[node.0].client_height = Some(height);
    }

    pub(crate) fn detach(&self, node: NodeId) {
        let mut s = self.0.borrow_mut();
        let n = &mut s.nodes[node.0];
        n.connected = false;
        n.doc_top = 0.0;
        n.height = 0.0;
    }

    pub(crate) fn set_sticky_support(&self, value: Option<&str>) {
        self.0.borrow_mut().sticky = value.map(str::to_string);
    }

    pub(crate) fn set_frames_supported(&self, supported: bool) {
        self.0.borrow_mut().frames_supported = supported;
    }

    pub(crate) fn set_window_scroll(&self, y: f64) {
        self.0.borrow_mut().window_scroll = y;
    }

    pub(crate) fn set_element_scroll(&self, node: NodeId, y: f64) {
        self.0.borrow_mut().nodes[node.0].scroll_top = y;
    }

    /// Scroll the window and dispatch its scroll listeners.
    pub(crate) fn scroll_window_to(&self, y: f64) {
        self.set_window_scroll(y);
        self.dispatch_scroll(None);
    }

    pub(crate) fn scroll_element_to(&self, node: NodeId, y: f64) {
        self.set_element_scroll(node, y);
        self.dispatch_scroll(Some(node));
    }

    fn dispatch_scroll(&self, target: Option<NodeId>) {
        let ids: Vec<usize> = self
            .0
            .borrow()
            .listeners
            .iter()
            .filter(|(_, (t, _))| *t == target)
            .map(|(id, _)| *id)
            .collect();
        for id in ids {
            // Take the callback out so it may call back into the document.
            let cb = self
                .0
                .borrow_mut()
                .listeners
                .get_mut(&id)
                .and_then(|(_, cb)| cb.take());
            if let Some(mut cb) = cb {
                cb();
                if let Some(slot) = self.0.borrow_mut().listeners.get_mut(&id) {
                    slot.1 = Some(cb);
                }
            }
        }
    }

    pub(crate) fn run_frames(&self) {
        loop {
            let frames = std::mem::take(&mut self.0.borrow_mut().frames);
            if frames.is_empty() {
                break;
            }
            for f in frames {
                f();
            }
        }
    }

    pub(crate) fn pending_frames(&self) -> usize {
        self.0.borrow().frames.len()
    }

    pub(crate) fn run_timers(&self) {
        let timers = std::mem::take(&mut self.0.borrow_mut().timers);
        for (_, f) in timers {
            f();
        }
    }

    pub(crate) fn pending_timers(&self) -> usize {
        self.0.borrow().timers.len()
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.0.borrow().listeners.len()
    }

    /// Number of style and class writes performed so far.
    pub(crate) fn writes(&self) -> usize {
        self.0.borrow().writes
    }

    fn next_id(&self) -> usize {
        let mut s = self.0.borrow_mut();
        let id = s.next_id;
        s.next_id += 1;
        id
    }
}

impl Dom for FakeDom {
    type Node = NodeId;
    type Listener = usize;
    type Timer = usize;

    fn style(&self, node: &NodeId, property: &str) -> String {
        self.0.borrow().nodes[node.0]
            .styles
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        let mut s = self.0.borrow_mut();
        s.writes += 1;
        let styles = &mut s.nodes[node.0].styles;
        if value.is_empty() {
            styles.remove(property);
        } else {
            styles.insert(property.to_string(), value.to_string());
        }
    }

    fn clear_style(&self, node: &NodeId, property: &str) {
        let mut s = self.0.borrow_mut();
        s.writes += 1;
        s.nodes[node.0].styles.remove(property);
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.0.borrow().nodes[node.0].classes.contains(class)
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        let mut s = self.0.borrow_mut();
        s.writes += 1;
        s.nodes[node.0].classes.insert(class.to_string());
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        let mut s = self.0.borrow_mut();
        s.writes += 1;
        s.nodes[node.0].classes.remove(class);
    }

    fn bounding_top(&self, node: &NodeId) -> f64 {
        let s = self.0.borrow();
        let n = &s.nodes[node.0];
        if !n.connected {
            return 0.0;
        }
        let inner = n.scrolled_by.map(|c| s.nodes[c.0].scroll_top).unwrap_or(0.0);
        n.doc_top - s.window_scroll - inner
    }

    fn offset_height(&self, node: &NodeId) -> f64 {
        self.0.borrow().nodes[node.0].height
    }

    fn client_height(&self, node: &NodeId) -> f64 {
        let s = self.0.borrow();
        let n = &s.nodes[node.0];
        n.client_height.unwrap_or(n.height)
    }

    fn is_connected(&self, node: &NodeId) -> bool {
        self.0.borrow().nodes[node.0].connected
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.0.borrow().nodes[node.0].parent
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.0
            .borrow()
            .selectors
            .get(selector)
            .cloned()
            .unwrap_or_default()
    }

    fn scroll_offset(&self, container: &ScrollContainer<NodeId>) -> f64 {
        let s = self.0.borrow();
        match container {
            ScrollContainer::Window => s.window_scroll,
            ScrollContainer::Element(n) => s.nodes[n.0].scroll_top,
        }
    }

    fn sticky_position(&self) -> Option<String> {
        self.0.borrow().sticky.clone()
    }

    fn request_frame(&self, f: Box<dyn FnOnce()>) {
        if self.0.borrow().frames_supported {
            self.0.borrow_mut().frames.push(f);
        } else {
            f();
        }
    }

    fn set_timeout(&self, _ms: i32, f: Box<dyn FnOnce()>) -> Option<usize> {
        let id = self.next_id();
        self.0.borrow_mut().timers.insert(id, f);
        Some(id)
    }

    fn clear_timeout(&self, timer: usize) {
        self.0.borrow_mut().timers.remove(&timer);
    }

    fn listen_scroll(
        &self,
        container: &ScrollContainer<NodeId>,
        f: Box<dyn FnMut()>,
    ) -> Option<usize> {
        let target = match container {
            ScrollContainer::Window => None,
            ScrollContainer::Element(n) => Some(*n),
        };
        let id = self.next_id();
        self.0.borrow_mut().listeners.insert(id, (target, Some(f)));
        Some(id)
    }

    fn unlisten_scroll(&self, listener: usize) {
        self.0.borrow_mut().listeners.remove(&listener);
    }
}
