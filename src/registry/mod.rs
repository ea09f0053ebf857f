use crate::config::{ScrollSource, StickyConfig, StickyOptions, VerticalEdge};
use crate::dom::{apply_mutations, Dom, ScrollContainer};
use crate::error::StickyResult;
use crate::schedule::{RateLimit, ScrollGate};
use crate::state::{manage_state, remove_instance, sync_state, StickyInstance, StickyState, StyleSnapshot};
use crate::support::StickyPosition;
use leptos::logging::{log, warn};
use std::cell::{Ref, RefCell};
use std::rc::Rc;

/// What to make sticky.
#[derive(Clone, Debug, PartialEq)]
pub enum Target<N> {
    Element(N),
    /// Every element matching a CSS selector.
    Selector(String),
    Collection(Vec<N>),
}

struct Entry<D: Dom> {
    instance: Rc<RefCell<StickyInstance<D::Node>>>,
    gate: ScrollGate<D>,
    listener: Option<D::Listener>,
}

/// One registration: the instances it created and the listeners feeding them.
///
/// Dropping it tears everything down, as does [`Stickybits::cleanup`].
pub struct Stickybits<D: Dom> {
    dom: D,
    config: Rc<StickyConfig>,
    position: StickyPosition,
    entries: Vec<Entry<D>>,
    /// Elements left to native `position: sticky`, with their original styles.
    native: Vec<(D::Node, StyleSnapshot)>,
    torn_down: bool,
}

impl<D: Dom> std::fmt::Debug for Stickybits<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stickybits")
            .field("position", &self.position)
            .field("instances", &self.entries.len())
            .field("native", &self.native.len())
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

impl<D: Dom> Stickybits<D> {
    pub fn register(dom: D, target: Target<D::Node>, options: StickyOptions) -> StickyResult<Self> {
        let config = options.resolve()?;
        Ok(Self::with_config(dom, target, Rc::new(config)))
    }

    /// Register with an already validated configuration.
    pub fn with_config(dom: D, target: Target<D::Node>, config: Rc<StickyConfig>) -> Self {
        let position = StickyPosition::resolve(dom.sticky_position(), config.force_fixed);
        let elements = match target {
            Target::Element(el) => vec![el],
            Target::Selector(sel) => dom.query_all(&sel),
            Target::Collection(els) => els,
        };
        if position.is_fixed() && !elements.is_empty() && !config.force_fixed {
            log!("stickybits: no native sticky support, emulating with position: fixed");
        }

        let mut sb = Self {
            dom,
            config,
            position,
            entries: Vec::new(),
            native: Vec::new(),
            torn_down: false,
        };
        // Snapshot every target before any of them writes, so siblings
        // sharing a parent all remember the parent as it was.
        let prepared: Vec<_> = elements
            .into_iter()
            .map(|el| {
                let parent = sb.dom.parent(&el);
                let snapshot = StyleSnapshot::capture(&sb.dom, &el, parent.as_ref(), &sb.config);
                (el, parent, snapshot)
            })
            .collect();
        for (el, parent, snapshot) in prepared {
            sb.add(el, parent, snapshot);
        }
        sb
    }

    fn add(&mut self, el: D::Node, parent: Option<D::Node>, snapshot: StyleSnapshot) {
        let dom = self.dom.clone();
        let cfg = self.config.clone();
        let styled = !cfg.suppress_inline_styles;
        let write_top = || {
            if styled && cfg.vertical_edge == VerticalEdge::Top {
                dom.set_style(&el, "top", &format!("{}px", cfg.offset_px));
            }
        };

        // Native sticky does the work unless the caller wants state classes.
        if let StickyPosition::Native(value) = &self.position {
            if !cfg.use_explicit_sticky_classes {
                write_top();
                dom.set_style(&el, "position", value);
                self.native.push((el, snapshot));
                return;
            }
        }

        let Some(parent) = parent else {
            warn!("stickybits: skipping {el:?}, it has no parent element");
            return;
        };
        let container = match &cfg.scroll_container {
            ScrollSource::Window => ScrollContainer::Window,
            ScrollSource::Selector(sel) => match dom.query(sel) {
                Some(node) => ScrollContainer::Element(node),
                None => {
                    warn!("stickybits: scroll container {sel:?} not found, skipping {el:?}");
                    return;
                }
            },
        };

        write_top();
        if !dom.has_class(&parent, &cfg.parent_marker_class) {
            dom.add_class(&parent, &cfg.parent_marker_class);
        }

        let instance = StickyInstance::new(
            &dom,
            el.clone(),
            parent,
            container.clone(),
            cfg.clone(),
            self.position.clone(),
            snapshot,
        );
        let instance = Rc::new(RefCell::new(instance));
        manage_state(&dom, &mut instance.borrow_mut());

        let policy = if container.is_window() {
            RateLimit::AnimationFrame
        } else {
            RateLimit::Debounce(cfg.debounce_ms)
        };
        let gate = ScrollGate::new(dom.clone(), policy);

        let weak = Rc::downgrade(&instance);
        let tick_dom = dom.clone();
        let tick: Rc<dyn Fn()> = Rc::new(move || {
            let Some(inst) = weak.upgrade() else {
                return;
            };
            // A re-entrant tick (e.g. a scroll fired from a style write) is dropped.
            let borrowed = inst.try_borrow_mut();
            if let Ok(mut it) = borrowed {
                manage_state(&tick_dom, &mut it);
            }
        });
        let listener_gate = gate.clone();
        let listener = dom.listen_scroll(
            &container,
            Box::new(move || listener_gate.trigger(tick.clone())),
        );
        if listener.is_none() {
            warn!("stickybits: could not listen for scroll events on {container:?}");
        }

        self.entries.push(Entry {
            instance,
            gate,
            listener,
        });
    }

    pub fn config(&self) -> &StickyConfig {
        &self.config
    }

    /// The position value used while sticky (native or `fixed`).
    pub fn position(&self) -> &StickyPosition {
        &self.position
    }

    /// Number of state-managed instances.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn instances(&self) -> impl Iterator<Item = Ref<'_, StickyInstance<D::Node>>> + '_ {
        self.entries.iter().map(|e| e.instance.borrow())
    }

    pub fn instance(&self, index: usize) -> Option<Ref<'_, StickyInstance<D::Node>>> {
        self.entries.get(index).map(|e| e.instance.borrow())
    }

    pub fn states(&self) -> Vec<StickyState> {
        self.instances().map(|it| it.state).collect()
    }

    /// Re-read geometry and re-evaluate every instance right now.
    pub fn refresh(&self) {
        for i in 0..self.entries.len() {
            self.refresh_instance(i);
        }
    }

    /// Returns false when there is no instance at `index`.
    pub fn refresh_instance(&self, index: usize) -> bool {
        let Some(entry) = self.entries.get(index) else {
            return false;
        };
        if let Ok(mut it) = entry.instance.try_borrow_mut() {
            sync_state(&self.dom, &mut it);
        }
        true
    }

    /// Detach listeners and revert every style and class this registration
    /// wrote. Safe to call more than once.
    pub fn cleanup(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        for mut entry in self.entries.drain(..) {
            entry.gate.cancel();
            if let Some(listener) = entry.listener.take() {
                self.dom.unlisten_scroll(listener);
            }
            remove_instance(&self.dom, &mut entry.instance.borrow_mut());
        }
        for (el, snapshot) in self.native.drain(..) {
            apply_mutations(&self.dom, snapshot.restore_element(&el));
        }
    }
}

impl<D: Dom> Drop for Stickybits<D> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
