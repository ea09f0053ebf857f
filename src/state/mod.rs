use crate::config::{StickyConfig, VerticalEdge};
use crate::dom::{apply_mutations, commit, Dom, Mutation, ScrollContainer, Timing};
use crate::offsets::compute_thresholds;
use crate::support::StickyPosition;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum StickyState {
    /// In normal flow.
    #[default]
    Default,
    /// Following the viewport inside the parent's bounds.
    Sticky,
    /// Pinned to the bottom of the parent.
    Stuck,
}

/// Decide the next state for `scroll`, or `None` to stay put.
///
/// Boundaries: `start < scroll < stop` enters sticky, `scroll <= start`
/// leaves it for default, `scroll >= stop` leaves it for stuck.
pub fn next_transition(state: StickyState, scroll: f64, start: f64, stop: f64) -> Option<StickyState> {
    use StickyState::*;

    if start < scroll && scroll < stop && matches!(state, Default | Stuck) {
        Some(Sticky)
    } else if scroll <= start && matches!(state, Sticky | Stuck) {
        Some(Default)
    } else if scroll >= stop && state == Sticky {
        Some(Stuck)
    } else {
        None
    }
}

/// Inline styles and classes as they were before registration touched them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleSnapshot {
    position: String,
    top: String,
    bottom: String,
    parent_padding: String,
    parent_marker: bool,
    classes: BTreeMap<String, bool>,
}

impl StyleSnapshot {
    pub fn capture<D: Dom>(dom: &D, element: &D::Node, parent: Option<&D::Node>, config: &StickyConfig) -> Self {
        let classes = managed_classes(config)
            .map(|cls| (cls.to_string(), dom.has_class(element, cls)))
            .collect();
        Self {
            position: dom.style(element, "position"),
            top: dom.style(element, "top"),
            bottom: dom.style(element, "bottom"),
            parent_padding: parent
                .map(|p| dom.style(p, config.vertical_edge.padding_property()))
                .unwrap_or_default(),
            parent_marker: parent
                .map(|p| dom.has_class(p, &config.parent_marker_class))
                .unwrap_or(false),
            classes,
        }
    }

    /// Mutations that put the element's own inline styles back.
    pub(crate) fn restore_element<N: Clone>(&self, element: &N) -> Vec<Mutation<N>> {
        [("position", &self.position), ("top", &self.top), ("bottom", &self.bottom)]
            .into_iter()
            .map(|(prop, value)| restore_style(element, prop, value))
            .collect()
    }

    pub(crate) fn had_class(&self, class: &str) -> bool {
        self.classes.get(class).copied().unwrap_or(false)
    }
}

fn restore_style<N: Clone>(node: &N, prop: &'static str, value: &str) -> Mutation<N> {
    if value.is_empty() {
        Mutation::ClearStyle(node.clone(), prop)
    } else {
        Mutation::SetStyle(node.clone(), prop, value.to_string())
    }
}

fn restore_class<N: Clone>(node: &N, class: &str, present: bool) -> Mutation<N> {
    if present {
        Mutation::AddClass(node.clone(), class.to_string())
    } else {
        Mutation::RemoveClass(node.clone(), class.to_string())
    }
}

/// Classes this crate toggles on the element itself.
fn managed_classes(config: &StickyConfig) -> impl Iterator<Item = &str> {
    [config.sticky_marker_class.as_str(), config.stuck_marker_class.as_str()]
        .into_iter()
        .chain(config.threshold_classes.keys().map(String::as_str))
}

/// Per-element sticky bookkeeping.
#[derive(Debug)]
pub struct StickyInstance<N> {
    pub element: N,
    pub parent: N,
    pub config: Rc<StickyConfig>,
    pub container: ScrollContainer<N>,
    pub position: StickyPosition,
    pub state: StickyState,
    pub sticky_start: f64,
    pub sticky_stop: f64,
    pub offset: f64,
    pub threshold_positions: BTreeMap<String, f64>,
    pub threshold_state: BTreeMap<String, bool>,
    snapshot: StyleSnapshot,
    live: Rc<Cell<bool>>,
}

impl<N: Clone + PartialEq + std::fmt::Debug + 'static> StickyInstance<N> {
    pub fn new<D: Dom<Node = N>>(
        dom: &D,
        element: N,
        parent: N,
        container: ScrollContainer<N>,
        config: Rc<StickyConfig>,
        position: StickyPosition,
        snapshot: StyleSnapshot,
    ) -> Self {
        let threshold_state = config
            .threshold_classes
            .keys()
            .map(|cls| (cls.clone(), snapshot.had_class(cls)))
            .collect();
        let mut it = Self {
            element,
            parent,
            config,
            container,
            position,
            state: StickyState::Default,
            sticky_start: 0.0,
            sticky_stop: 0.0,
            offset: 0.0,
            threshold_positions: BTreeMap::new(),
            threshold_state,
            snapshot,
            live: Rc::new(Cell::new(true)),
        };
        refresh_thresholds(dom, &mut it);
        it
    }

    /// Whether the instance still owns its element (not torn down).
    pub fn is_live(&self) -> bool {
        self.live.get()
    }

    fn timing(&self) -> Timing {
        // The window batches with paint; a custom container has no frame hook.
        if self.container.is_window() {
            Timing::NextFrame
        } else {
            Timing::Immediate
        }
    }
}

pub fn refresh_thresholds<D: Dom>(dom: &D, it: &mut StickyInstance<D::Node>) {
    let t = compute_thresholds(dom, &it.element, &it.parent, &it.container, &it.config, &it.position);
    it.sticky_start = t.sticky_start;
    it.sticky_stop = t.sticky_stop;
    it.offset = t.offset;
    it.threshold_positions = t.positions;
}

/// Recompute thresholds, move to the next state and schedule its side effects.
pub fn manage_state<'a, D: Dom>(
    dom: &D,
    it: &'a mut StickyInstance<D::Node>,
) -> &'a mut StickyInstance<D::Node> {
    run_tick(dom, it, None)
}

/// Same as [`manage_state`], but side effects land before this returns.
pub fn sync_state<'a, D: Dom>(
    dom: &D,
    it: &'a mut StickyInstance<D::Node>,
) -> &'a mut StickyInstance<D::Node> {
    run_tick(dom, it, Some(Timing::Immediate))
}

fn run_tick<'a, D: Dom>(
    dom: &D,
    it: &'a mut StickyInstance<D::Node>,
    timing: Option<Timing>,
) -> &'a mut StickyInstance<D::Node> {
    if !it.is_live() {
        return it;
    }
    refresh_thresholds(dom, it);
    let scroll = dom.scroll_offset(&it.container);

    if let Some(to) = next_transition(it.state, scroll, it.sticky_start, it.sticky_stop) {
        let from = it.state;
        it.state = to;
        let batch = transition_mutations(dom, it, from, to);
        commit(dom, timing.unwrap_or_else(|| it.timing()), batch, &it.live);
    }

    let mut batch = Vec::new();
    for (cls, threshold) in &it.threshold_positions {
        let active = scroll >= *threshold;
        let was = it.threshold_state.insert(cls.clone(), active);
        if was == Some(active) {
            continue;
        }
        batch.push(if active {
            Mutation::AddClass(it.element.clone(), cls.clone())
        } else {
            Mutation::RemoveClass(it.element.clone(), cls.clone())
        });
    }
    commit(dom, Timing::Immediate, batch, &it.live);

    it
}

fn transition_mutations<D: Dom>(
    dom: &D,
    it: &StickyInstance<D::Node>,
    from: StickyState,
    to: StickyState,
) -> Vec<Mutation<D::Node>> {
    let cfg = &it.config;
    let el = &it.element;
    let parent = &it.parent;
    let edge = cfg.vertical_edge;
    let styled = !cfg.suppress_inline_styles;
    let padding = || {
        Mutation::SetStyle(
            parent.clone(),
            edge.padding_property(),
            format!("{}px", dom.client_height(el)),
        )
    };

    let mut out = Vec::new();
    match to {
        StickyState::Sticky => {
            out.push(Mutation::RemoveClass(el.clone(), cfg.stuck_marker_class.clone()));
            out.push(Mutation::AddClass(el.clone(), cfg.sticky_marker_class.clone()));
            out.push(Mutation::SetStyle(
                el.clone(),
                "position",
                it.position.css_value().to_string(),
            ));
            if styled {
                out.push(Mutation::ClearStyle(el.clone(), "bottom"));
                out.push(Mutation::SetStyle(
                    el.clone(),
                    edge.style_property(),
                    format!("{}px", cfg.offset_px),
                ));
                if it.position.is_fixed() {
                    out.push(padding());
                } else if from == StickyState::Stuck {
                    // Back in flow: the space held while stuck is no longer needed.
                    out.push(Mutation::ClearStyle(parent.clone(), edge.padding_property()));
                }
            }
        }
        StickyState::Default => {
            out.push(Mutation::RemoveClass(el.clone(), cfg.sticky_marker_class.clone()));
            if from == StickyState::Stuck {
                out.push(Mutation::RemoveClass(el.clone(), cfg.stuck_marker_class.clone()));
            }
            // Back in normal flow: no inline position in either mode.
            out.push(Mutation::ClearStyle(el.clone(), "position"));
            if styled {
                if from == StickyState::Stuck || edge == VerticalEdge::Bottom {
                    out.push(Mutation::ClearStyle(el.clone(), "bottom"));
                }
                if from == StickyState::Stuck && edge == VerticalEdge::Top {
                    out.push(Mutation::SetStyle(el.clone(), "top", format!("{}px", cfg.offset_px)));
                }
                if it.position.is_fixed() || from == StickyState::Stuck {
                    out.push(Mutation::ClearStyle(parent.clone(), edge.padding_property()));
                }
            }
        }
        StickyState::Stuck => {
            out.push(Mutation::RemoveClass(el.clone(), cfg.sticky_marker_class.clone()));
            out.push(Mutation::AddClass(el.clone(), cfg.stuck_marker_class.clone()));
            if styled {
                out.push(Mutation::ClearStyle(el.clone(), "top"));
                out.push(Mutation::SetStyle(el.clone(), "bottom", "0".to_string()));
                out.push(Mutation::SetStyle(el.clone(), "position", "absolute".to_string()));
                out.push(padding());
            }
        }
    }
    out
}

/// Revert everything this instance wrote and stop it from writing again.
///
/// Safe to call more than once.
pub fn remove_instance<D: Dom>(dom: &D, it: &mut StickyInstance<D::Node>) {
    it.live.set(false);

    let cfg = it.config.clone();
    let snap = &it.snapshot;
    let mut batch = snap.restore_element(&it.element);
    batch.push(restore_style(
        &it.parent,
        cfg.vertical_edge.padding_property(),
        &snap.parent_padding,
    ));
    for cls in managed_classes(&cfg) {
        batch.push(restore_class(&it.element, cls, snap.had_class(cls)));
    }
    batch.push(restore_class(&it.parent, &cfg.parent_marker_class, snap.parent_marker));
    apply_mutations(dom, batch);

    it.state = StickyState::Default;
    for active in it.threshold_state.values_mut() {
        *active = false;
    }
}
