use crate::config::{StickyConfig, VerticalEdge};
use crate::dom::{Dom, ScrollContainer};
use crate::support::StickyPosition;
use std::collections::BTreeMap;

/// Scroll positions at which an instance changes state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Thresholds {
    pub sticky_start: f64,
    pub sticky_stop: f64,
    /// Distance from the container edge the element holds while sticky.
    pub offset: f64,
    /// Scroll position at which each threshold class switches on.
    pub positions: BTreeMap<String, f64>,
}

impl Thresholds {
    /// Zero thresholds for a node with no usable geometry.
    fn degenerate(config: &StickyConfig) -> Self {
        Self {
            sticky_start: 0.0,
            sticky_stop: 0.0,
            offset: 0.0,
            positions: config
                .threshold_classes
                .keys()
                .map(|cls| (cls.clone(), 0.0))
                .collect(),
        }
    }
}

/// Derive the current thresholds from live geometry.
///
/// Nothing is cached: the parent can grow, shrink or move between two
/// scroll ticks, so this runs on every tick.
pub fn compute_thresholds<D: Dom>(
    dom: &D,
    element: &D::Node,
    parent: &D::Node,
    container: &ScrollContainer<D::Node>,
    config: &StickyConfig,
    position: &StickyPosition,
) -> Thresholds {
    if !dom.is_connected(element) || !dom.is_connected(parent) {
        return Thresholds::degenerate(config);
    }

    let element_height = dom.offset_height(element);
    let parent_height = dom.offset_height(parent);
    if element_height <= 0.0 && parent_height <= 0.0 {
        return Thresholds::degenerate(config);
    }

    let scroll = dom.scroll_offset(container);

    // A fixed element inside a custom container is placed relative to the
    // viewport, so the container's own top has to be added to its offset.
    let scroll_el_offset = match container {
        ScrollContainer::Element(el) if position.is_fixed() => dom.bounding_top(el),
        _ => 0.0,
    };

    // Unlike the JS plugin, the container's scroll is added back here too, so
    // a fixed element's start stays put while its container scrolls.
    let mut sticky_start = scroll + dom.bounding_top(parent) - scroll_el_offset;
    let offset = scroll_el_offset + config.offset_px;

    let sticky_stop = match config.vertical_edge {
        VerticalEdge::Top => {
            sticky_start = sticky_start.max(0.0);
            sticky_start + parent_height - (element_height - offset)
        }
        VerticalEdge::Bottom => sticky_start + parent_height - (element_height + offset),
    };

    let positions = config
        .threshold_classes
        .iter()
        .map(|(cls, delta)| (cls.clone(), sticky_start + delta))
        .collect();

    Thresholds {
        sticky_start,
        // An element at least as tall as its range is stuck as soon as it is sticky.
        sticky_stop: sticky_stop.max(sticky_start),
        offset,
        positions,
    }
}
