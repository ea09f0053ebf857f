use crate::error::{StickyError, StickyResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_PARENT_CLASS: &str = "js-stickybit-parent";
pub const DEFAULT_STICKY_CLASS: &str = "js-is-sticky";
pub const DEFAULT_STUCK_CLASS: &str = "js-is-stuck";
pub const DEFAULT_DEBOUNCE_MS: i32 = 7;

/// Which viewport edge the element sticks to.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VerticalEdge {
    #[default]
    Top,
    Bottom,
}

impl VerticalEdge {
    /// Inline style property holding the sticky offset.
    pub fn style_property(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    /// Parent padding property that reserves the space of a fixed element.
    pub fn padding_property(self) -> &'static str {
        match self {
            Self::Top => "padding-top",
            Self::Bottom => "padding-bottom",
        }
    }
}

/// Where scroll offsets are read from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ScrollSource {
    #[default]
    Window,
    /// First element matching the selector.
    Selector(String),
}

/// Loose option bag, shaped like the JS plugin's options object.
///
/// Every field is optional; `resolve` turns it into a [`StickyConfig`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StickyOptions {
    pub no_styles: bool,
    pub sticky_bit_sticky_offset: f64,
    pub parent_class: String,
    pub scroll_el: Option<String>,
    pub sticky_class: String,
    pub stuck_class: String,
    pub additional_classes: BTreeMap<String, f64>,
    pub use_sticky_classes: bool,
    pub vertical_position: VerticalEdge,
    pub use_fixed: bool,
    pub debounce_ms: i32,
}

impl Default for StickyOptions {
    fn default() -> Self {
        Self {
            no_styles: false,
            sticky_bit_sticky_offset: 0.0,
            parent_class: DEFAULT_PARENT_CLASS.to_string(),
            scroll_el: None,
            sticky_class: DEFAULT_STICKY_CLASS.to_string(),
            stuck_class: DEFAULT_STUCK_CLASS.to_string(),
            additional_classes: BTreeMap::new(),
            use_sticky_classes: false,
            vertical_position: VerticalEdge::Top,
            use_fixed: false,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl StickyOptions {
    pub fn from_json(json: &str) -> StickyResult<Self> {
        serde_json::from_str(json).map_err(StickyError::parse)
    }

    /// Validate once and produce the immutable configuration.
    pub fn resolve(self) -> StickyResult<StickyConfig> {
        validate_class("parentClass", &self.parent_class)?;
        validate_class("stickyClass", &self.sticky_class)?;
        validate_class("stuckClass", &self.stuck_class)?;

        if !self.sticky_bit_sticky_offset.is_finite() {
            return Err(StickyError::invalid("stickyBitStickyOffset must be finite"));
        }

        for (cls, delta) in &self.additional_classes {
            validate_class("additionalClasses", cls)?;
            if !delta.is_finite() {
                return Err(StickyError::invalid(format!(
                    "additionalClasses[{cls}] must be a finite pixel delta"
                )));
            }
        }

        if self.debounce_ms < 0 {
            return Err(StickyError::invalid("debounceMs must not be negative"));
        }

        let scroll_container = match self.scroll_el {
            Some(sel) if !sel.trim().is_empty() => ScrollSource::Selector(sel.trim().to_string()),
            _ => ScrollSource::Window,
        };

        Ok(StickyConfig {
            scroll_container,
            vertical_edge: self.vertical_position,
            offset_px: self.sticky_bit_sticky_offset,
            use_explicit_sticky_classes: self.use_sticky_classes,
            suppress_inline_styles: self.no_styles,
            force_fixed: self.use_fixed,
            parent_marker_class: self.parent_class,
            sticky_marker_class: self.sticky_class,
            stuck_marker_class: self.stuck_class,
            threshold_classes: self.additional_classes,
            debounce_ms: self.debounce_ms,
        })
    }
}

fn validate_class(field: &str, cls: &str) -> StickyResult<()> {
    if cls.is_empty() {
        return Err(StickyError::invalid(format!("{field} must not be empty")));
    }
    if cls.chars().any(char::is_whitespace) {
        return Err(StickyError::invalid(format!(
            "{field} must be a single class name, got {cls:?}"
        )));
    }
    Ok(())
}

/// Validated configuration shared by every instance of one registration.
#[derive(Clone, Debug, PartialEq)]
pub struct StickyConfig {
    pub scroll_container: ScrollSource,
    pub vertical_edge: VerticalEdge,
    pub offset_px: f64,
    pub use_explicit_sticky_classes: bool,
    pub suppress_inline_styles: bool,
    /// Emulate with `position: fixed` even when native sticky exists.
    pub force_fixed: bool,
    pub parent_marker_class: String,
    pub sticky_marker_class: String,
    pub stuck_marker_class: String,
    /// Class name to pixel delta from `sticky_start`.
    pub threshold_classes: BTreeMap<String, f64>,
    pub debounce_ms: i32,
}

impl Default for StickyConfig {
    fn default() -> Self {
        Self {
            scroll_container: ScrollSource::Window,
            vertical_edge: VerticalEdge::Top,
            offset_px: 0.0,
            use_explicit_sticky_classes: false,
            suppress_inline_styles: false,
            force_fixed: false,
            parent_marker_class: DEFAULT_PARENT_CLASS.to_string(),
            sticky_marker_class: DEFAULT_STICKY_CLASS.to_string(),
            stuck_marker_class: DEFAULT_STUCK_CLASS.to_string(),
            threshold_classes: BTreeMap::new(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}
