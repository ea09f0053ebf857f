/// Vendor prefixes tried when probing for `position: sticky`.
pub const STICKY_PREFIXES: [&str; 5] = ["", "-o-", "-webkit-", "-moz-", "-ms-"];

/// How an element is held in place while sticky.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StickyPosition {
    /// The host understands this `position` value (possibly prefixed).
    Native(String),
    /// Emulated with `position: fixed` plus parent padding.
    Fixed,
}

impl StickyPosition {
    /// Pick the position from a probe result and the `force_fixed` option.
    pub fn resolve(probed: Option<String>, force_fixed: bool) -> Self {
        match probed {
            Some(value) if !force_fixed && !value.is_empty() => Self::Native(value),
            _ => Self::Fixed,
        }
    }

    pub fn css_value(&self) -> &str {
        match self {
            Self::Native(v) => v,
            Self::Fixed => "fixed",
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed)
    }
}
