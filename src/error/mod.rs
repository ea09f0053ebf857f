#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StickyErrorKind {
    /// The option bag could not be parsed or failed validation.
    InvalidOptions,
    /// The host rejected a DOM operation needed before registration.
    Dom,
}

#[derive(Clone, Debug)]
pub struct StickyError {
    pub kind: StickyErrorKind,
    pub message: String,
}

impl std::fmt::Display for StickyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StickyError {}

impl StickyError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self {
            kind: StickyErrorKind::InvalidOptions,
            message: message.into(),
        }
    }

    pub(crate) fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: StickyErrorKind::InvalidOptions,
            message: format!("could not parse options: {e}"),
        }
    }

    pub(crate) fn dom(ctx: &str, detail: impl std::fmt::Debug) -> Self {
        Self {
            kind: StickyErrorKind::Dom,
            message: format!("{ctx}: {detail:?}"),
        }
    }
}

pub type StickyResult<T> = Result<T, StickyError>;
