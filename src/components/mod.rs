pub mod hooks;
pub mod sticky;

// Re-export so callers can `use stickybits::components::Sticky`.
pub use hooks::*;
pub use sticky::*;
