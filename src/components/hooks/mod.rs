pub mod use_stickybits;

pub use use_stickybits::*;
