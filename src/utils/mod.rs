//! Utility modules for eduvis
//!
//! Text escaping for generated markup and cancellation handles for in-flight requests.

pub mod cancel;
pub mod sanitize;

pub use cancel::*;
pub use sanitize::{markup_text, sanitize};
