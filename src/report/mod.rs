//! Reporting utilities: plain-text renderings of the dashboard views.

pub mod format;

pub use format::*;
