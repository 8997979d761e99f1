//! `drug-dash` library crate.
//!
//! The binary (`drugdash`) is a thin wrapper around this library so that:
//!
//! - the dashboard bindings are testable without a browser or terminal
//! - the web server and the TUI share one loading pipeline
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod charts;
pub mod cli;
pub mod dashboard;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod missing;
pub mod report;
pub mod tui;
pub mod web;
