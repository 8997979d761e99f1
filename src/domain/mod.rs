//! Domain types used throughout the dashboard.
//!
//! This module defines:
//!
//! - the review record and its six-valued `Category`
//! - control inputs (`YearRange`, `Percentage`)
//! - the resolved run configuration (`DashConfig`, `DataSource`)

pub mod types;

pub use types::*;
