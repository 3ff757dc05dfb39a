//! Pure calculations behind a personal-finance dashboard: net worth,
//! affordability score, goal savings plans and peer benchmarks.

pub mod api;
pub mod config;
pub mod core;
pub mod error;
