//! Shared utilities
//!
//! Logging helpers, progress bars, console output and test fixtures.

pub mod logging;
pub mod test;
