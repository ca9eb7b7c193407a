//! Command-line harness around `handsim-core`: YAML configuration, `.ydk`
//! deck lists, structured logging and report rendering.

pub mod config;
pub mod logging;
pub mod report;
pub mod runner;
pub mod ydk;
