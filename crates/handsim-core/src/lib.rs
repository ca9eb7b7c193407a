#![deny(warnings)]
pub mod analysis;
pub mod engine;
pub mod error;
pub mod model;
pub mod odds;
pub mod sample;

pub use engine::ProbabilityEngine;
pub use error::{OddsError, OddsResult};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "handsim"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
