//! Seaway CLI - scenario files and command line tools for the route engine.
//!
//! Binaries:
//! - seaway-route: optimize a route through a JSON scenario
//! - generate-scenario: write a synthetic scenario

pub mod config;
pub mod logging;
pub mod scenario;
pub mod synth;

pub use config::Config;
pub use scenario::{RequestSpec, Scenario};
pub use synth::{generate, SynthOptions};
