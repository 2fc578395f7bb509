//! Pursuit pipeline: target selection, aim solving, angle control and
//! synthetic scenarios.
//!
//! Everything here is single-threaded and deterministic. Threads and
//! transports live in `pursuit-feed` and `pursuit-app`.

pub mod aim;
pub mod controller;
pub mod engine;
pub mod presets;
pub mod scenario;
pub mod synthetic;
pub mod targeting;

pub use engine::PursuitEngine;
pub use pursuit_core as core;
