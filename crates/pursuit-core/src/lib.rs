//! Core types and definitions for the pursuit controller.
//!
//! This crate defines the vocabulary shared across all other crates:
//! positions, telemetry snapshots, enums, constants, angle math and the
//! feed's wire format. It has no dependency on threads or transports.

pub mod angles;
pub mod constants;
pub mod enums;
pub mod error;
pub mod snapshot;
pub mod types;
pub mod wire;
