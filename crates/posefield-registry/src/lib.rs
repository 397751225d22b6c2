//! `posefield-registry` – latest-known-state store for sensor devices.
//!
//! # Modules
//!
//! - [`registry`] – [`DeviceRegistry`][registry::DeviceRegistry]: merges
//!   partial sensor updates into per-device records and hands the live
//!   subset to the relaxation engine.
//! - [`staleness`] – the liveness predicate that decides which devices are
//!   eligible for physics each frame.

pub mod registry;
pub mod staleness;

pub use registry::DeviceRegistry;
pub use staleness::{DEFAULT_MAX_AGE_MS, is_live};
