//! `posefield-runtime` – glue between sensors, physics, and the renderer.
//!
//! # Modules
//!
//! - [`ingest`] – bounded channel feeding sensor updates into the shared
//!   [`DeviceRegistry`][posefield_registry::DeviceRegistry].
//! - [`frame`] – [`FrameOrchestrator`][frame::FrameOrchestrator]: runs the
//!   staleness filter, the relaxation engine, and the pose resolver once per
//!   rendered frame and emits draw records to a [`RenderSink`][frame::RenderSink].
//! - [`config`] – tunable constants, persisted in `~/.posefield/config.toml`.
//! - [`telemetry`] – `tracing` subscriber initialisation.

pub mod config;
pub mod frame;
pub mod ingest;
pub mod telemetry;

pub use config::FieldConfig;
pub use frame::{FrameOrchestrator, RenderSink};
pub use ingest::{SensorTx, ingest_channel};

use std::sync::{Arc, Mutex, MutexGuard};

use posefield_registry::DeviceRegistry;

/// The registry handle shared between the ingest task and the frame loop.
pub type SharedRegistry = Arc<Mutex<DeviceRegistry>>;

/// Create a fresh shared registry.
pub fn shared_registry() -> SharedRegistry {
    Arc::new(Mutex::new(DeviceRegistry::new()))
}

/// Lock a shared registry, recovering from a poisoned mutex.
///
/// A panic while the lock was held can only leave a partially merged update
/// behind, which the next sensor packet overwrites; continuing is safe for a
/// best-effort visualization.
pub(crate) fn lock_registry(registry: &SharedRegistry) -> MutexGuard<'_, DeviceRegistry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
