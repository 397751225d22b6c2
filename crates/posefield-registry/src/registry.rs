//! [`DeviceRegistry`] – central store of the latest known state per device.
//!
//! The registry owns every [`DeviceState`] record. Incoming
//! [`SensorUpdate`]s are merged field-by-field: an update overwrites only
//! the fields it carries and leaves everything else (notably the physics
//! state) untouched. Records are created on first contact and never
//! removed; a silent device is handled by the staleness filter, not by
//! eviction.
//!
//! The registry performs no validation of update contents. A malformed
//! value merges as-is; this is accepted behavior for a best-effort
//! visualization, not a correctness system.

use std::collections::HashMap;

use posefield_types::{DeviceState, SensorUpdate};
use posefield_types::math::Vec3;
use tracing::debug;

use crate::staleness::is_live;

/// Maps device id → latest known [`DeviceState`].
///
/// Explicitly owned and injectable: the host constructs one instance and
/// shares it between the ingestion task and the frame orchestrator. There
/// is no process-wide singleton.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<String, DeviceState>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a partial update received at `now_ms`.
    ///
    /// Creates the record if this is the first update for the device.
    /// Overwrites only the fields present in `update`; `local_timestamp` is
    /// always set to `now_ms` (receive time, not sensor time). Merging the
    /// same update twice at the same timestamp is idempotent.
    pub fn merge_at(&mut self, update: &SensorUpdate, now_ms: i64) {
        let state = self
            .devices
            .entry(update.device_id.clone())
            .or_insert_with(|| {
                debug!(device_id = %update.device_id, "registering new device");
                DeviceState::new(update.device_id.clone())
            });

        if let Some(q) = update.quaternion {
            state.quaternion = q;
        }
        if let Some(p) = update.position {
            state.position = Some(Vec3::from_array(p));
        }
        if let Some(c) = update.calibration {
            state.calibration = Some(c);
        }
        state.local_timestamp = now_ms;
    }

    /// Latest known state for `device_id`, if the device has ever reported.
    pub fn get(&self, device_id: &str) -> Option<&DeviceState> {
        self.devices.get(device_id)
    }

    /// Number of devices ever seen.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// All device records, in unspecified order.
    pub fn values(&self) -> impl Iterator<Item = &DeviceState> {
        self.devices.values()
    }

    /// Mutable access to all device records, in unspecified order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut DeviceState> {
        self.devices.values_mut()
    }

    /// The live subset at `now_ms` as disjoint mutable borrows, ready for
    /// the relaxation engine to mutate in place.
    pub fn live_mut(&mut self, now_ms: i64, max_age_ms: i64) -> Vec<&mut DeviceState> {
        self.devices
            .values_mut()
            .filter(|state| is_live(state, now_ms, max_age_ms))
            .collect()
    }
}
