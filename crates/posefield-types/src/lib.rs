//! `posefield-types` – shared data model for the PoseField pipeline.
//!
//! Everything that crosses a crate boundary lives here: the partial sensor
//! records arriving at the ingestion boundary, the per-device state owned by
//! the registry, the per-frame draw records handed to the renderer, and the
//! workspace-wide error type.
//!
//! # Modules
//!
//! - [`math`] – [`Vec3`][math::Vec3] and [`Mat4`][math::Mat4] primitives used
//!   by the relaxation engine and the pose resolver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod math;

use math::{Mat4, Vec3};

/// Sensor-order quaternion `(q0, q1, q2, q3)` that maps to the identity
/// rotation under the sensor-to-world component remap (`w = q3`).
pub const IDENTITY_SENSOR_QUAT: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// A partial update delivered by the sensor boundary.
///
/// Only `device_id` is guaranteed; every other field is optional and merged
/// field-by-field into the device's registry record. Fields the update does
/// not carry are left untouched, so a quaternion-only packet never disturbs
/// the physics state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorUpdate {
    /// Opaque identifier, stable per physical sensor.
    pub device_id: String,
    /// Orientation in sensor component order `(q0, q1, q2, q3)`. Not
    /// guaranteed normalized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quaternion: Option<[f32; 4]>,
    /// World-space position override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
    /// Calibration flag straight from the sensor; `0` means uncalibrated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration: Option<u8>,
}

impl SensorUpdate {
    /// A bare update carrying only the device id.
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            quaternion: None,
            position: None,
            calibration: None,
        }
    }
}

/// Ingestion envelope stamped when an update enters the system.
///
/// `received_at` is the local receive time; its wall-clock millisecond value
/// becomes the device's `local_timestamp` at merge time. Sensors carry no
/// usable clock of their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorEvent {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    pub update: SensorUpdate,
}

impl SensorEvent {
    /// Wrap `update` with a fresh id and the current receive time.
    pub fn now(update: SensorUpdate) -> Self {
        Self {
            id: Uuid::new_v4(),
            received_at: Utc::now(),
            update,
        }
    }
}

/// Latest known state for a single device, owned exclusively by the
/// registry.
///
/// `position` and `velocity` stay `None` until the device is first selected
/// as live; the relaxation engine then initialises them exactly once and is
/// the only component that mutates them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    pub device_id: String,
    /// Orientation in sensor component order; defaults to
    /// [`IDENTITY_SENSOR_QUAT`] until the first orientation update.
    pub quaternion: [f32; 4],
    /// Receive time of the most recent update, milliseconds.
    pub local_timestamp: i64,
    /// Last reported calibration flag; `Some(0)` means uncalibrated.
    pub calibration: Option<u8>,
    pub position: Option<Vec3>,
    pub velocity: Option<Vec3>,
}

impl DeviceState {
    /// A fresh record for `device_id` with no sensor data yet.
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            quaternion: IDENTITY_SENSOR_QUAT,
            local_timestamp: 0,
            calibration: None,
            position: None,
            velocity: None,
        }
    }

    /// Whether the sensor has ever reported a calibration value of `0`.
    pub fn is_uncalibrated(&self) -> bool {
        self.calibration == Some(0)
    }
}

/// Per-device output of one rendered frame.
///
/// `position` is `None` until the device's first physics placement; the
/// renderer draws such a device at the origin. `transform` is the row-major
/// rotation matrix produced by the pose resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub device_id: String,
    pub position: Option<[f32; 3]>,
    pub transform: Mat4,
    /// Staleness-derived opacity, `5..=255`.
    pub fade_alpha: u8,
    pub uncalibrated: bool,
}

/// Workspace-wide error type spanning ingestion and configuration failures.
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum FieldError {
    #[error("ingest channel error: {0}")]
    Channel(String),

    #[error("config error at {path}: {details}")]
    Config { path: String, details: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_update_roundtrip() {
        let update = SensorUpdate {
            device_id: "imu-7".to_string(),
            quaternion: Some([0.1, 0.2, 0.3, 0.9]),
            position: None,
            calibration: Some(3),
        };
        let json = serde_json::to_string(&update).unwrap();
        let back: SensorUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(update, back);
    }

    #[test]
    fn sensor_update_absent_fields_stay_absent() {
        // A quaternion-only packet must not serialize position/calibration.
        let update = SensorUpdate {
            quaternion: Some([0.0, 0.0, 0.0, 1.0]),
            ..SensorUpdate::new("imu-1")
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(!json.contains("position"));
        assert!(!json.contains("calibration"));

        let back: SensorUpdate = serde_json::from_str(&json).unwrap();
        assert!(back.position.is_none());
        assert!(back.calibration.is_none());
    }

    #[test]
    fn sensor_update_parses_partial_wire_record() {
        // The boundary may deliver any subset beyond device_id.
        let back: SensorUpdate =
            serde_json::from_str(r#"{"device_id":"imu-2","calibration":0}"#).unwrap();
        assert_eq!(back.device_id, "imu-2");
        assert_eq!(back.calibration, Some(0));
        assert!(back.quaternion.is_none());
    }

    #[test]
    fn sensor_event_roundtrip() {
        let event = SensorEvent::now(SensorUpdate::new("imu-3"));
        let json = serde_json::to_string(&event).unwrap();
        let back: SensorEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event.id, back.id);
        assert_eq!(event.update.device_id, back.update.device_id);
    }

    #[test]
    fn fresh_device_state_has_identity_orientation() {
        let state = DeviceState::new("imu-4");
        assert_eq!(state.quaternion, IDENTITY_SENSOR_QUAT);
        assert!(state.position.is_none());
        assert!(state.velocity.is_none());
    }

    #[test]
    fn uncalibrated_only_when_zero_reported() {
        let mut state = DeviceState::new("imu-5");
        assert!(!state.is_uncalibrated());
        state.calibration = Some(3);
        assert!(!state.is_uncalibrated());
        state.calibration = Some(0);
        assert!(state.is_uncalibrated());
    }

    #[test]
    fn field_error_display() {
        let err = FieldError::Channel("receiver dropped".to_string());
        assert!(err.to_string().contains("ingest channel"));

        let err2 = FieldError::Config {
            path: "/tmp/config.toml".to_string(),
            details: "missing value".to_string(),
        };
        assert!(err2.to_string().contains("/tmp/config.toml"));
    }
}
