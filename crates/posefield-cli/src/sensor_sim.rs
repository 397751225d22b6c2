//! Synthetic sensor source.
//!
//! Stands in for the physical IMU fleet: each simulated device publishes a
//! slowly precessing orientation quaternion at its own rate through the real
//! ingestion channel, so the demo exercises the same merge path a live
//! deployment does. One device reports as uncalibrated and one goes silent
//! after a while to show the staleness fade.

use std::time::Duration;

use posefield_runtime::SensorTx;
use posefield_types::SensorUpdate;
use tokio::task::JoinHandle;
use tracing::debug;

/// Behaviour of one simulated device.
#[derive(Debug, Clone)]
pub struct SimDevice {
    pub device_id: String,
    /// Publish period.
    pub period: Duration,
    /// Precession speed (radians per update).
    pub spin_rate: f32,
    /// Rotation axis, normalized at spawn time.
    pub axis: [f32; 3],
    /// Calibration value reported with every update.
    pub calibration: u8,
    /// Stop publishing after this many updates (`None` = forever).
    pub stop_after: Option<u32>,
}

/// The default demo fleet: three spinning devices, one uncalibrated, one
/// that falls silent to demonstrate the staleness fade.
pub fn demo_fleet() -> Vec<SimDevice> {
    vec![
        SimDevice {
            device_id: "imu-alpha".to_string(),
            period: Duration::from_millis(50),
            spin_rate: 0.02,
            axis: [0.0, 0.0, 1.0],
            calibration: 3,
            stop_after: None,
        },
        SimDevice {
            device_id: "imu-beta".to_string(),
            period: Duration::from_millis(80),
            spin_rate: -0.035,
            axis: [1.0, 0.0, 0.0],
            calibration: 0,
            stop_after: None,
        },
        SimDevice {
            device_id: "imu-gamma".to_string(),
            period: Duration::from_millis(120),
            spin_rate: 0.05,
            axis: [0.0, 1.0, 1.0],
            calibration: 2,
            stop_after: Some(100),
        },
    ]
}

/// Spawn one publisher task per device, all feeding the same ingestion
/// channel.
pub fn spawn_fleet(tx: &SensorTx, fleet: Vec<SimDevice>) -> Vec<JoinHandle<()>> {
    fleet
        .into_iter()
        .map(|device| {
            let tx = tx.clone();
            tokio::spawn(async move { run_device(tx, device).await })
        })
        .collect()
}

async fn run_device(tx: SensorTx, device: SimDevice) {
    let norm = (device.axis[0].powi(2) + device.axis[1].powi(2) + device.axis[2].powi(2)).sqrt();
    let axis = if norm > 0.0 {
        [
            device.axis[0] / norm,
            device.axis[1] / norm,
            device.axis[2] / norm,
        ]
    } else {
        [0.0, 0.0, 1.0]
    };

    let mut ticker = tokio::time::interval(device.period);
    let mut angle = 0.0f32;
    let mut published = 0u32;

    loop {
        ticker.tick().await;
        if let Some(limit) = device.stop_after
            && published >= limit
        {
            debug!(device_id = %device.device_id, "simulated device going silent");
            return;
        }

        let update = SensorUpdate {
            quaternion: Some(sensor_quaternion(axis, angle)),
            calibration: Some(device.calibration),
            ..SensorUpdate::new(device.device_id.clone())
        };
        if tx.send(update).await.is_err() {
            // Merge task gone; the process is shutting down.
            return;
        }

        angle += device.spin_rate;
        published += 1;
    }
}

/// Axis-angle rotation in the sensor component order `(q0, q1, q2, q3)`,
/// i.e. `q3` carries w, `q1` carries x, `q0` carries y, `q2` carries z.
fn sensor_quaternion(axis: [f32; 3], angle: f32) -> [f32; 4] {
    let half = angle / 2.0;
    let s = half.sin();
    let (w, x, y, z) = (half.cos(), axis[0] * s, axis[1] * s, axis[2] * s);
    [y, x, z, w]
}
