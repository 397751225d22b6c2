//! Staleness filter – decides which devices are eligible for physics.
//!
//! A device is *live* when its most recent update is younger than the
//! staleness window. Devices that go silent (sensor disconnected, radio
//! drop-out) simply stop being selected: they freeze in place instead of
//! drifting or exploding under stale extrapolation. The registry never
//! forgets a device; staleness is a physics and rendering concept only.

use posefield_types::DeviceState;

/// Default staleness window (milliseconds).
pub const DEFAULT_MAX_AGE_MS: i64 = 500;

/// Whether `state` is within the staleness window at `now_ms`.
///
/// The comparison is strict: a device whose age equals `max_age_ms` exactly
/// is already stale.
pub fn is_live(state: &DeviceState, now_ms: i64, max_age_ms: i64) -> bool {
    now_ms - state.local_timestamp < max_age_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_at(ts: i64) -> DeviceState {
        DeviceState {
            local_timestamp: ts,
            ..DeviceState::new("imu-0")
        }
    }

    #[test]
    fn recent_device_is_live() {
        // age 400 < 500
        assert!(is_live(&state_at(600), 1000, 500));
    }

    #[test]
    fn old_device_is_stale() {
        // age 600 >= 500
        assert!(!is_live(&state_at(400), 1000, 500));
    }

    #[test]
    fn boundary_age_is_stale() {
        // age exactly 500: strict `<` excludes it.
        assert!(!is_live(&state_at(500), 1000, 500));
    }

    #[test]
    fn never_updated_device_is_stale() {
        // local_timestamp defaults to 0, far outside any sane window.
        assert!(!is_live(&DeviceState::new("imu-0"), 1000, 500));
    }
}
