//! Pose resolver – sensor-order quaternion to rotation matrix.
//!
//! Sensors deliver orientation as four components `(q0, q1, q2, q3)` whose
//! ordering does not match the standard `(w, x, y, z)` quaternion layout.
//! The fixed remap applied here is
//!
//! ```text
//! w = q3,  x = q1,  y = q0,  z = q2
//! ```
//!
//! This permutation encodes the sensor-to-world axis convention of the
//! hardware and must be preserved exactly; it is not an arbitrary choice to
//! be "corrected".

use posefield_types::math::Mat4;

/// Convert a sensor-order quaternion into a row-major 4x4 rotation matrix.
///
/// Applies the fixed component remap above, then the standard
/// normalized-quaternion-to-rotation formula. A unit-norm quaternion is
/// assumed but not enforced; sensor drift in the norm scales the rotation
/// block accordingly. Pure function, no error conditions.
pub fn rotation_matrix(q: [f32; 4]) -> Mat4 {
    let [q0, q1, q2, q3] = q;
    let (w, x, y, z) = (q3, q1, q0, q2);

    let x2 = x * x;
    let y2 = y * y;
    let z2 = z * z;
    let wx = w * x;
    let wy = w * y;
    let wz = w * z;
    let xy = x * y;
    let xz = x * z;
    let yz = y * z;

    Mat4([
        1.0 - 2.0 * (y2 + z2), 2.0 * (xy - wz),       2.0 * (xz + wy),       0.0,
        2.0 * (xy + wz),       1.0 - 2.0 * (x2 + z2), 2.0 * (yz - wx),       0.0,
        2.0 * (xz - wy),       2.0 * (yz + wx),       1.0 - 2.0 * (x2 + y2), 0.0,
        0.0,                   0.0,                   0.0,                   1.0,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_1_SQRT_2;

    fn assert_mat_eq(actual: &Mat4, expected: &[f32; 16]) {
        for (i, (a, e)) in actual.0.iter().zip(expected).enumerate() {
            assert!((a - e).abs() < 1e-5, "element {i}: got {a}, expected {e}");
        }
    }

    #[test]
    fn sensor_identity_yields_identity_matrix() {
        // Sensor order (0, 0, 0, 1): the w slot is q3.
        let m = rotation_matrix([0.0, 0.0, 0.0, 1.0]);
        assert_mat_eq(&m, &Mat4::identity().0);
    }

    #[test]
    fn quarter_turn_about_remapped_x() {
        // Standard (w, x, y, z) = (√½, √½, 0, 0), i.e. 90° about X, written
        // in sensor order: q1 carries x, q3 carries w.
        let m = rotation_matrix([0.0, FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2]);
        #[rustfmt::skip]
        let expected = [
            1.0, 0.0,  0.0, 0.0,
            0.0, 0.0, -1.0, 0.0,
            0.0, 1.0,  0.0, 0.0,
            0.0, 0.0,  0.0, 1.0,
        ];
        assert_mat_eq(&m, &expected);
    }

    #[test]
    fn component_permutation_is_pinned() {
        // A pure q0 quaternion must land in the y slot: (w,x,y,z) = (0,0,1,0)
        // is a half turn about Y, whose matrix is diag(-1, 1, -1, 1). If q0
        // were routed to x instead, the diagonal would read (1, -1, -1, 1).
        let m = rotation_matrix([1.0, 0.0, 0.0, 0.0]);
        assert!((m.at(0, 0) - (-1.0)).abs() < 1e-5);
        assert!((m.at(1, 1) - 1.0).abs() < 1e-5);
        assert!((m.at(2, 2) - (-1.0)).abs() < 1e-5);
        assert!((m.at(3, 3) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rotation_block_has_zero_translation() {
        let m = rotation_matrix([0.3, 0.1, 0.2, 0.9]);
        for row in 0..3 {
            assert_eq!(m.at(row, 3), 0.0);
        }
        assert_eq!(m.at(3, 0), 0.0);
        assert_eq!(m.at(3, 1), 0.0);
        assert_eq!(m.at(3, 2), 0.0);
        assert_eq!(m.at(3, 3), 1.0);
    }
}
