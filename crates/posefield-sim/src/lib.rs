//! `posefield-sim` – the algorithmic core of PoseField.
//!
//! Turns raw per-device sensor state into stable 3-D presentation: a spring
//! relaxation that spreads overlapping devices apart, and the quaternion
//! conversion that orients each device's model.
//!
//! # Modules
//!
//! - [`relax`] – [`RelaxationEngine`][relax::RelaxationEngine]: per-frame
//!   repulsive-spring simulation over the live device set.
//! - [`pose`] – sensor-order quaternion to row-major rotation matrix.

pub mod pose;
pub mod relax;

pub use pose::rotation_matrix;
pub use relax::{RelaxParams, RelaxationEngine};
