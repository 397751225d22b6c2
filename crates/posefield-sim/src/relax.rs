//! Spring relaxation engine.
//!
//! Every rendered frame the engine advances one fixed logical step over the
//! live device set: each pair of devices is connected by an implicit spring
//! with a common rest length, so devices closer than the rest length repel
//! and devices further apart attract. Velocities are damped each step, so
//! the set settles into a stable, non-overlapping arrangement.
//!
//! The engine is deliberately **not** wall-clock aware: one call is one
//! logical step, and the caller's invocation rate (the rendering frame
//! cadence) sets the simulation speed. The only non-determinism is the
//! jitter used to seed fresh device positions.
//!
//! Complexity is O(n²) per step in the number of live devices. Live counts
//! are physical sensor counts, so no spatial partitioning is warranted.

use posefield_types::DeviceState;
use posefield_types::math::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

// ────────────────────────────────────────────────────────────────────────────
// Parameters
// ────────────────────────────────────────────────────────────────────────────

/// Tunable constants of the relaxation simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxParams {
    /// Equilibrium separation between any two devices (world units).
    pub rest_length: f32,
    /// Spring stiffness applied to the displacement from rest length.
    pub spring_constant: f32,
    /// Per-step scale applied to both position and velocity.
    pub damping: f32,
    /// Scale of the symmetric random jitter seeding fresh positions.
    /// Must be nonzero so freshly placed devices never coincide exactly.
    pub jitter_scale: f32,
}

impl Default for RelaxParams {
    fn default() -> Self {
        Self {
            rest_length: 500.0,
            spring_constant: 0.001,
            damping: 0.99,
            jitter_scale: 1e-4,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RelaxationEngine
// ────────────────────────────────────────────────────────────────────────────

/// Per-frame repulsive-spring simulation over the live device set.
///
/// [`RelaxationEngine::step`] mutates `position` and `velocity` in place on
/// the records it is given; no other component touches those fields.
#[derive(Debug)]
pub struct RelaxationEngine {
    params: RelaxParams,
    rng: StdRng,
}

impl RelaxationEngine {
    /// Create an engine with an entropy-seeded jitter source.
    pub fn new(params: RelaxParams) -> Self {
        Self {
            params,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an engine with a fixed jitter seed, for deterministic tests.
    pub fn with_seed(params: RelaxParams, seed: u64) -> Self {
        Self {
            params,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn params(&self) -> &RelaxParams {
        &self.params
    }

    /// Advance the simulation by one logical step.
    ///
    /// 1. Devices without a position are placed at a small jittered offset
    ///    from the origin with zero velocity (exactly once per device).
    /// 2. Spring forces are accumulated over the full ordered cross product
    ///    of the live set, skipping self-pairs; each unordered pair thus
    ///    contributes twice, with equal and opposite velocity deltas.
    /// 3. Positions integrate the pre-damping velocity, then both position
    ///    and velocity are scaled by the damping factor.
    ///
    /// A coincident pair (zero separation) has no defined spring direction;
    /// its contribution is skipped rather than emitting NaN. The jitter in
    /// step 1 makes this case unreachable in normal operation.
    pub fn step(&mut self, live: &mut [&mut DeviceState]) {
        for state in live.iter_mut() {
            if state.position.is_none() {
                state.position = Some(self.jitter());
                state.velocity = Some(Vec3::zero());
                debug!(device_id = %state.device_id, "seeded initial position");
            }
        }

        let positions: Vec<Vec3> = live
            .iter()
            .map(|state| state.position.unwrap_or_else(Vec3::zero))
            .collect();
        let mut force: Vec<Vec3> = vec![Vec3::zero(); live.len()];

        for i in 0..positions.len() {
            for j in 0..positions.len() {
                if i == j {
                    continue;
                }
                let delta = positions[j].sub(positions[i]);
                let dist = delta.norm();
                if dist == 0.0 {
                    continue;
                }
                let magnitude = (dist - self.params.rest_length) * self.params.spring_constant;
                let spring = delta.scale(magnitude / dist);
                force[i] = force[i].add(spring);
                force[j] = force[j].sub(spring);
            }
        }

        for (state, accumulated) in live.iter_mut().zip(force) {
            let velocity = state.velocity.unwrap_or_else(Vec3::zero).add(accumulated);
            let position = state.position.unwrap_or_else(Vec3::zero);
            state.position = Some(position.add(velocity).scale(self.params.damping));
            state.velocity = Some(velocity.scale(self.params.damping));
        }
    }

    fn jitter(&mut self) -> Vec3 {
        let scale = self.params.jitter_scale;
        let component = |rng: &mut StdRng| (rng.r#gen::<f32>() - 0.5) * scale;
        Vec3::new(
            component(&mut self.rng),
            component(&mut self.rng),
            component(&mut self.rng),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> RelaxationEngine {
        RelaxationEngine::with_seed(RelaxParams::default(), 42)
    }

    fn placed(id: &str, position: Vec3, velocity: Vec3) -> DeviceState {
        DeviceState {
            position: Some(position),
            velocity: Some(velocity),
            ..DeviceState::new(id)
        }
    }

    #[test]
    fn isolated_device_only_damps() {
        let mut state = placed("imu-1", Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.1, 0.0, -0.2));
        engine().step(&mut [&mut state]);

        // position' = (position + velocity) * damping, with pre-damping velocity.
        let position = state.position.unwrap();
        assert!((position.x - 1.1 * 0.99).abs() < 1e-5);
        assert!((position.y - 2.0 * 0.99).abs() < 1e-5);
        assert!((position.z - 2.8 * 0.99).abs() < 1e-5);

        // velocity' = velocity * damping.
        let velocity = state.velocity.unwrap();
        assert!((velocity.x - 0.1 * 0.99).abs() < 1e-6);
        assert!((velocity.y).abs() < 1e-6);
        assert!((velocity.z - (-0.2 * 0.99)).abs() < 1e-6);
    }

    #[test]
    fn pairwise_forces_conserve_momentum() {
        let mut a = placed("a", Vec3::new(0.0, 0.0, 0.0), Vec3::zero());
        let mut b = placed("b", Vec3::new(100.0, 40.0, -20.0), Vec3::zero());
        engine().step(&mut [&mut a, &mut b]);

        let sum = a.velocity.unwrap().add(b.velocity.unwrap());
        assert!(sum.x.abs() < 1e-6, "x momentum: {}", sum.x);
        assert!(sum.y.abs() < 1e-6, "y momentum: {}", sum.y);
        assert!(sum.z.abs() < 1e-6, "z momentum: {}", sum.z);
    }

    #[test]
    fn close_pair_repels() {
        // 10 apart, well under the 500 rest length: they must push apart.
        let mut a = placed("a", Vec3::zero(), Vec3::zero());
        let mut b = placed("b", Vec3::new(10.0, 0.0, 0.0), Vec3::zero());
        engine().step(&mut [&mut a, &mut b]);

        assert!(a.velocity.unwrap().x < 0.0);
        assert!(b.velocity.unwrap().x > 0.0);
    }

    #[test]
    fn distant_pair_attracts() {
        // 1000 apart, beyond rest length: spring pulls them together.
        let mut a = placed("a", Vec3::zero(), Vec3::zero());
        let mut b = placed("b", Vec3::new(1000.0, 0.0, 0.0), Vec3::zero());
        engine().step(&mut [&mut a, &mut b]);

        assert!(a.velocity.unwrap().x > 0.0);
        assert!(b.velocity.unwrap().x < 0.0);
    }

    #[test]
    fn ordered_cross_product_applies_each_pair_twice() {
        // A at 0, B at 100 on x. Per ordered pair: |f| = (100-500)*0.001 = -0.4
        // toward +x for A. Both orderings touch both endpoints, so A's
        // pre-damping velocity is -0.8, then position and velocity damp.
        let mut a = placed("a", Vec3::zero(), Vec3::zero());
        let mut b = placed("b", Vec3::new(100.0, 0.0, 0.0), Vec3::zero());
        engine().step(&mut [&mut a, &mut b]);

        assert!((a.velocity.unwrap().x - (-0.8 * 0.99)).abs() < 1e-5);
        assert!((a.position.unwrap().x - (-0.8 * 0.99)).abs() < 1e-5);
        assert!((b.velocity.unwrap().x - 0.8 * 0.99).abs() < 1e-5);
    }

    #[test]
    fn lazy_init_seeds_distinct_nonzero_positions() {
        let mut a = DeviceState::new("a");
        let mut b = DeviceState::new("b");
        engine().step(&mut [&mut a, &mut b]);

        let pa = a.position.unwrap();
        let pb = b.position.unwrap();
        assert_ne!(pa, pb, "jitter must separate coincident devices");
        assert!(pa.norm() > 0.0);
        assert!(pb.norm() > 0.0);
        // Jitter is tiny: after one step the devices are still near origin.
        assert!(pa.norm() < 1.0);
    }

    #[test]
    fn lazy_init_happens_once() {
        let mut engine = engine();
        let mut state = DeviceState::new("a");
        engine.step(&mut [&mut state]);
        let seeded = state.position.unwrap();

        engine.step(&mut [&mut state]);
        // Second step integrates from the seeded position instead of
        // re-seeding: with ~zero velocity it stays within damping of it.
        let after = state.position.unwrap();
        assert!(after.sub(seeded).norm() < seeded.norm());
    }

    #[test]
    fn coincident_pair_produces_no_nan() {
        let mut a = placed("a", Vec3::new(5.0, 5.0, 5.0), Vec3::zero());
        let mut b = placed("b", Vec3::new(5.0, 5.0, 5.0), Vec3::zero());
        engine().step(&mut [&mut a, &mut b]);

        for state in [&a, &b] {
            let position = state.position.unwrap();
            let velocity = state.velocity.unwrap();
            assert!(position.x.is_finite() && position.y.is_finite() && position.z.is_finite());
            assert!(velocity.norm() < 1e-6, "skipped pair must add no force");
        }
    }

    #[test]
    fn three_devices_settle_toward_rest_length() {
        let params = RelaxParams::default();
        let mut engine = RelaxationEngine::with_seed(params, 7);
        let mut a = DeviceState::new("a");
        let mut b = DeviceState::new("b");
        let mut c = DeviceState::new("c");

        for _ in 0..2000 {
            engine.step(&mut [&mut a, &mut b, &mut c]);
        }

        // All pair distances should have relaxed to the same order of
        // magnitude as the rest length (exact equilibrium is slightly short
        // of it because every pair is doubly sprung and damped).
        let pa = a.position.unwrap();
        let pb = b.position.unwrap();
        let pc = c.position.unwrap();
        for (p, q) in [(pa, pb), (pb, pc), (pa, pc)] {
            let dist = p.sub(q).norm();
            assert!(dist > 100.0, "pair collapsed: {dist}");
            assert!(dist < 900.0, "pair diverged: {dist}");
        }
    }
}
