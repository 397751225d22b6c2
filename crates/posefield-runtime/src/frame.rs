//! Frame orchestrator.
//!
//! Ties the pipeline together once per rendered frame: select the live
//! subset, advance the relaxation engine over it, then emit one
//! [`DrawRecord`] per known device (live or not) with its rotation matrix,
//! staleness fade, and calibration flag. The orchestrator runs at the host
//! renderer's cadence and has no independent timer or deadline; a slow
//! frame simply delays the next.

use std::time::Duration;

use chrono::Utc;
use posefield_sim::relax::{RelaxParams, RelaxationEngine};
use posefield_sim::rotation_matrix;
use posefield_types::DrawRecord;
use tracing::trace;

use crate::config::FieldConfig;
use crate::{SharedRegistry, lock_registry};

/// Render output boundary. Submission is fire-and-forget; the orchestrator
/// neither retries nor inspects the sink's fate.
pub trait RenderSink {
    /// Consume one frame's worth of draw records, in unspecified order.
    fn submit(&mut self, frame: &[DrawRecord]);
}

/// Staleness-based fade: fully opaque through the grace period, then a
/// linear decay of one alpha step per 10 ms, clamped to `floor` so a silent
/// device stays faintly visible instead of vanishing.
pub fn fade_alpha(now_ms: i64, local_timestamp: i64, grace_ms: i64, floor: u8) -> u8 {
    let age = (now_ms - local_timestamp - grace_ms).max(0);
    let alpha = 255.0 - age as f32 / 10.0;
    alpha.clamp(floor as f32, 255.0) as u8
}

/// Per-frame driver of the staleness filter, relaxation engine, and pose
/// resolver.
pub struct FrameOrchestrator {
    registry: SharedRegistry,
    engine: RelaxationEngine,
    config: FieldConfig,
}

impl FrameOrchestrator {
    /// Build an orchestrator over the shared registry, deriving the engine
    /// parameters from `config`.
    pub fn new(registry: SharedRegistry, config: FieldConfig) -> Self {
        let engine = RelaxationEngine::new(Self::relax_params(&config));
        Self {
            registry,
            engine,
            config,
        }
    }

    /// Like [`FrameOrchestrator::new`] but with a fixed jitter seed, for
    /// deterministic tests.
    pub fn with_seed(registry: SharedRegistry, config: FieldConfig, seed: u64) -> Self {
        let engine = RelaxationEngine::with_seed(Self::relax_params(&config), seed);
        Self {
            registry,
            engine,
            config,
        }
    }

    fn relax_params(config: &FieldConfig) -> RelaxParams {
        RelaxParams {
            rest_length: config.rest_length,
            spring_constant: config.spring_constant,
            damping: config.damping,
            jitter_scale: config.jitter_scale,
        }
    }

    /// Process one frame at `now_ms` and return the draw records.
    ///
    /// Holds the registry lock for the duration of the frame, so sensor
    /// merges interleave between frames, never inside one.
    pub fn render_frame(&mut self, now_ms: i64) -> Vec<DrawRecord> {
        let mut registry = lock_registry(&self.registry);

        let total = registry.len();
        {
            let mut live = registry.live_mut(now_ms, self.config.max_age_ms);
            trace!(live = live.len(), total, "frame start");
            self.engine.step(&mut live);
        }

        registry
            .values()
            .map(|state| DrawRecord {
                device_id: state.device_id.clone(),
                position: state.position.map(|p| p.to_array()),
                transform: rotation_matrix(state.quaternion),
                fade_alpha: fade_alpha(
                    now_ms,
                    state.local_timestamp,
                    self.config.fade_grace_ms,
                    self.config.fade_floor,
                ),
                uncalibrated: state.is_uncalibrated(),
            })
            .collect()
    }

    /// Drive frames at the configured cadence until the future is dropped.
    ///
    /// Each tick renders one frame with the current wall-clock time and
    /// submits it to `sink`.
    pub async fn run(&mut self, sink: &mut dyn RenderSink) {
        let period = Duration::from_secs_f64(1.0 / self.config.frame_rate_hz.max(1) as f64);
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let frame = self.render_frame(Utc::now().timestamp_millis());
            sink.submit(&frame);
        }
    }
}
