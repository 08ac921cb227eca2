//! Animated background gradient
//!
//! A mesh gradient drifts slowly by moving its background position around a
//! circle. A phase accumulator advances the raw phase at `0.6 * speed`
//! radians per second and a heavily damped spring smooths it, so the drift
//! keeps a constant, gentle pace. Radial and conic variants are static.

use glint_animation::{
    FrameScheduler, MotionError, PhaseAccumulator, Result, SpringConfig, SpringFilter,
};
use glint_core::{DerivedValue, HostEvent, MotionValue, Point2};
use serde::{Deserialize, Serialize};

use crate::Component;

/// Phase advance at speed 1, in radians per second
pub const BASE_PHASE_RATE: f32 = 0.6;

const MESH_BACKGROUND: &str = "\
radial-gradient(at 40% 20%, oklch(0.12 0.03 265) 0px, transparent 50%), \
radial-gradient(at 80% 0%, oklch(0.1 0.025 285) 0px, transparent 50%), \
radial-gradient(at 0% 50%, oklch(0.11 0.02 75) 0px, transparent 50%), \
radial-gradient(at 80% 50%, oklch(0.09 0.025 265) 0px, transparent 50%), \
radial-gradient(at 0% 100%, oklch(0.1 0.03 265) 0px, transparent 50%), \
radial-gradient(at 80% 100%, oklch(0.08 0.02 285) 0px, transparent 50%), \
oklch(0.06 0.015 265)";

const RADIAL_BACKGROUND: &str =
    "radial-gradient(ellipse at center, oklch(0.1 0.025 265) 0%, oklch(0.06 0.015 265) 70%)";

const CONIC_BACKGROUND: &str = "\
conic-gradient(from 0deg at 50% 50%, oklch(0.08 0.02 265), oklch(0.1 0.03 275), \
oklch(0.08 0.025 285), oklch(0.07 0.02 75), oklch(0.08 0.02 265))";

/// Gradient flavour
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientVariant {
    #[default]
    Mesh,
    Radial,
    Conic,
}

impl GradientVariant {
    pub fn background(&self) -> &'static str {
        match self {
            GradientVariant::Mesh => MESH_BACKGROUND,
            GradientVariant::Radial => RADIAL_BACKGROUND,
            GradientVariant::Conic => CONIC_BACKGROUND,
        }
    }

    /// Only the mesh drifts
    pub fn is_animated(&self) -> bool {
        matches!(self, GradientVariant::Mesh)
    }

    pub fn background_size(&self) -> &'static str {
        if self.is_animated() {
            "200% 200%"
        } else {
            "100% 100%"
        }
    }
}

/// Gradient options
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientOptions {
    pub variant: GradientVariant,
    /// Multiplier on the drift rate
    pub speed: f32,
    pub drift_spring: SpringConfig,
}

impl Default for GradientOptions {
    fn default() -> Self {
        Self {
            variant: GradientVariant::Mesh,
            speed: 1.0,
            drift_spring: SpringConfig::drift(),
        }
    }
}

impl GradientOptions {
    pub fn validate(self) -> Result<Self> {
        if !self.speed.is_finite() {
            return Err(MotionError::Configuration {
                parameter: "speed",
                value: self.speed,
            });
        }
        self.drift_spring.validate()?;
        Ok(self)
    }
}

/// Gradient background, ready for the renderer
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GradientStyle {
    pub background: String,
    pub background_size: String,
    /// Only set for animated variants
    pub background_position: Option<String>,
}

/// Background position on the drift circle for phase `t`
pub fn drift_position(t: f32) -> Point2 {
    Point2::new(t.sin() * 50.0 + 50.0, t.cos() * 50.0 + 50.0)
}

struct DriftRig {
    // Dropped before the spring
    phase: PhaseAccumulator,
    drift: SpringFilter,
    position: DerivedValue<Point2>,
}

/// A slowly drifting gradient background
pub struct AnimatedGradient {
    options: GradientOptions,
    /// Raw phase in radians
    time: MotionValue,
    rig: Option<DriftRig>,
    mounted: bool,
}

impl AnimatedGradient {
    pub fn new(options: GradientOptions) -> Result<Self> {
        Ok(Self::with_valid_options(options.validate()?))
    }

    fn with_valid_options(options: GradientOptions) -> Self {
        Self {
            options,
            time: MotionValue::new(0.0),
            rig: None,
            mounted: false,
        }
    }

    pub fn options(&self) -> &GradientOptions {
        &self.options
    }

    pub fn variant(&self) -> GradientVariant {
        self.options.variant
    }

    /// Raw, unsmoothed phase
    pub fn phase(&self) -> f32 {
        self.time.get()
    }

    /// Smoothed phase, or the raw phase while unmounted
    pub fn smoothed_phase(&self) -> f32 {
        self.rig
            .as_ref()
            .map(|rig| rig.drift.position())
            .unwrap_or_else(|| self.time.get())
    }

    /// Change the drift speed multiplier; ignored unless finite
    pub fn set_speed(&mut self, speed: f32) {
        if !speed.is_finite() {
            return;
        }
        self.options.speed = speed;
        if let Some(rig) = &self.rig {
            rig.phase.set_rate(BASE_PHASE_RATE * speed);
        }
    }

    pub fn background_position(&self) -> Option<Point2> {
        self.rig.as_ref().map(|rig| rig.position.get())
    }

    pub fn style(&self) -> GradientStyle {
        let variant = self.options.variant;
        let position = if variant.is_animated() {
            let point = self
                .background_position()
                .unwrap_or_else(|| drift_position(self.time.get()));
            Some(point.to_percent_pair())
        } else {
            None
        };

        GradientStyle {
            background: variant.background().to_string(),
            background_size: variant.background_size().to_string(),
            background_position: position,
        }
    }
}

impl Default for AnimatedGradient {
    fn default() -> Self {
        Self::with_valid_options(GradientOptions::default())
    }
}

impl Component for AnimatedGradient {
    fn mount(&mut self, scheduler: &FrameScheduler) -> Result<()> {
        if self.mounted {
            return Ok(());
        }

        if self.options.variant.is_animated() {
            let drift = SpringFilter::new(scheduler, &self.time, self.options.drift_spring)?;
            let phase =
                PhaseAccumulator::new(scheduler, &self.time, BASE_PHASE_RATE * self.options.speed)?;
            let position = DerivedValue::combine(std::slice::from_ref(drift.output()), |v| {
                drift_position(v[0])
            });
            self.rig = Some(DriftRig {
                phase,
                drift,
                position,
            });
        }

        self.mounted = true;
        tracing::debug!(
            variant = ?self.options.variant,
            speed = self.options.speed,
            "gradient mounted"
        );
        Ok(())
    }

    fn unmount(&mut self) {
        self.rig = None;
        if self.mounted {
            self.mounted = false;
            tracing::debug!("gradient unmounted");
        }
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn handle_event(&mut self, _event: &HostEvent) {}
}
