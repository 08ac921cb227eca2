//! Spring physics
//!
//! A damped harmonic oscillator integrated with semi-implicit (symplectic)
//! Euler. Velocity is updated before position on every sub-step:
//!
//! ```text
//! acceleration = (stiffness * (target - position) - damping * velocity) / mass
//! velocity    += acceleration * dt
//! position    += velocity * dt
//! ```
//!
//! Each `step(dt)` is split into equal sub-steps no longer than the stable
//! step for the configuration, so heavily damped or very stiff springs do
//! not blow up at low frame rates.

use crate::error::{require_positive, Result};
use serde::{Deserialize, Serialize};

/// Upper bound for one integration sub-step (seconds)
const MAX_SUBSTEP: f32 = 1.0 / 120.0;

/// Upper bound for the number of sub-steps per `step` call
const MAX_SUBSTEPS: u32 = 240;

/// Spring parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    #[serde(default = "default_mass")]
    pub mass: f32,
}

fn default_mass() -> f32 {
    1.0
}

impl SpringConfig {
    /// Create a validated spring configuration
    ///
    /// Every parameter must be positive and finite.
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Result<Self> {
        Self {
            stiffness,
            damping,
            mass,
        }
        .validate()
    }

    /// Re-check a configuration built without [`SpringConfig::new`]
    /// (presets, deserialized files)
    pub fn validate(self) -> Result<Self> {
        require_positive("stiffness", self.stiffness)?;
        require_positive("damping", self.damping)?;
        require_positive("mass", self.mass)?;
        Ok(self)
    }

    /// Responsive tilt that follows the pointer closely
    pub const fn tilt() -> Self {
        Self {
            stiffness: 350.0,
            damping: 35.0,
            mass: 1.0,
        }
    }

    /// Hover scale response
    pub const fn hover() -> Self {
        Self {
            stiffness: 400.0,
            damping: 35.0,
            mass: 1.0,
        }
    }

    /// Very slow, heavily damped drift for background motion
    pub const fn drift() -> Self {
        Self {
            stiffness: 10.0,
            damping: 100.0,
            mass: 1.0,
        }
    }

    /// Stiff spring with little overshoot
    pub const fn stiff() -> Self {
        Self {
            stiffness: 400.0,
            damping: 30.0,
            mass: 1.0,
        }
    }

    /// Quick spring with a visible bounce
    pub const fn snappy() -> Self {
        Self {
            stiffness: 300.0,
            damping: 20.0,
            mass: 1.0,
        }
    }

    /// Soft, slower spring
    pub const fn gentle() -> Self {
        Self {
            stiffness: 120.0,
            damping: 14.0,
            mass: 1.0,
        }
    }

    /// Bouncy spring
    pub const fn wobbly() -> Self {
        Self {
            stiffness: 180.0,
            damping: 12.0,
            mass: 1.0,
        }
    }

    /// Damping ratio ζ = c / (2√(km))
    ///
    /// `< 1` underdamped, `== 1` critically damped, `> 1` overdamped.
    pub fn damping_ratio(&self) -> f32 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    /// Longest sub-step that keeps the integrator stable
    fn max_substep(&self) -> f32 {
        let by_damping = self.mass / self.damping;
        let by_stiffness = (self.mass / self.stiffness).sqrt();
        (0.5 * by_damping.min(by_stiffness)).min(MAX_SUBSTEP)
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::stiff()
    }
}

/// Thresholds below which a spring counts as resting
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestThreshold {
    /// Maximum distance from the target
    pub delta: f32,
    /// Maximum speed
    pub speed: f32,
    /// Consecutive frames both conditions must hold
    pub frames: u32,
}

impl Default for RestThreshold {
    fn default() -> Self {
        Self {
            delta: 0.001,
            speed: 0.01,
            frames: 3,
        }
    }
}

impl RestThreshold {
    /// Whether a position/velocity pair is within the thresholds
    ///
    /// Both thresholds scale with the target magnitude once it exceeds 1.
    pub fn is_within(&self, position: f32, velocity: f32, target: f32) -> bool {
        let scale = target.abs().max(1.0);
        (target - position).abs() < self.delta * scale && velocity.abs() < self.speed * scale
    }
}

/// A spring integrator
#[derive(Clone, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
}

impl Spring {
    /// Create a spring resting at `initial`
    pub fn new(config: SpringConfig, initial: f32) -> Self {
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Retarget the spring. Velocity is kept, so interruptions stay smooth.
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Teleport to `value` and stop
    pub fn snap_to(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    /// Overwrite position and velocity
    pub(crate) fn restore(&mut self, value: f32, velocity: f32) {
        self.value = value;
        self.velocity = velocity;
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }

        let max_substep = self.config.max_substep();
        let substeps = ((dt / max_substep).ceil() as u32).clamp(1, MAX_SUBSTEPS);
        let h = dt / substeps as f32;

        let SpringConfig {
            stiffness,
            damping,
            mass,
        } = self.config;

        for _ in 0..substeps {
            let acceleration =
                (stiffness * (self.target - self.value) - damping * self.velocity) / mass;
            self.velocity += acceleration * h;
            self.value += self.velocity * h;
        }
    }

    /// Whether the spring is within the default rest thresholds
    pub fn is_settled(&self) -> bool {
        RestThreshold::default().is_within(self.value, self.velocity, self.target)
    }
}
