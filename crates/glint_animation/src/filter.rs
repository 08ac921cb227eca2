//! Spring filters
//!
//! A [`SpringFilter`] follows a target [`MotionValue`] with spring physics
//! and mirrors the integrated position into its own output value.
//!
//! The filter registers with the [`FrameScheduler`] when created, leaves it
//! when the spring comes to rest, and re-registers synchronously the moment
//! its target changes, so a resting filter costs no frames and a new target
//! is never missed. Dropping (or [`SpringFilter::destroy`]ing) the filter
//! removes both the scheduler registration and the target subscription.
//!
//! # Example
//!
//! ```rust
//! use glint_animation::{FrameScheduler, SpringConfig, SpringFilter};
//! use glint_core::MotionValue;
//!
//! let scheduler = FrameScheduler::new();
//! let pointer_x = MotionValue::new(0.0);
//! let smooth_x = SpringFilter::new(&scheduler, &pointer_x, SpringConfig::tilt()).unwrap();
//!
//! pointer_x.set(0.5);
//! scheduler.run_until_idle(1.0 / 60.0, 600);
//!
//! assert_eq!(smooth_x.output().get(), 0.5);
//! assert!(!scheduler.is_running());
//! ```

use crate::error::{MotionError, Result};
use crate::scheduler::{FrameScheduler, TickOutcome, Tickable};
use crate::spring::{RestThreshold, Spring, SpringConfig};
use glint_core::{MotionValue, Subscription};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Largest `dt` a single frame may integrate (seconds)
///
/// Longer gaps (a backgrounded tab) are treated as one slow frame.
pub const DEFAULT_MAX_DT: f32 = 1.0 / 30.0;

/// Rest detection and frame clamping options
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringOptions {
    pub rest: RestThreshold,
    pub max_dt: f32,
}

impl Default for SpringOptions {
    fn default() -> Self {
        Self {
            rest: RestThreshold::default(),
            max_dt: DEFAULT_MAX_DT,
        }
    }
}

impl SpringOptions {
    pub fn validate(self) -> Result<Self> {
        crate::error::require_positive("max_dt", self.max_dt)?;
        crate::error::require_positive("rest.delta", self.rest.delta)?;
        crate::error::require_positive("rest.speed", self.rest.speed)?;
        Ok(self)
    }
}

/// The registered half of a spring filter
struct SpringDriver {
    spring: Spring,
    target: MotionValue,
    output: MotionValue,
    options: SpringOptions,
    /// Consecutive ticks within the rest thresholds
    rest_frames: u32,
    /// Jump requested while the driver was mid-tick
    pending_jump: Rc<Cell<Option<f32>>>,
}

impl SpringDriver {
    fn jump(&mut self, value: f32) {
        self.spring.snap_to(value);
        self.rest_frames = 0;
    }
}

impl Tickable for SpringDriver {
    fn tick(&mut self, dt: f32) -> Result<TickOutcome> {
        if let Some(value) = self.pending_jump.take() {
            self.jump(value);
        }

        let target = self.target.get();
        if !target.is_finite() {
            return Err(MotionError::tick_failure(
                "spring",
                format!("non-finite target {target}"),
            ));
        }

        let (value, velocity) = (self.spring.value(), self.spring.velocity());
        self.spring.set_target(target);
        self.spring.step(dt.clamp(0.0, self.options.max_dt));

        if !(self.spring.value().is_finite() && self.spring.velocity().is_finite()) {
            self.spring.restore(value, velocity);
            return Err(MotionError::tick_failure(
                "spring",
                "integration produced a non-finite state",
            ));
        }

        let rest = self.options.rest;
        if rest.is_within(self.spring.value(), self.spring.velocity(), target) {
            self.rest_frames += 1;
        } else {
            self.rest_frames = 0;
        }

        if self.rest_frames >= rest.frames.max(1) {
            self.rest_frames = 0;
            self.spring.snap_to(target);
            self.output.set(target);
            // An output subscriber retargeted or jumped; stay registered
            if self.pending_jump.get().is_some() || self.target.get() != target {
                return Ok(TickOutcome::Active);
            }
            return Ok(TickOutcome::Rest);
        }

        self.output.set(self.spring.value());
        Ok(TickOutcome::Active)
    }

    fn label(&self) -> &str {
        "spring"
    }
}

/// A spring that follows a target motion value
pub struct SpringFilter {
    driver: Rc<RefCell<SpringDriver>>,
    target: MotionValue,
    output: MotionValue,
    scheduler: FrameScheduler,
    target_subscription: Subscription,
    config: SpringConfig,
    pending_jump: Rc<Cell<Option<f32>>>,
}

impl SpringFilter {
    /// Create a filter following `target`, starting at its current value
    pub fn new(
        scheduler: &FrameScheduler,
        target: &MotionValue,
        config: SpringConfig,
    ) -> Result<Self> {
        Self::with_options(scheduler, target, config, SpringOptions::default())
    }

    /// Create a filter with explicit rest thresholds and frame clamp
    pub fn with_options(
        scheduler: &FrameScheduler,
        target: &MotionValue,
        config: SpringConfig,
        options: SpringOptions,
    ) -> Result<Self> {
        let config = config.validate()?;
        let options = options.validate()?;

        let initial = target.get();
        let output = MotionValue::new(initial);
        let pending_jump = Rc::new(Cell::new(None));
        let driver = Rc::new(RefCell::new(SpringDriver {
            spring: Spring::new(config, initial),
            target: target.clone(),
            output: output.clone(),
            options,
            rest_frames: 0,
            pending_jump: pending_jump.clone(),
        }));

        // Wake on every target change; registering twice is a no-op.
        let weak_scheduler = scheduler.downgrade();
        let weak_driver = Rc::downgrade(&driver);
        let target_subscription = target.subscribe(move |_| {
            if let (Some(scheduler), Some(driver)) =
                (weak_scheduler.upgrade(), weak_driver.upgrade())
            {
                scheduler.register(&driver);
            }
        });

        scheduler.register(&driver);
        tracing::debug!(
            stiffness = config.stiffness,
            damping = config.damping,
            mass = config.mass,
            "spring filter created"
        );

        Ok(Self {
            driver,
            target: target.clone(),
            output,
            scheduler: scheduler.clone(),
            target_subscription,
            config,
            pending_jump,
        })
    }

    /// The integrated position, updated every tick
    pub fn output(&self) -> &MotionValue {
        &self.output
    }

    pub fn target(&self) -> &MotionValue {
        &self.target
    }

    /// Current position (same as `output().get()`)
    pub fn position(&self) -> f32 {
        self.output.get()
    }

    /// Current velocity, or 0 while the spring is mid-tick
    pub fn velocity(&self) -> f32 {
        self.driver
            .try_borrow()
            .map(|driver| driver.spring.velocity())
            .unwrap_or_default()
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    /// Whether the filter is currently registered with the scheduler
    pub fn is_registered(&self) -> bool {
        self.scheduler.is_registered(&self.driver)
    }

    /// Teleport to `value` without animating
    ///
    /// If the target differs from `value` the spring animates from there.
    /// Called from an output subscriber mid-tick, the jump lands at the
    /// start of the next tick.
    pub fn jump(&self, value: f32) {
        match self.driver.try_borrow_mut() {
            Ok(mut driver) => driver.jump(value),
            Err(_) => self.pending_jump.set(Some(value)),
        }
        self.output.set(value);
        self.scheduler.register(&self.driver);
    }

    /// Unregister from the scheduler and drop the target subscription
    ///
    /// Idempotent; also runs on drop.
    pub fn destroy(&self) {
        self.target_subscription.unsubscribe();
        if self.scheduler.unregister(&self.driver) {
            tracing::debug!("spring filter destroyed");
        }
    }
}

impl Drop for SpringFilter {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_registers_on_construction() {
        let scheduler = FrameScheduler::new();
        let target = MotionValue::new(0.0);
        let filter = SpringFilter::new(&scheduler, &target, SpringConfig::tilt()).unwrap();

        assert!(filter.is_registered());
        assert_eq!(scheduler.live_count(), 1);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let scheduler = FrameScheduler::new();
        let target = MotionValue::new(0.0);
        let config = SpringConfig {
            stiffness: 100.0,
            damping: 10.0,
            mass: -1.0,
        };

        let result = SpringFilter::new(&scheduler, &target, config);
        assert!(matches!(
            result,
            Err(MotionError::Configuration {
                parameter: "mass",
                ..
            })
        ));
        assert_eq!(scheduler.live_count(), 0);
        assert_eq!(target.subscriber_count(), 0);
    }

    #[test]
    fn test_settles_and_deregisters() {
        let scheduler = FrameScheduler::new();
        let target = MotionValue::new(0.0);
        let filter = SpringFilter::new(&scheduler, &target, SpringConfig::tilt()).unwrap();

        target.set(0.5);
        let frames = scheduler.run_until_idle(DT, 1000);

        assert!(frames > 3);
        assert!(!filter.is_registered());
        assert_eq!(filter.position(), 0.5);
        assert_eq!(filter.velocity(), 0.0);
    }

    #[test]
    fn test_target_change_while_resting_wakes_filter() {
        let scheduler = FrameScheduler::new();
        let target = MotionValue::new(0.0);
        let filter = SpringFilter::new(&scheduler, &target, SpringConfig::tilt()).unwrap();
        scheduler.run_until_idle(DT, 1000);
        assert!(!filter.is_registered());

        target.set(-0.25);
        assert!(filter.is_registered());

        scheduler.tick(DT);
        assert!(filter.position() < 0.0);
    }

    #[test]
    fn test_output_notifies_each_tick() {
        let scheduler = FrameScheduler::new();
        let target = MotionValue::new(0.0);
        let filter = SpringFilter::new(&scheduler, &target, SpringConfig::tilt()).unwrap();
        let before = filter.output().version();

        target.set(1.0);
        scheduler.tick(DT);
        scheduler.tick(DT);

        assert_eq!(filter.output().version(), before + 2);
    }

    #[test]
    fn test_dt_is_clamped() {
        let scheduler = FrameScheduler::new();
        let target = MotionValue::new(0.0);
        let clamped = SpringFilter::new(&scheduler, &target, SpringConfig::tilt()).unwrap();

        let mut reference = Spring::new(SpringConfig::tilt(), 0.0);
        reference.set_target(1.0);
        reference.step(DEFAULT_MAX_DT);

        target.set(1.0);
        scheduler.tick(5.0);

        assert!((clamped.position() - reference.value()).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_target_fails_without_corrupting_state() {
        let scheduler = FrameScheduler::new();
        let target = MotionValue::new(0.0);
        let filter = SpringFilter::new(&scheduler, &target, SpringConfig::tilt()).unwrap();

        target.set(f32::NAN);
        let report = scheduler.tick(DT);
        assert_eq!(report.failed, 1);
        assert!(filter.is_registered());
        assert_eq!(filter.position(), 0.0);

        // Recovers once the target is valid again
        target.set(0.5);
        scheduler.run_until_idle(DT, 1000);
        assert_eq!(filter.position(), 0.5);
    }

    #[test]
    fn test_destroy_unregisters_and_unsubscribes() {
        let scheduler = FrameScheduler::new();
        let target = MotionValue::new(0.0);
        let filter = SpringFilter::new(&scheduler, &target, SpringConfig::tilt()).unwrap();

        filter.destroy();
        filter.destroy();
        assert_eq!(scheduler.live_count(), 0);
        assert_eq!(target.subscriber_count(), 0);

        target.set(1.0);
        assert_eq!(scheduler.live_count(), 0);
    }

    #[test]
    fn test_drop_unregisters() {
        let scheduler = FrameScheduler::new();
        let target = MotionValue::new(0.0);
        {
            let _filter = SpringFilter::new(&scheduler, &target, SpringConfig::tilt()).unwrap();
            target.set(1.0);
            scheduler.tick(DT);
        }
        assert_eq!(scheduler.live_count(), 0);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_jump_teleports() {
        let scheduler = FrameScheduler::new();
        let target = MotionValue::new(0.0);
        let filter = SpringFilter::new(&scheduler, &target, SpringConfig::tilt()).unwrap();

        target.set(2.0);
        filter.jump(2.0);
        assert_eq!(filter.position(), 2.0);

        scheduler.run_until_idle(DT, 10);
        assert_eq!(filter.position(), 2.0);
        assert!(!filter.is_registered());
    }

    #[test]
    fn test_jump_from_output_subscriber() {
        let scheduler = FrameScheduler::new();
        let target = MotionValue::new(0.0);
        let filter =
            Rc::new(SpringFilter::new(&scheduler, &target, SpringConfig::tilt()).unwrap());
        let jumped = Rc::new(Cell::new(false));

        let _subscription = {
            let weak = Rc::downgrade(&filter);
            let jumped = jumped.clone();
            filter.output().subscribe(move |value| {
                if let Some(filter) = weak.upgrade() {
                    if value > 0.5 && !jumped.get() {
                        jumped.set(true);
                        assert_eq!(filter.config(), SpringConfig::tilt());
                        filter.jump(-1.0);
                    }
                }
            })
        };

        target.set(1.0);
        while !jumped.get() {
            scheduler.tick(DT);
        }
        assert_eq!(filter.position(), -1.0);
        assert!(filter.is_registered());

        scheduler.tick(DT);
        assert!(filter.position() > -1.0 && filter.position() < 0.0);

        scheduler.run_until_idle(DT, 1000);
        assert_eq!(filter.position(), 1.0);
    }

    #[test]
    fn test_retarget_during_settling_tick_is_kept() {
        let scheduler = FrameScheduler::new();
        let target = MotionValue::new(0.0);
        let filter =
            Rc::new(SpringFilter::new(&scheduler, &target, SpringConfig::tilt()).unwrap());
        target.set(0.5);

        // Jump away on the exact frame the spring snaps to rest
        let _subscription = {
            let weak = Rc::downgrade(&filter);
            filter.output().subscribe(move |value| {
                if let Some(filter) = weak.upgrade() {
                    if value == 0.5 && filter.target().get() == 0.5 {
                        filter.target().set(0.25);
                        filter.jump(0.25);
                    }
                }
            })
        };

        scheduler.run_until_idle(DT, 1000);
        assert!(!scheduler.is_running());
        assert_eq!(filter.position(), 0.25);
    }

    #[test]
    fn test_chained_filters() {
        // A filter can follow another filter's output.
        let scheduler = FrameScheduler::new();
        let target = MotionValue::new(0.0);
        let first = SpringFilter::new(&scheduler, &target, SpringConfig::stiff()).unwrap();
        let second =
            SpringFilter::new(&scheduler, first.output(), SpringConfig::gentle()).unwrap();

        target.set(1.0);
        scheduler.run_until_idle(DT, 5000);

        assert_eq!(first.position(), 1.0);
        assert_eq!(second.position(), 1.0);
        assert!(!scheduler.is_running());
    }
}
