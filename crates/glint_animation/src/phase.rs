//! Phase accumulators
//!
//! A perpetual tickable that advances a motion value at a constant rate. It
//! never settles; its owner removes it on unmount (or by dropping it).

use crate::error::{MotionError, Result};
use crate::filter::DEFAULT_MAX_DT;
use crate::scheduler::{FrameScheduler, Persistence, TickOutcome, Tickable};
use glint_core::MotionValue;
use std::cell::RefCell;
use std::rc::Rc;

struct PhaseDriver {
    value: MotionValue,
    /// Units per second
    rate: f32,
    max_dt: f32,
}

impl Tickable for PhaseDriver {
    fn tick(&mut self, dt: f32) -> Result<TickOutcome> {
        let next = self.value.get() + self.rate * dt.clamp(0.0, self.max_dt);
        if !next.is_finite() {
            return Err(MotionError::tick_failure("phase", "phase overflowed"));
        }
        self.value.set(next);
        Ok(TickOutcome::Active)
    }

    fn persistence(&self) -> Persistence {
        Persistence::Perpetual
    }

    fn label(&self) -> &str {
        "phase"
    }
}

/// Advances a motion value by `rate * dt` every frame
pub struct PhaseAccumulator {
    driver: Rc<RefCell<PhaseDriver>>,
    value: MotionValue,
    scheduler: FrameScheduler,
}

impl PhaseAccumulator {
    /// Create and start an accumulator driving `value`
    pub fn new(scheduler: &FrameScheduler, value: &MotionValue, rate: f32) -> Result<Self> {
        if !rate.is_finite() {
            return Err(MotionError::Configuration {
                parameter: "rate",
                value: rate,
            });
        }

        let accumulator = Self {
            driver: Rc::new(RefCell::new(PhaseDriver {
                value: value.clone(),
                rate,
                max_dt: DEFAULT_MAX_DT,
            })),
            value: value.clone(),
            scheduler: scheduler.clone(),
        };
        accumulator.start();
        Ok(accumulator)
    }

    pub fn value(&self) -> &MotionValue {
        &self.value
    }

    pub fn rate(&self) -> f32 {
        self.driver.borrow().rate
    }

    /// Change the rate; ignored unless finite
    pub fn set_rate(&self, rate: f32) {
        if rate.is_finite() {
            self.driver.borrow_mut().rate = rate;
        }
    }

    pub fn start(&self) {
        self.scheduler.register(&self.driver);
    }

    pub fn stop(&self) {
        self.scheduler.unregister(&self.driver);
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_registered(&self.driver)
    }
}

impl Drop for PhaseAccumulator {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advances_by_rate() {
        let scheduler = FrameScheduler::new();
        let phase = MotionValue::new(1.0);
        let accumulator = PhaseAccumulator::new(&scheduler, &phase, 0.6).unwrap();

        for _ in 0..10 {
            scheduler.tick(0.02);
        }

        assert!((phase.get() - (1.0 + 0.6 * 0.2)).abs() < 1e-5);
        assert!(accumulator.is_running());
    }

    #[test]
    fn test_never_settles() {
        let scheduler = FrameScheduler::new();
        let phase = MotionValue::new(0.0);
        let _accumulator = PhaseAccumulator::new(&scheduler, &phase, 0.0).unwrap();

        assert_eq!(scheduler.run_until_idle(0.016, 50), 50);
        assert!(scheduler.is_running());
    }

    #[test]
    fn test_long_gap_is_clamped() {
        let scheduler = FrameScheduler::new();
        let phase = MotionValue::new(0.0);
        let _accumulator = PhaseAccumulator::new(&scheduler, &phase, 3.0).unwrap();

        scheduler.tick(60.0);
        assert!((phase.get() - 3.0 * DEFAULT_MAX_DT).abs() < 1e-6);
    }

    #[test]
    fn test_drop_stops() {
        let scheduler = FrameScheduler::new();
        let phase = MotionValue::new(0.0);
        let accumulator = PhaseAccumulator::new(&scheduler, &phase, 1.0).unwrap();
        drop(accumulator);

        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_rejects_non_finite_rate() {
        let scheduler = FrameScheduler::new();
        let phase = MotionValue::new(0.0);
        assert!(PhaseAccumulator::new(&scheduler, &phase, f32::NAN).is_err());
        assert_eq!(scheduler.live_count(), 0);
    }
}
