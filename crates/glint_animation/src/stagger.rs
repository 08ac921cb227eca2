//! Staggered entrances
//!
//! A [`StaggerSequencer`] starts a list of entrances with delays that grow
//! with each item's position: item `i` starts after `base_delay + i * step`
//! seconds. Items keep the order they were pushed in.
//!
//! # Example
//!
//! ```rust
//! use glint_animation::{EntranceAnimation, FrameScheduler, StaggerSequencer};
//!
//! let scheduler = FrameScheduler::new();
//! let mut sequencer = StaggerSequencer::new(&scheduler, 0.0, 0.1).unwrap();
//! for _ in 0..3 {
//!     sequencer.push(EntranceAnimation::fade_up(0.5, 20.0).unwrap());
//! }
//!
//! assert!(sequencer.trigger());
//! assert!(!sequencer.trigger());
//! assert_eq!(sequencer.delays().len(), 3);
//! ```

use crate::entrance::EntranceAnimation;
use crate::error::{MotionError, Result};
use crate::scheduler::FrameScheduler;

/// Whether a sequencer has fired
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StaggerState {
    Armed,
    Triggered,
}

/// Starts entrances one after another
pub struct StaggerSequencer {
    scheduler: FrameScheduler,
    base_delay: f32,
    step: f32,
    items: Vec<EntranceAnimation>,
    state: StaggerState,
}

fn require_non_negative(parameter: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(MotionError::Configuration { parameter, value })
    }
}

impl StaggerSequencer {
    /// Create an armed sequencer
    ///
    /// `base_delay` and `step` are seconds and must be finite and
    /// non-negative.
    pub fn new(scheduler: &FrameScheduler, base_delay: f32, step: f32) -> Result<Self> {
        Ok(Self {
            scheduler: scheduler.clone(),
            base_delay: require_non_negative("base_delay", base_delay)?,
            step: require_non_negative("step", step)?,
            items: Vec::new(),
            state: StaggerState::Armed,
        })
    }

    /// Delay assigned to the item at `index`
    pub fn delay_for(&self, index: usize) -> f32 {
        self.base_delay + index as f32 * self.step
    }

    /// Append an entrance and return its index
    ///
    /// Items pushed after the sequencer fired start straight away with
    /// their positional delay.
    pub fn push(&mut self, entrance: EntranceAnimation) -> usize {
        let index = self.items.len();
        self.assign(index, &entrance);
        if self.state == StaggerState::Triggered {
            entrance.start(&self.scheduler);
        }
        self.items.push(entrance);
        index
    }

    fn assign(&self, index: usize, entrance: &EntranceAnimation) {
        if let Err(error) = entrance.set_delay(self.delay_for(index)) {
            tracing::warn!(index, %error, "stagger delay rejected");
        }
    }

    /// Start every item with its positional delay
    ///
    /// Returns false without doing anything if the sequencer already fired.
    pub fn trigger(&mut self) -> bool {
        if self.state == StaggerState::Triggered {
            return false;
        }
        self.state = StaggerState::Triggered;

        for (index, entrance) in self.items.iter().enumerate() {
            self.assign(index, entrance);
            entrance.start(&self.scheduler);
        }
        tracing::debug!(
            items = self.items.len(),
            base_delay = self.base_delay,
            step = self.step,
            "stagger triggered"
        );
        true
    }

    /// Stop and hide every item, and re-arm
    pub fn reset(&mut self) {
        for entrance in &self.items {
            entrance.hide();
        }
        self.state = StaggerState::Armed;
    }

    /// Stop every item where it is, without re-arming
    pub fn stop(&self) {
        for entrance in &self.items {
            entrance.stop();
        }
    }

    /// Delays currently assigned to the items, in order
    pub fn delays(&self) -> Vec<f32> {
        self.items.iter().map(EntranceAnimation::delay).collect()
    }

    pub fn items(&self) -> &[EntranceAnimation] {
        &self.items
    }

    pub fn state(&self) -> StaggerState {
        self.state
    }

    pub fn is_triggered(&self) -> bool {
        self.state == StaggerState::Triggered
    }

    /// Whether every item finished its entrance
    pub fn is_complete(&self) -> bool {
        self.is_triggered() && self.items.iter().all(EntranceAnimation::is_done)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entrance::EntrancePhase;

    const DT: f32 = 1.0 / 60.0;

    fn sequencer_with(
        scheduler: &FrameScheduler,
        count: usize,
        base: f32,
        step: f32,
    ) -> StaggerSequencer {
        let mut sequencer = StaggerSequencer::new(scheduler, base, step).unwrap();
        for _ in 0..count {
            sequencer.push(EntranceAnimation::fade_up(0.2, 20.0).unwrap());
        }
        sequencer
    }

    #[test]
    fn test_positional_delays() {
        let scheduler = FrameScheduler::new();
        let mut sequencer = sequencer_with(&scheduler, 4, 0.05, 0.1);
        sequencer.trigger();

        let delays = sequencer.delays();
        let expected = [0.05, 0.15, 0.25, 0.35];
        for (delay, expected) in delays.iter().zip(expected) {
            assert!((delay - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_trigger_starts_all_items() {
        let scheduler = FrameScheduler::new();
        let mut sequencer = sequencer_with(&scheduler, 3, 0.0, 0.1);
        assert_eq!(scheduler.live_count(), 0);

        assert!(sequencer.trigger());
        assert_eq!(scheduler.live_count(), 3);
        assert!(sequencer
            .items()
            .iter()
            .all(|item| item.phase() == EntrancePhase::Waiting));
    }

    #[test]
    fn test_retrigger_is_noop() {
        let scheduler = FrameScheduler::new();
        let mut sequencer = sequencer_with(&scheduler, 2, 0.0, 0.1);
        assert!(sequencer.trigger());
        scheduler.run_until_idle(DT, 1000);
        assert!(sequencer.is_complete());

        assert!(!sequencer.trigger());
        assert_eq!(scheduler.live_count(), 0);
    }

    #[test]
    fn test_items_start_in_order() {
        let scheduler = FrameScheduler::new();
        let mut sequencer = sequencer_with(&scheduler, 3, 0.0, 0.1);
        sequencer.trigger();

        // After 0.12s the first two have started and the third is waiting
        for _ in 0..6 {
            scheduler.tick(0.02);
        }
        let phases: Vec<EntrancePhase> = sequencer.items().iter().map(|i| i.phase()).collect();
        assert_eq!(phases[0], EntrancePhase::Running);
        assert_eq!(phases[1], EntrancePhase::Running);
        assert_eq!(phases[2], EntrancePhase::Waiting);
    }

    #[test]
    fn test_low_frame_rate_keeps_delays() {
        let scheduler = FrameScheduler::new();
        let mut sequencer = StaggerSequencer::new(&scheduler, 0.0, 0.1).unwrap();
        for _ in 0..3 {
            sequencer.push(EntranceAnimation::fade_up(0.45, 20.0).unwrap());
        }
        sequencer.trigger();
        let phases = |s: &StaggerSequencer| -> Vec<EntrancePhase> {
            s.items().iter().map(|i| i.phase()).collect()
        };

        // 10 fps: item i starts on the frame that reaches i * 0.1s
        scheduler.tick(0.1);
        assert_eq!(
            phases(&sequencer),
            [EntrancePhase::Running, EntrancePhase::Running, EntrancePhase::Waiting]
        );
        scheduler.tick(0.1);
        assert_eq!(phases(&sequencer)[2], EntrancePhase::Running);

        scheduler.tick(0.1);
        scheduler.tick(0.1);
        assert_eq!(phases(&sequencer)[0], EntrancePhase::Running);
        scheduler.tick(0.1);
        assert_eq!(phases(&sequencer)[0], EntrancePhase::Done);
    }

    #[test]
    fn test_reset_rearms() {
        let scheduler = FrameScheduler::new();
        let mut sequencer = sequencer_with(&scheduler, 2, 0.0, 0.1);
        sequencer.trigger();
        scheduler.tick(DT);

        sequencer.reset();
        assert_eq!(sequencer.state(), StaggerState::Armed);
        assert_eq!(scheduler.live_count(), 0);
        assert!(sequencer.items().iter().all(|i| i.opacity().get() == 0.0));

        assert!(sequencer.trigger());
    }

    #[test]
    fn test_empty_sequencer() {
        let scheduler = FrameScheduler::new();
        let mut sequencer = StaggerSequencer::new(&scheduler, 0.0, 0.1).unwrap();
        assert!(sequencer.is_empty());
        assert!(sequencer.trigger());
        assert!(sequencer.delays().is_empty());
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_late_push_starts_immediately() {
        let scheduler = FrameScheduler::new();
        let mut sequencer = sequencer_with(&scheduler, 1, 0.0, 0.1);
        sequencer.trigger();

        let index = sequencer.push(EntranceAnimation::fade_up(0.2, 20.0).unwrap());
        assert_eq!(index, 1);
        assert!((sequencer.delays()[1] - 0.1).abs() < 1e-6);
        assert_eq!(sequencer.items()[1].phase(), EntrancePhase::Waiting);
    }

    #[test]
    fn test_rejects_negative_timing() {
        let scheduler = FrameScheduler::new();
        assert!(StaggerSequencer::new(&scheduler, -0.1, 0.1).is_err());
        assert!(StaggerSequencer::new(&scheduler, 0.0, f32::INFINITY).is_err());
    }
}
