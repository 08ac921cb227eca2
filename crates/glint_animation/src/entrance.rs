//! Entrance animations
//!
//! An [`EntranceAnimation`] is a delayed, fixed-duration tween of opacity and
//! vertical offset. It stays hidden until started, waits out its delay, runs
//! the tween and then leaves the scheduler.
//!
//! The animation is a cheap clonable handle; clones share state, which is how
//! a [`StaggerSequencer`](crate::StaggerSequencer) and the component that
//! renders an item observe the same entrance.

use crate::easing::Easing;
use crate::error::{require_positive, MotionError, Result};
use crate::scheduler::{FrameScheduler, TickOutcome, Tickable, WeakScheduler};
use glint_core::MotionValue;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Default distance an entrance rises from, in pixels
pub const DEFAULT_DISTANCE: f32 = 20.0;

/// Default entrance duration in seconds
pub const DEFAULT_DURATION: f32 = 0.6;

/// Opacity and vertical offset at one end of an entrance
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntranceFrame {
    pub opacity: f32,
    pub translate_y: f32,
}

impl EntranceFrame {
    pub const VISIBLE: EntranceFrame = EntranceFrame {
        opacity: 1.0,
        translate_y: 0.0,
    };

    pub const fn hidden_below(distance: f32) -> Self {
        Self {
            opacity: 0.0,
            translate_y: distance,
        }
    }

    fn lerp(self, to: EntranceFrame, t: f32) -> EntranceFrame {
        EntranceFrame {
            opacity: self.opacity + (to.opacity - self.opacity) * t,
            translate_y: self.translate_y + (to.translate_y - self.translate_y) * t,
        }
    }
}

/// Lifecycle of an entrance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntrancePhase {
    /// Not started; outputs show the `from` frame
    Hidden,
    /// Started, counting down the delay
    Waiting,
    Running,
    /// Outputs show the `to` frame
    Done,
}

/// Entrance timing and endpoints
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntranceOptions {
    /// Seconds between start and the tween beginning
    pub delay: f32,
    /// Tween length in seconds
    pub duration: f32,
    pub from: EntranceFrame,
    pub to: EntranceFrame,
    pub easing: Easing,
}

impl Default for EntranceOptions {
    fn default() -> Self {
        Self {
            delay: 0.0,
            duration: DEFAULT_DURATION,
            from: EntranceFrame::hidden_below(DEFAULT_DISTANCE),
            to: EntranceFrame::VISIBLE,
            easing: Easing::entrance(),
        }
    }
}

impl EntranceOptions {
    pub fn validate(self) -> Result<Self> {
        require_positive("duration", self.duration)?;
        require_delay(self.delay)?;
        let frames = [self.from, self.to];
        if let Some(bad) = frames
            .iter()
            .flat_map(|f| [f.opacity, f.translate_y])
            .find(|v| !v.is_finite())
        {
            return Err(MotionError::Configuration {
                parameter: "frame",
                value: bad,
            });
        }
        Ok(self)
    }
}

fn require_delay(delay: f32) -> Result<f32> {
    if delay.is_finite() && delay >= 0.0 {
        Ok(delay)
    } else {
        Err(MotionError::Configuration {
            parameter: "delay",
            value: delay,
        })
    }
}

struct EntranceState {
    options: EntranceOptions,
    phase: EntrancePhase,
    /// Seconds spent in the current phase
    elapsed: f32,
    opacity: MotionValue,
    translate_y: MotionValue,
    scheduler: Option<WeakScheduler>,
}

impl EntranceState {
    fn show(&self, frame: EntranceFrame) {
        self.opacity.set(frame.opacity);
        self.translate_y.set(frame.translate_y);
    }

    fn show_progress(&self) -> bool {
        let t = (self.elapsed / self.options.duration).min(1.0);
        let eased = self.options.easing.apply(t);
        self.show(self.options.from.lerp(self.options.to, eased));
        t >= 1.0
    }
}

impl Tickable for EntranceState {
    fn tick(&mut self, dt: f32) -> Result<TickOutcome> {
        // Unclamped: delay and duration are wall-clock seconds
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        match self.phase {
            EntrancePhase::Hidden | EntrancePhase::Done => Ok(TickOutcome::Rest),
            EntrancePhase::Waiting => {
                self.elapsed += dt;
                if self.elapsed < self.options.delay {
                    return Ok(TickOutcome::Active);
                }
                // Time past the delay counts toward the tween
                self.elapsed -= self.options.delay;
                self.phase = EntrancePhase::Running;
                tracing::trace!(delay = self.options.delay, "entrance running");
                Ok(self.advance_running())
            }
            EntrancePhase::Running => {
                self.elapsed += dt;
                Ok(self.advance_running())
            }
        }
    }

    fn label(&self) -> &str {
        "entrance"
    }
}

impl EntranceState {
    fn advance_running(&mut self) -> TickOutcome {
        if self.show_progress() {
            self.phase = EntrancePhase::Done;
            self.elapsed = 0.0;
            TickOutcome::Rest
        } else {
            TickOutcome::Active
        }
    }
}

/// A delayed opacity/translate tween
#[derive(Clone)]
pub struct EntranceAnimation {
    state: Rc<RefCell<EntranceState>>,
    opacity: MotionValue,
    translate_y: MotionValue,
}

impl EntranceAnimation {
    pub fn new(options: EntranceOptions) -> Result<Self> {
        let options = options.validate()?;
        let opacity = MotionValue::new(options.from.opacity);
        let translate_y = MotionValue::new(options.from.translate_y);
        Ok(Self {
            state: Rc::new(RefCell::new(EntranceState {
                options,
                phase: EntrancePhase::Hidden,
                elapsed: 0.0,
                opacity: opacity.clone(),
                translate_y: translate_y.clone(),
                scheduler: None,
            })),
            opacity,
            translate_y,
        })
    }

    /// Fade in while rising `distance` pixels, over `duration` seconds
    pub fn fade_up(duration: f32, distance: f32) -> Result<Self> {
        Self::new(EntranceOptions {
            duration,
            from: EntranceFrame::hidden_below(distance),
            ..EntranceOptions::default()
        })
    }

    pub fn opacity(&self) -> &MotionValue {
        &self.opacity
    }

    pub fn translate_y(&self) -> &MotionValue {
        &self.translate_y
    }

    /// Current outputs
    pub fn frame(&self) -> EntranceFrame {
        EntranceFrame {
            opacity: self.opacity.get(),
            translate_y: self.translate_y.get(),
        }
    }

    pub fn phase(&self) -> EntrancePhase {
        self.state.borrow().phase
    }

    pub fn options(&self) -> EntranceOptions {
        self.state.borrow().options
    }

    pub fn delay(&self) -> f32 {
        self.state.borrow().options.delay
    }

    /// Change the delay; applies to the next start
    pub fn set_delay(&self, delay: f32) -> Result<()> {
        self.state.borrow_mut().options.delay = require_delay(delay)?;
        Ok(())
    }

    pub fn is_done(&self) -> bool {
        self.phase() == EntrancePhase::Done
    }

    /// Begin the entrance
    ///
    /// Returns false (and does nothing) unless the entrance is hidden.
    pub fn start(&self, scheduler: &FrameScheduler) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if state.phase != EntrancePhase::Hidden {
                return false;
            }
            state.phase = EntrancePhase::Waiting;
            state.elapsed = 0.0;
            state.scheduler = Some(scheduler.downgrade());
        }
        scheduler.register(&self.state);
        true
    }

    /// Leave the scheduler, freezing the outputs where they are
    pub fn stop(&self) {
        let scheduler = self.state.borrow_mut().scheduler.take();
        if let Some(scheduler) = scheduler.and_then(|s| s.upgrade()) {
            scheduler.unregister(&self.state);
        }
    }

    /// Stop and return to the hidden `from` frame so the entrance can rerun
    pub fn hide(&self) {
        self.stop();
        let mut state = self.state.borrow_mut();
        state.phase = EntrancePhase::Hidden;
        state.elapsed = 0.0;
        state.show(state.options.from);
    }

    /// Skip straight to the `to` frame
    pub fn finish(&self) {
        self.stop();
        let mut state = self.state.borrow_mut();
        state.phase = EntrancePhase::Done;
        state.elapsed = 0.0;
        state.show(state.options.to);
    }
}

impl std::fmt::Debug for EntranceAnimation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntranceAnimation")
            .field("phase", &self.phase())
            .field("frame", &self.frame())
            .finish()
    }
}
