//! Keyframe tracks
//!
//! Time-based animation of a single value through a list of keyframes,
//! optionally repeating. A [`KeyframePlayer`] writes the track into a
//! [`MotionValue`] every frame; infinitely repeating tracks register as
//! perpetual tickables.
//!
//! # Example
//!
//! ```rust
//! use glint_animation::{Easing, KeyframeTrack};
//!
//! // Drift right by 60px and back over 30s, forever
//! let track = KeyframeTrack::evenly_spaced(&[0.0, 60.0, 0.0], 30.0, Easing::ease_in_out())
//!     .unwrap()
//!     .repeat_infinite();
//!
//! assert_eq!(track.sample(0.5), 60.0);
//! ```

use crate::easing::Easing;
use crate::error::{require_positive, MotionError, Result};
use crate::scheduler::{FrameScheduler, Persistence, TickOutcome, Tickable};
use glint_core::MotionValue;
use std::cell::RefCell;
use std::rc::Rc;

/// A keyframe in a track
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    /// Position in the track (0.0 to 1.0)
    pub time: f32,
    pub value: f32,
    /// Easing used when transitioning TO this keyframe
    pub easing: Easing,
}

/// How many times a track plays
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// Play this many iterations in total (at least one)
    Count(u32),
    Infinite,
}

/// A keyframe track with playback state
#[derive(Clone, Debug)]
pub struct KeyframeTrack {
    keyframes: Vec<Keyframe>,
    /// Seconds per iteration
    duration: f32,
    repeat: Repeat,
    /// Alternate direction on every other iteration
    ping_pong: bool,
    elapsed: f32,
    iteration: u32,
    finished: bool,
}

impl KeyframeTrack {
    pub fn builder() -> KeyframeTrackBuilder {
        KeyframeTrackBuilder::new()
    }

    /// Keyframes spread evenly over `duration` seconds
    pub fn evenly_spaced(values: &[f32], duration: f32, easing: Easing) -> Result<Self> {
        let last = values.len().saturating_sub(1).max(1) as f32;
        values
            .iter()
            .enumerate()
            .fold(Self::builder().ease(easing), |builder, (i, value)| {
                builder.at(i as f32 / last * duration, *value)
            })
            .build()
    }

    /// Repeat forever
    pub fn repeat_infinite(mut self) -> Self {
        self.repeat = Repeat::Infinite;
        self
    }

    /// Play `count` iterations in total
    pub fn repeat_count(mut self, count: u32) -> Self {
        self.repeat = Repeat::Count(count.max(1));
        self
    }

    pub fn ping_pong(mut self) -> Self {
        self.ping_pong = true;
        self
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Completed iterations
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Rewind to the start
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.iteration = 0;
        self.finished = false;
    }

    /// Advance by `dt` seconds. Returns false once the last iteration ended.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.finished {
            return false;
        }
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }

        while self.elapsed >= self.duration {
            let more = match self.repeat {
                Repeat::Infinite => true,
                Repeat::Count(count) => self.iteration + 1 < count,
            };
            if !more {
                self.elapsed = self.duration;
                self.finished = true;
                return false;
            }
            self.elapsed -= self.duration;
            self.iteration += 1;
        }
        true
    }

    /// Progress within the current iteration, accounting for ping-pong
    pub fn progress(&self) -> f32 {
        let progress = (self.elapsed / self.duration).clamp(0.0, 1.0);
        if self.ping_pong && self.iteration % 2 == 1 {
            1.0 - progress
        } else {
            progress
        }
    }

    /// Current value
    pub fn value(&self) -> f32 {
        self.sample(self.progress())
    }

    /// Value at `progress` (0.0 to 1.0) through one iteration
    pub fn sample(&self, progress: f32) -> f32 {
        let (first, last) = match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if progress <= first.time {
            return first.value;
        }
        if progress >= last.time {
            return last.value;
        }

        for pair in self.keyframes.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if progress <= next.time {
                let span = next.time - prev.time;
                if span <= f32::EPSILON {
                    return next.value;
                }
                let local = (progress - prev.time) / span;
                let eased = next.easing.apply(local);
                return prev.value + (next.value - prev.value) * eased;
            }
        }
        last.value
    }
}

/// Builder for keyframe tracks, with keyframe times in seconds
#[derive(Clone, Debug, Default)]
pub struct KeyframeTrackBuilder {
    /// (seconds, value, easing)
    points: Vec<(f32, f32, Easing)>,
    default_easing: Easing,
}

impl KeyframeTrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a keyframe at `time` seconds with the default easing
    pub fn at(mut self, time: f32, value: f32) -> Self {
        self.points.push((time, value, self.default_easing));
        self
    }

    /// Add a keyframe with its own easing
    pub fn at_with_ease(mut self, time: f32, value: f32, easing: Easing) -> Self {
        self.points.push((time, value, easing));
        self
    }

    /// Set the default easing, also applied to keyframes already added
    pub fn ease(mut self, easing: Easing) -> Self {
        self.default_easing = easing;
        for point in &mut self.points {
            point.2 = easing;
        }
        self
    }

    /// Build a track that plays once
    ///
    /// The duration is the time of the last keyframe and must be positive.
    pub fn build(mut self) -> Result<KeyframeTrack> {
        if self.points.iter().any(|(time, value, _)| !time.is_finite() || !value.is_finite()) {
            return Err(MotionError::Configuration {
                parameter: "keyframe",
                value: f32::NAN,
            });
        }
        self.points.sort_by(|a, b| a.0.total_cmp(&b.0));

        let duration = self.points.last().map(|p| p.0).unwrap_or(0.0);
        let duration = require_positive("duration", duration)?;

        let keyframes = self
            .points
            .iter()
            .map(|(time, value, easing)| Keyframe {
                time: (time / duration).max(0.0),
                value: *value,
                easing: *easing,
            })
            .collect();

        Ok(KeyframeTrack {
            keyframes,
            duration,
            repeat: Repeat::Count(1),
            ping_pong: false,
            elapsed: 0.0,
            iteration: 0,
            finished: false,
        })
    }
}

// ============================================================================
// Playback
// ============================================================================

struct KeyframeDriver {
    track: KeyframeTrack,
    output: MotionValue,
}

impl Tickable for KeyframeDriver {
    fn tick(&mut self, dt: f32) -> Result<TickOutcome> {
        let playing = self.track.advance(dt);
        self.output.set(self.track.value());
        Ok(if playing {
            TickOutcome::Active
        } else {
            TickOutcome::Rest
        })
    }

    fn persistence(&self) -> Persistence {
        match self.track.repeat() {
            Repeat::Infinite => Persistence::Perpetual,
            Repeat::Count(_) => Persistence::Settling,
        }
    }

    fn label(&self) -> &str {
        "keyframes"
    }
}

/// Plays a keyframe track into a motion value
pub struct KeyframePlayer {
    driver: Rc<RefCell<KeyframeDriver>>,
    output: MotionValue,
    scheduler: FrameScheduler,
}

impl KeyframePlayer {
    /// Start playing `track` into `output`
    pub fn new(scheduler: &FrameScheduler, track: KeyframeTrack, output: &MotionValue) -> Self {
        output.set(track.value());
        let player = Self {
            driver: Rc::new(RefCell::new(KeyframeDriver {
                track,
                output: output.clone(),
            })),
            output: output.clone(),
            scheduler: scheduler.clone(),
        };
        player.scheduler.register(&player.driver);
        player
    }

    pub fn output(&self) -> &MotionValue {
        &self.output
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_registered(&self.driver)
    }

    /// Rewind and play again
    pub fn restart(&self) {
        let value = {
            let mut driver = self.driver.borrow_mut();
            driver.track.reset();
            driver.track.value()
        };
        self.output.set(value);
        self.scheduler.register(&self.driver);
    }

    pub fn stop(&self) {
        self.scheduler.unregister(&self.driver);
    }
}

impl Drop for KeyframePlayer {
    fn drop(&mut self) {
        self.stop();
    }
}
