//! Glint Animation System
//!
//! Spring filters, the frame scheduler, and time-based animations.
//!
//! # Features
//!
//! - **Spring Filters**: Damped springs that chase a target motion value
//! - **Frame Scheduler**: Ticks active animations and idles when they rest
//! - **Keyframe Tracks**: Looping keyframe sequences with easing
//! - **Entrances**: Delayed fade/rise tweens, staggered by position
//! - **Phase Accumulators**: Constant-rate phases for ambient motion

pub mod easing;
pub mod entrance;
pub mod error;
pub mod filter;
pub mod keyframe;
pub mod phase;
pub mod scheduler;
pub mod spring;
pub mod stagger;

pub use easing::Easing;
pub use entrance::{EntranceAnimation, EntranceFrame, EntranceOptions, EntrancePhase};
pub use error::{MotionError, Result};
pub use filter::{SpringFilter, SpringOptions, DEFAULT_MAX_DT};
pub use keyframe::{Keyframe, KeyframePlayer, KeyframeTrack, KeyframeTrackBuilder, Repeat};
pub use phase::PhaseAccumulator;
pub use scheduler::{
    FrameReport, FrameScheduler, LoopState, Persistence, TickOutcome, Tickable, TickableId,
    WeakScheduler,
};
pub use spring::{RestThreshold, Spring, SpringConfig};
pub use stagger::{StaggerSequencer, StaggerState};
