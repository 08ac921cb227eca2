//! Floating background orbs
//!
//! Three blurred radial blobs that wander away from their anchor and back on
//! long, out-of-phase loops. Each orb drives its x and y offsets with an
//! infinitely repeating keyframe track `[0, d, 0]`.

use glint_animation::{Easing, FrameScheduler, KeyframePlayer, KeyframeTrack, Result};
use glint_core::{HostEvent, MotionValue};
use serde::Serialize;

use crate::Component;

/// Static description of one orb
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbSpec {
    /// Diameter in pixels
    pub size: f32,
    pub background: &'static str,
    /// Blur radius in pixels
    pub blur: f32,
    /// Peak horizontal offset (px)
    pub drift_x: f32,
    /// Peak vertical offset (px)
    pub drift_y: f32,
    /// Seconds per loop
    pub duration: f32,
    /// CSS placement of the orb's resting position
    pub anchor: &'static str,
}

impl OrbSpec {
    /// The default trio: violet, warm accent, pink
    pub const DEFAULTS: [OrbSpec; 3] = [
        OrbSpec {
            size: 600.0,
            background: "radial-gradient(circle, oklch(0.4 0.12 265 / 0.15) 0%, transparent 70%)",
            blur: 80.0,
            drift_x: 60.0,
            drift_y: -30.0,
            duration: 30.0,
            anchor: "top: 5%; left: 55%",
        },
        OrbSpec {
            size: 400.0,
            background: "radial-gradient(circle, oklch(0.5 0.1 75 / 0.08) 0%, transparent 70%)",
            blur: 60.0,
            drift_x: -40.0,
            drift_y: 40.0,
            duration: 35.0,
            anchor: "top: 45%; left: 5%",
        },
        OrbSpec {
            size: 350.0,
            background: "radial-gradient(circle, oklch(0.45 0.1 300 / 0.08) 0%, transparent 70%)",
            blur: 70.0,
            drift_x: 30.0,
            drift_y: 50.0,
            duration: 25.0,
            anchor: "bottom: 15%; right: 15%",
        },
    ];

    fn track(&self, peak: f32) -> Result<KeyframeTrack> {
        KeyframeTrack::evenly_spaced(&[0.0, peak, 0.0], self.duration, Easing::ease_in_out())
            .map(KeyframeTrack::repeat_infinite)
    }
}

/// One orb's placement and offset, ready for the renderer
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrbStyle {
    pub size: f32,
    pub background: String,
    pub blur: f32,
    pub anchor: String,
    /// Horizontal offset from the anchor (px)
    pub x: f32,
    /// Vertical offset from the anchor (px)
    pub y: f32,
}

struct Orb {
    spec: OrbSpec,
    x: MotionValue,
    y: MotionValue,
    players: Option<[KeyframePlayer; 2]>,
}

impl Orb {
    fn new(spec: OrbSpec) -> Self {
        Self {
            spec,
            x: MotionValue::new(0.0),
            y: MotionValue::new(0.0),
            players: None,
        }
    }

    fn style(&self) -> OrbStyle {
        OrbStyle {
            size: self.spec.size,
            background: self.spec.background.to_string(),
            blur: self.spec.blur,
            anchor: self.spec.anchor.to_string(),
            x: self.x.get(),
            y: self.y.get(),
        }
    }
}

/// A set of drifting orbs
pub struct FloatingOrbs {
    orbs: Vec<Orb>,
    mounted: bool,
}

impl FloatingOrbs {
    pub fn new(specs: &[OrbSpec]) -> Self {
        Self {
            orbs: specs.iter().copied().map(Orb::new).collect(),
            mounted: false,
        }
    }

    pub fn len(&self) -> usize {
        self.orbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orbs.is_empty()
    }

    pub fn styles(&self) -> Vec<OrbStyle> {
        self.orbs.iter().map(Orb::style).collect()
    }
}

impl Default for FloatingOrbs {
    fn default() -> Self {
        Self::new(&OrbSpec::DEFAULTS)
    }
}

impl Component for FloatingOrbs {
    fn mount(&mut self, scheduler: &FrameScheduler) -> Result<()> {
        if self.mounted {
            return Ok(());
        }

        // Build every track first so an invalid OrbSpec leaves nothing registered
        let tracks = self
            .orbs
            .iter()
            .map(|orb| -> Result<(KeyframeTrack, KeyframeTrack)> {
                Ok((orb.spec.track(orb.spec.drift_x)?, orb.spec.track(orb.spec.drift_y)?))
            })
            .collect::<Result<Vec<_>>>()?;

        for (orb, (track_x, track_y)) in self.orbs.iter_mut().zip(tracks) {
            orb.players = Some([
                KeyframePlayer::new(scheduler, track_x, &orb.x),
                KeyframePlayer::new(scheduler, track_y, &orb.y),
            ]);
        }

        self.mounted = true;
        tracing::debug!(orbs = self.orbs.len(), "floating orbs mounted");
        Ok(())
    }

    fn unmount(&mut self) {
        for orb in &mut self.orbs {
            orb.players = None;
        }
        if self.mounted {
            self.mounted = false;
            tracing::debug!("floating orbs unmounted");
        }
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn handle_event(&mut self, _event: &HostEvent) {}
}
