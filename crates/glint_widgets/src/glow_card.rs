//! Glow and glass cards
//!
//! A [`GlowCard`] tilts toward the pointer in 3-D and paints a soft radial
//! glow that follows it. Both are driven by springs that chase the raw,
//! normalized pointer position, so the card eases into place instead of
//! snapping. A [`GlassCard`] only scales up slightly on hover.
//!
//! Tilt convention: with the pointer at the top-right corner the card
//! reports `rotate_x = +tilt_amount` and `rotate_y = +tilt_amount`. A
//! negative `tilt_amount` inverts both axes.

use glint_animation::{FrameScheduler, MotionError, Result, SpringConfig, SpringFilter};
use glint_core::{DerivedValue, HostEvent, MotionValue, Point2, RangeMap};
use serde::{Deserialize, Serialize};

use crate::Component;

/// Normalized pointer range on each axis
const POINTER_RANGE: [f32; 2] = [-0.5, 0.5];

/// How far the glow centre travels per unit of pointer offset (percent)
const GLOW_TRAVEL: f32 = 80.0;

/// CSS perspective applied while tilting (px)
const PERSPECTIVE: f32 = 1000.0;

/// Glow tint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlowColor {
    #[default]
    Violet,
    Gold,
    Rose,
    Emerald,
}

impl GlowColor {
    pub fn css(&self) -> &'static str {
        match self {
            GlowColor::Violet => "oklch(0.55 0.18 265 / 0.12)",
            GlowColor::Gold => "oklch(0.72 0.12 75 / 0.12)",
            GlowColor::Rose => "oklch(0.65 0.16 350 / 0.12)",
            GlowColor::Emerald => "oklch(0.65 0.14 165 / 0.12)",
        }
    }
}

/// Card transform and glow, ready for the renderer
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CardStyle {
    /// Degrees around the horizontal axis
    pub rotate_x: f32,
    /// Degrees around the vertical axis
    pub rotate_y: f32,
    pub scale: f32,
    pub perspective: Option<f32>,
    /// Glow centre, percent of the card width
    pub glow_x: f32,
    /// Glow centre, percent of the card height
    pub glow_y: f32,
    pub glow_background: Option<String>,
}

impl CardStyle {
    /// Untilted, unscaled, glow centred
    pub fn neutral() -> Self {
        Self {
            rotate_x: 0.0,
            rotate_y: 0.0,
            scale: 1.0,
            perspective: None,
            glow_x: 50.0,
            glow_y: 50.0,
            glow_background: None,
        }
    }
}

fn require_finite(parameter: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MotionError::Configuration { parameter, value })
    }
}

fn require_scale(value: f32) -> Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(MotionError::Configuration {
            parameter: "hover_scale",
            value,
        })
    }
}

// ============================================================================
// Hover scale
// ============================================================================

/// Spring-driven scale toward `hovered_scale` while the pointer is over the card
struct HoverScale {
    target: MotionValue,
    hovered_scale: f32,
    hovered: bool,
    config: SpringConfig,
    spring: Option<SpringFilter>,
}

impl HoverScale {
    fn new(hovered_scale: f32, config: SpringConfig) -> Self {
        Self {
            target: MotionValue::new(1.0),
            hovered_scale,
            hovered: false,
            config,
            spring: None,
        }
    }

    fn mount(&mut self, scheduler: &FrameScheduler) -> Result<()> {
        if self.spring.is_none() {
            self.spring = Some(SpringFilter::new(scheduler, &self.target, self.config)?);
        }
        Ok(())
    }

    fn unmount(&mut self) {
        self.spring = None;
    }

    fn is_mounted(&self) -> bool {
        self.spring.is_some()
    }

    fn enter(&mut self) {
        self.hovered = true;
        self.target.set(self.hovered_scale);
    }

    fn leave(&mut self) {
        self.hovered = false;
        self.target.set(1.0);
    }

    fn is_hovered(&self) -> bool {
        self.hovered
    }

    fn value(&self) -> f32 {
        self.spring.as_ref().map(SpringFilter::position).unwrap_or(1.0)
    }
}

// ============================================================================
// Glow card
// ============================================================================

/// Glow card options
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowCardOptions {
    /// Maximum tilt in degrees; negative inverts the tilt direction
    pub tilt_amount: f32,
    pub enable_tilt: bool,
    pub hover_scale: f32,
    pub glow_color: GlowColor,
    pub tilt_spring: SpringConfig,
    pub hover_spring: SpringConfig,
}

impl Default for GlowCardOptions {
    fn default() -> Self {
        Self {
            tilt_amount: 4.0,
            enable_tilt: true,
            hover_scale: 1.01,
            glow_color: GlowColor::Violet,
            tilt_spring: SpringConfig::tilt(),
            hover_spring: SpringConfig::hover(),
        }
    }
}

impl GlowCardOptions {
    pub fn validate(self) -> Result<Self> {
        require_finite("tilt_amount", self.tilt_amount)?;
        require_scale(self.hover_scale)?;
        self.tilt_spring.validate()?;
        self.hover_spring.validate()?;
        Ok(self)
    }
}

/// Springs and transforms that exist while the card is mounted
struct TiltRig {
    spring_x: SpringFilter,
    spring_y: SpringFilter,
    rotate_x: DerivedValue<f32>,
    rotate_y: DerivedValue<f32>,
    glow_center: DerivedValue<Point2>,
}

impl TiltRig {
    fn new(
        scheduler: &FrameScheduler,
        mouse_x: &MotionValue,
        mouse_y: &MotionValue,
        options: &GlowCardOptions,
    ) -> Result<Self> {
        let spring_x = SpringFilter::new(scheduler, mouse_x, options.tilt_spring)?;
        let spring_y = SpringFilter::new(scheduler, mouse_y, options.tilt_spring)?;

        let tilt = options.tilt_amount;
        let rotate_x =
            DerivedValue::remap(spring_y.output(), RangeMap::new(POINTER_RANGE, [tilt, -tilt]));
        let rotate_y =
            DerivedValue::remap(spring_x.output(), RangeMap::new(POINTER_RANGE, [-tilt, tilt]));
        let glow_center = DerivedValue::combine(
            &[spring_x.output().clone(), spring_y.output().clone()],
            |v| Point2::new(50.0 + v[0] * GLOW_TRAVEL, 50.0 + v[1] * GLOW_TRAVEL),
        );

        Ok(Self {
            spring_x,
            spring_y,
            rotate_x,
            rotate_y,
            glow_center,
        })
    }
}

/// A card that tilts toward the pointer and glows under it
pub struct GlowCard {
    options: GlowCardOptions,
    mouse_x: MotionValue,
    mouse_y: MotionValue,
    hover: HoverScale,
    rig: Option<TiltRig>,
}

impl GlowCard {
    pub fn new(options: GlowCardOptions) -> Result<Self> {
        let options = options.validate()?;
        Ok(Self::with_valid_options(options))
    }

    fn with_valid_options(options: GlowCardOptions) -> Self {
        Self {
            options,
            mouse_x: MotionValue::new(0.0),
            mouse_y: MotionValue::new(0.0),
            hover: HoverScale::new(options.hover_scale, options.hover_spring),
            rig: None,
        }
    }

    pub fn options(&self) -> &GlowCardOptions {
        &self.options
    }

    /// Raw normalized pointer x
    pub fn mouse_x(&self) -> &MotionValue {
        &self.mouse_x
    }

    /// Raw normalized pointer y
    pub fn mouse_y(&self) -> &MotionValue {
        &self.mouse_y
    }

    pub fn is_hovered(&self) -> bool {
        self.hover.is_hovered()
    }

    pub fn rotate_x(&self) -> f32 {
        match &self.rig {
            Some(rig) if self.options.enable_tilt => rig.rotate_x.get(),
            _ => 0.0,
        }
    }

    pub fn rotate_y(&self) -> f32 {
        match &self.rig {
            Some(rig) if self.options.enable_tilt => rig.rotate_y.get(),
            _ => 0.0,
        }
    }

    /// Glow centre in percent of the card size
    pub fn glow_center(&self) -> Point2 {
        self.rig
            .as_ref()
            .map(|rig| rig.glow_center.get())
            .unwrap_or(Point2::new(50.0, 50.0))
    }

    /// Smoothed pointer position, `(0, 0)` while unmounted
    pub fn smoothed_pointer(&self) -> Point2 {
        self.rig
            .as_ref()
            .map(|rig| Point2::new(rig.spring_x.position(), rig.spring_y.position()))
            .unwrap_or_default()
    }

    pub fn scale(&self) -> f32 {
        self.hover.value()
    }

    pub fn style(&self) -> CardStyle {
        if self.rig.is_none() {
            return CardStyle::neutral();
        }

        let glow = self.glow_center();
        CardStyle {
            rotate_x: self.rotate_x(),
            rotate_y: self.rotate_y(),
            scale: self.scale(),
            perspective: self.options.enable_tilt.then_some(PERSPECTIVE),
            glow_x: glow.x,
            glow_y: glow.y,
            glow_background: Some(format!(
                "radial-gradient(circle at {}, {}, transparent 60%)",
                glow.to_percent_pair(),
                self.options.glow_color.css()
            )),
        }
    }
}

impl Default for GlowCard {
    fn default() -> Self {
        Self::with_valid_options(GlowCardOptions::default())
    }
}

impl Component for GlowCard {
    fn mount(&mut self, scheduler: &FrameScheduler) -> Result<()> {
        if self.rig.is_some() {
            return Ok(());
        }
        let rig = TiltRig::new(scheduler, &self.mouse_x, &self.mouse_y, &self.options)?;
        self.hover.mount(scheduler)?;
        self.rig = Some(rig);
        tracing::debug!(tilt = self.options.tilt_amount, "glow card mounted");
        Ok(())
    }

    fn unmount(&mut self) {
        if self.rig.take().is_some() {
            tracing::debug!("glow card unmounted");
        }
        self.hover.unmount();
    }

    fn is_mounted(&self) -> bool {
        self.rig.is_some()
    }

    fn handle_event(&mut self, event: &HostEvent) {
        match event {
            HostEvent::PointerMove { .. } => {
                if let Some(sample) = event.pointer_sample() {
                    self.mouse_x.set(sample.x);
                    self.mouse_y.set(sample.y);
                }
            }
            HostEvent::PointerEnter => self.hover.enter(),
            HostEvent::PointerLeave => {
                self.mouse_x.set(0.0);
                self.mouse_y.set(0.0);
                self.hover.leave();
            }
            _ => {}
        }
    }
}

// ============================================================================
// Glass card
// ============================================================================

/// Glass card options
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlassCardOptions {
    pub hover_scale: f32,
    pub hover_spring: SpringConfig,
}

impl Default for GlassCardOptions {
    fn default() -> Self {
        Self {
            hover_scale: 1.005,
            hover_spring: SpringConfig::hover(),
        }
    }
}

/// A card that only scales on hover
pub struct GlassCard {
    hover: HoverScale,
}

impl GlassCard {
    pub fn new(options: GlassCardOptions) -> Result<Self> {
        let scale = require_scale(options.hover_scale)?;
        let config = options.hover_spring.validate()?;
        Ok(Self {
            hover: HoverScale::new(scale, config),
        })
    }

    pub fn scale(&self) -> f32 {
        self.hover.value()
    }

    pub fn is_hovered(&self) -> bool {
        self.hover.is_hovered()
    }

    pub fn style(&self) -> CardStyle {
        CardStyle {
            scale: self.scale(),
            ..CardStyle::neutral()
        }
    }
}

impl Default for GlassCard {
    fn default() -> Self {
        let options = GlassCardOptions::default();
        Self {
            hover: HoverScale::new(options.hover_scale, options.hover_spring),
        }
    }
}

impl Component for GlassCard {
    fn mount(&mut self, scheduler: &FrameScheduler) -> Result<()> {
        self.hover.mount(scheduler)
    }

    fn unmount(&mut self) {
        self.hover.unmount();
    }

    fn is_mounted(&self) -> bool {
        self.hover.is_mounted()
    }

    fn handle_event(&mut self, event: &HostEvent) {
        match event {
            HostEvent::PointerEnter => self.hover.enter(),
            HostEvent::PointerLeave => self.hover.leave(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_unmounted_style_is_neutral() {
        let card = GlowCard::default();
        assert_eq!(card.style(), CardStyle::neutral());
    }

    #[test]
    fn test_glow_follows_pointer() {
        let scheduler = FrameScheduler::new();
        let mut card = GlowCard::default();
        card.mount(&scheduler).unwrap();

        // Left edge, vertically centred
        card.handle_event(&HostEvent::pointer_move(0.0, 50.0, 200.0, 100.0));
        scheduler.run_until_idle(DT, 2000);

        let glow = card.glow_center();
        assert!(approx(glow.x, 10.0));
        assert!(approx(glow.y, 50.0));
        let background = card.style().glow_background.unwrap();
        assert!(background.starts_with("radial-gradient(circle at 10% 50%"));
    }

    #[test]
    fn test_negative_tilt_inverts() {
        let scheduler = FrameScheduler::new();
        let mut card = GlowCard::new(GlowCardOptions {
            tilt_amount: -4.0,
            ..GlowCardOptions::default()
        })
        .unwrap();
        card.mount(&scheduler).unwrap();

        card.handle_event(&HostEvent::pointer_move(100.0, 0.0, 100.0, 100.0));
        scheduler.run_until_idle(DT, 2000);

        assert_eq!(card.rotate_x(), -4.0);
        assert_eq!(card.rotate_y(), -4.0);
    }

    #[test]
    fn test_disabled_tilt_keeps_glow() {
        let scheduler = FrameScheduler::new();
        let mut card = GlowCard::new(GlowCardOptions {
            enable_tilt: false,
            ..GlowCardOptions::default()
        })
        .unwrap();
        card.mount(&scheduler).unwrap();

        card.handle_event(&HostEvent::pointer_move(100.0, 0.0, 100.0, 100.0));
        scheduler.run_until_idle(DT, 2000);

        let style = card.style();
        assert_eq!(style.rotate_x, 0.0);
        assert_eq!(style.rotate_y, 0.0);
        assert_eq!(style.perspective, None);
        assert!(approx(style.glow_x, 90.0));
    }

    #[test]
    fn test_hover_scales_and_leave_resets() {
        let scheduler = FrameScheduler::new();
        let mut card = GlowCard::default();
        card.mount(&scheduler).unwrap();

        card.handle_event(&HostEvent::PointerEnter);
        card.handle_event(&HostEvent::pointer_move(80.0, 20.0, 100.0, 100.0));
        scheduler.run_until_idle(DT, 2000);
        assert!(card.is_hovered());
        assert_eq!(card.scale(), 1.01);

        card.handle_event(&HostEvent::PointerLeave);
        assert_eq!(card.mouse_x().get(), 0.0);
        assert_eq!(card.mouse_y().get(), 0.0);
        scheduler.run_until_idle(DT, 2000);
        assert_eq!(card.scale(), 1.0);
        assert_eq!(card.smoothed_pointer(), Point2::new(0.0, 0.0));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let bad_spring = GlowCardOptions {
            tilt_spring: SpringConfig {
                stiffness: 0.0,
                damping: 35.0,
                mass: 1.0,
            },
            ..GlowCardOptions::default()
        };
        assert!(GlowCard::new(bad_spring).is_err());

        let bad_scale = GlassCardOptions {
            hover_scale: f32::NAN,
            ..GlassCardOptions::default()
        };
        assert!(GlassCard::new(bad_scale).is_err());
    }

    #[test]
    fn test_unmount_releases_everything() {
        let scheduler = FrameScheduler::new();
        let mut card = GlowCard::default();
        card.mount(&scheduler).unwrap();
        card.mount(&scheduler).unwrap();
        assert_eq!(scheduler.live_count(), 3);
        assert_eq!(card.mouse_x().subscriber_count(), 1);

        card.unmount();
        card.unmount();
        assert!(!card.is_mounted());
        assert_eq!(scheduler.live_count(), 0);
        assert_eq!(card.mouse_x().subscriber_count(), 0);
    }

    #[test]
    fn test_glass_card_hover() {
        let scheduler = FrameScheduler::new();
        let mut card = GlassCard::default();
        card.dispatch(&scheduler, &HostEvent::Mount).unwrap();
        assert!(card.is_mounted());

        card.handle_event(&HostEvent::PointerEnter);
        scheduler.run_until_idle(DT, 2000);
        assert_eq!(card.style().scale, 1.005);
        assert_eq!(card.style().rotate_x, 0.0);

        card.dispatch(&scheduler, &HostEvent::Unmount).unwrap();
        assert_eq!(scheduler.live_count(), 0);
    }
}
