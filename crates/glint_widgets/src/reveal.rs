//! Scroll-reveal entrances
//!
//! [`FadeIn`] fades a single element up into place the first time it enters
//! the viewport. [`StaggerContainer`] does the same for a list of children,
//! starting each one a little after the previous.

use glint_animation::entrance::{DEFAULT_DISTANCE, DEFAULT_DURATION};
use glint_animation::{
    Easing, EntranceAnimation, EntranceFrame, EntranceOptions, FrameScheduler, Result,
    StaggerSequencer,
};
use glint_core::HostEvent;
use serde::{Deserialize, Serialize};

use crate::Component;

/// Opacity and offset of one revealed element
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EntranceStyle {
    pub opacity: f32,
    /// Vertical offset in pixels (positive is below the resting position)
    pub translate_y: f32,
}

impl From<EntranceFrame> for EntranceStyle {
    fn from(frame: EntranceFrame) -> Self {
        Self {
            opacity: frame.opacity,
            translate_y: frame.translate_y,
        }
    }
}

// ============================================================================
// FadeIn
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeInOptions {
    /// Seconds after entering the viewport
    pub delay: f32,
    pub duration: f32,
    /// Pixels to rise
    pub distance: f32,
    pub easing: Easing,
}

impl Default for FadeInOptions {
    fn default() -> Self {
        Self {
            delay: 0.0,
            duration: DEFAULT_DURATION,
            distance: DEFAULT_DISTANCE,
            easing: Easing::entrance(),
        }
    }
}

impl FadeInOptions {
    fn entrance(&self) -> Result<EntranceAnimation> {
        EntranceAnimation::new(EntranceOptions {
            delay: self.delay,
            duration: self.duration,
            from: EntranceFrame::hidden_below(self.distance),
            to: EntranceFrame::VISIBLE,
            easing: self.easing,
        })
    }
}

/// Fades an element up when it first becomes visible
pub struct FadeIn {
    entrance: EntranceAnimation,
    scheduler: Option<FrameScheduler>,
}

impl FadeIn {
    pub fn new(options: FadeInOptions) -> Result<Self> {
        Ok(Self {
            entrance: options.entrance()?,
            scheduler: None,
        })
    }

    /// Default fade with a start delay
    pub fn with_delay(delay: f32) -> Result<Self> {
        Self::new(FadeInOptions {
            delay,
            ..FadeInOptions::default()
        })
    }

    pub fn entrance(&self) -> &EntranceAnimation {
        &self.entrance
    }

    pub fn style(&self) -> EntranceStyle {
        self.entrance.frame().into()
    }
}

impl Component for FadeIn {
    fn mount(&mut self, scheduler: &FrameScheduler) -> Result<()> {
        self.scheduler = Some(scheduler.clone());
        Ok(())
    }

    fn unmount(&mut self) {
        self.entrance.hide();
        self.scheduler = None;
    }

    fn is_mounted(&self) -> bool {
        self.scheduler.is_some()
    }

    fn handle_event(&mut self, event: &HostEvent) {
        if let (HostEvent::ViewportEnter, Some(scheduler)) = (event, &self.scheduler) {
            if self.entrance.start(scheduler) {
                tracing::trace!(delay = self.entrance.delay(), "fade in started");
            }
        }
    }
}

// ============================================================================
// StaggerContainer
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaggerOptions {
    /// Delay before the first child (seconds)
    pub base_delay: f32,
    /// Extra delay per child (seconds)
    pub step: f32,
    /// Entrance used by every child
    pub item: FadeInOptions,
}

impl Default for StaggerOptions {
    fn default() -> Self {
        Self {
            base_delay: 0.0,
            step: 0.1,
            item: FadeInOptions::default(),
        }
    }
}

/// Reveals its children one after another
pub struct StaggerContainer {
    options: StaggerOptions,
    items: Vec<EntranceAnimation>,
    sequencer: Option<StaggerSequencer>,
}

impl StaggerContainer {
    /// A container with `count` children
    pub fn new(options: StaggerOptions, count: usize) -> Result<Self> {
        let mut container = Self {
            options,
            items: Vec::with_capacity(count),
            sequencer: None,
        };
        for _ in 0..count {
            container.push_item()?;
        }
        Ok(container)
    }

    /// Append a child and return its index
    pub fn push_item(&mut self) -> Result<usize> {
        let entrance = self.options.item.entrance()?;
        if let Some(sequencer) = &mut self.sequencer {
            sequencer.push(entrance.clone());
        }
        self.items.push(entrance);
        Ok(self.items.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[EntranceAnimation] {
        &self.items
    }

    /// Delays assigned so far; empty until mounted
    pub fn delays(&self) -> Vec<f32> {
        self.sequencer
            .as_ref()
            .map(StaggerSequencer::delays)
            .unwrap_or_default()
    }

    pub fn is_triggered(&self) -> bool {
        self.sequencer
            .as_ref()
            .is_some_and(StaggerSequencer::is_triggered)
    }

    pub fn item_styles(&self) -> Vec<EntranceStyle> {
        self.items.iter().map(|item| item.frame().into()).collect()
    }
}

impl Component for StaggerContainer {
    fn mount(&mut self, scheduler: &FrameScheduler) -> Result<()> {
        if self.sequencer.is_some() {
            return Ok(());
        }

        let mut sequencer =
            StaggerSequencer::new(scheduler, self.options.base_delay, self.options.step)?;
        for item in &self.items {
            sequencer.push(item.clone());
        }
        self.sequencer = Some(sequencer);
        Ok(())
    }

    fn unmount(&mut self) {
        if let Some(mut sequencer) = self.sequencer.take() {
            sequencer.reset();
        }
    }

    fn is_mounted(&self) -> bool {
        self.sequencer.is_some()
    }

    fn handle_event(&mut self, event: &HostEvent) {
        if !matches!(event, HostEvent::ViewportEnter) {
            return;
        }
        if let Some(sequencer) = &mut self.sequencer {
            sequencer.trigger();
        }
    }
}
