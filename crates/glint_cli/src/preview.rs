//! Headless component preview
//!
//! Mounts one component on a fresh scheduler, plays a scripted sequence of
//! host events against it on a synthetic clock, and writes the component's
//! style after every frame as one JSON object per line.

use anyhow::{Context, Result};
use clap::ValueEnum;
use glint_animation::FrameScheduler;
use glint_core::HostEvent;
use glint_widgets::{AnimatedGradient, Component, FloatingOrbs, GlowCard, StaggerContainer};
use serde::Serialize;
use std::f32::consts::TAU;
use std::io::Write;

use crate::config::GlintConfig;

/// Component to preview
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scene {
    /// Glow card following a pointer orbit, then released
    Card,
    /// Drifting mesh gradient
    Gradient,
    /// Floating background orbs
    Orbs,
    /// Staggered reveal of a list
    Stagger,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewSettings {
    pub frames: usize,
    pub fps: u32,
    /// Element size for pointer events (px)
    pub width: f32,
    pub height: f32,
}

impl PreviewSettings {
    pub fn from_config(config: &GlintConfig) -> Self {
        Self {
            frames: config.preview.frames,
            fps: config.preview.fps,
            width: config.preview.width,
            height: config.preview.height,
        }
    }

    fn dt(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }
}

/// Outcome of a preview run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreviewSummary {
    pub frames: usize,
    /// Tickables still registered after the last frame
    pub live_at_end: usize,
    /// Tick failures across all frames
    pub failed: usize,
    /// Tickables left behind after unmount
    pub leaked: usize,
}

#[derive(Serialize)]
struct FrameSample<'a, S> {
    frame: usize,
    time: f32,
    live: usize,
    style: &'a S,
}

/// Run `scene` and write one JSON line per frame to `out`
pub fn run(
    scene: Scene,
    config: &GlintConfig,
    settings: PreviewSettings,
    out: &mut dyn Write,
) -> Result<PreviewSummary> {
    let scheduler = FrameScheduler::new();
    tracing::debug!(?scene, frames = settings.frames, fps = settings.fps, "starting preview");

    match scene {
        Scene::Card => {
            let mut card = GlowCard::new(config.card).context("Invalid [card] options")?;
            drive(
                &scheduler,
                settings,
                &mut card,
                |frame| pointer_orbit(frame, settings),
                GlowCard::style,
                out,
            )
        }
        Scene::Gradient => {
            let mut gradient =
                AnimatedGradient::new(config.gradient).context("Invalid [gradient] options")?;
            drive(
                &scheduler,
                settings,
                &mut gradient,
                |_| Vec::new(),
                AnimatedGradient::style,
                out,
            )
        }
        Scene::Orbs => {
            let mut orbs = FloatingOrbs::default();
            drive(&scheduler, settings, &mut orbs, |_| Vec::new(), FloatingOrbs::styles, out)
        }
        Scene::Stagger => {
            let mut container =
                StaggerContainer::new(config.stagger.options(), config.stagger.items)
                    .context("Invalid [stagger] options")?;
            drive(
                &scheduler,
                settings,
                &mut container,
                |frame| {
                    if frame == 0 {
                        vec![HostEvent::ViewportEnter]
                    } else {
                        Vec::new()
                    }
                },
                StaggerContainer::item_styles,
                out,
            )
        }
    }
}

/// Pointer enters, circles the card for two thirds of the run, then leaves
fn pointer_orbit(frame: usize, settings: PreviewSettings) -> Vec<HostEvent> {
    let orbit_frames = (settings.frames * 2 / 3).max(1);
    if frame > orbit_frames {
        return Vec::new();
    }
    if frame == orbit_frames {
        return vec![HostEvent::PointerLeave];
    }

    let angle = TAU * frame as f32 / orbit_frames as f32;
    let (w, h) = (settings.width, settings.height);
    let pointer = HostEvent::pointer_move(
        w * 0.5 * (1.0 + 0.9 * angle.cos()),
        h * 0.5 * (1.0 + 0.9 * angle.sin()),
        w,
        h,
    );

    if frame == 0 {
        vec![HostEvent::PointerEnter, pointer]
    } else {
        vec![pointer]
    }
}

fn drive<C, S>(
    scheduler: &FrameScheduler,
    settings: PreviewSettings,
    component: &mut C,
    script: impl Fn(usize) -> Vec<HostEvent>,
    style: impl Fn(&C) -> S,
    out: &mut dyn Write,
) -> Result<PreviewSummary>
where
    C: Component,
    S: Serialize,
{
    component
        .dispatch(scheduler, &HostEvent::Mount)
        .context("Failed to mount component")?;

    let dt = settings.dt();
    let mut summary = PreviewSummary {
        frames: settings.frames,
        ..PreviewSummary::default()
    };

    for frame in 0..settings.frames {
        for event in script(frame) {
            component.dispatch(scheduler, &event)?;
        }

        let report = scheduler.tick(dt);
        summary.failed += report.failed;

        let current = style(component);
        let sample = FrameSample {
            frame,
            time: (frame + 1) as f32 * dt,
            live: scheduler.live_count(),
            style: &current,
        };
        serde_json::to_writer(&mut *out, &sample).context("Failed to encode frame")?;
        writeln!(out).context("Failed to write frame")?;
    }

    summary.live_at_end = scheduler.live_count();
    component.dispatch(scheduler, &HostEvent::Unmount)?;
    summary.leaked = scheduler.live_count();
    Ok(summary)
}
