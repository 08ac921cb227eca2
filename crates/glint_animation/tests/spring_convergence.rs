//! Convergence behaviour of springs, filters and staggered entrances

use glint_animation::{
    EntranceAnimation, FrameScheduler, Spring, SpringConfig, SpringFilter, StaggerSequencer,
};
use glint_core::MotionValue;

const DT: f32 = 1.0 / 60.0;

fn trajectory(config: SpringConfig, from: f32, to: f32, frames: usize, dt: f32) -> Vec<f32> {
    let mut spring = Spring::new(config, from);
    spring.set_target(to);
    (0..frames)
        .map(|_| {
            spring.step(dt);
            spring.value()
        })
        .collect()
}

#[test]
fn overdamped_spring_approaches_monotonically() {
    let config = SpringConfig::new(100.0, 30.0, 1.0).unwrap();
    assert!(config.damping_ratio() > 1.0);

    let positions = trajectory(config, 0.0, 1.0, 600, DT);
    for pair in positions.windows(2) {
        assert!(pair[1] + 1e-6 >= pair[0], "moved backwards: {pair:?}");
        assert!(pair[1] <= 1.0 + 1e-4, "overshot: {}", pair[1]);
    }
    assert!((positions[positions.len() - 1] - 1.0).abs() < 1e-3);
}

#[test]
fn underdamped_spring_stays_inside_decaying_envelope() {
    let config = SpringConfig::wobbly();
    assert!(config.damping_ratio() < 1.0);

    let positions = trajectory(config, 0.0, 1.0, 900, DT);
    let errors: Vec<f32> = positions.iter().map(|p| (p - 1.0).abs()).collect();

    // Never further than where it started
    assert!(errors.iter().all(|e| *e <= 1.0 + 1e-4));

    // Successive swing peaks shrink (ignoring float noise near the target)
    let peaks: Vec<f32> = errors
        .windows(3)
        .filter(|w| w[1] > 1e-4 && w[1] > w[0] && w[1] >= w[2])
        .map(|w| w[1])
        .collect();
    assert!(peaks.len() >= 2, "expected oscillation, got {peaks:?}");
    for pair in peaks.windows(2) {
        assert!(pair[1] < pair[0], "peaks grew: {pair:?}");
    }

    assert!(errors[errors.len() - 1] < 1e-3);
}

#[test]
fn every_preset_converges_at_common_frame_rates() {
    let presets = [
        SpringConfig::tilt(),
        SpringConfig::hover(),
        SpringConfig::drift(),
        SpringConfig::stiff(),
        SpringConfig::snappy(),
        SpringConfig::gentle(),
        SpringConfig::wobbly(),
    ];

    for config in presets {
        for dt in [1.0 / 30.0, 1.0 / 60.0, 1.0 / 120.0] {
            // The drift preset takes tens of seconds to close in
            let frames = (80.0 / dt) as usize;
            let positions = trajectory(config, 0.0, 1.0, frames, dt);
            let last = positions[positions.len() - 1];
            assert!(
                positions.iter().all(|p| p.is_finite()),
                "{config:?} diverged at dt={dt}"
            );
            assert!((last - 1.0).abs() < 0.01, "{config:?} ended at {last} (dt={dt})");
        }
    }
}

#[test]
fn filter_settles_and_scheduler_idles() {
    let scheduler = FrameScheduler::new();
    let target = MotionValue::new(0.0);
    let filter = SpringFilter::new(&scheduler, &target, SpringConfig::tilt()).unwrap();

    target.set(-0.5);
    let frames = scheduler.run_until_idle(DT, 10_000);

    assert!(frames < 10_000);
    assert_eq!(filter.position(), -0.5);
    assert_eq!(scheduler.live_count(), 0);

    // Idle scheduler issues no ticks
    let before = scheduler.frame_count();
    scheduler.tick(DT);
    assert_eq!(scheduler.frame_count(), before);
}

#[test]
fn filter_settles_on_large_targets() {
    for goal in [1.0e4, 1.0e5, -1.0e5, 1.0e6] {
        let scheduler = FrameScheduler::new();
        let target = MotionValue::new(0.0);
        let filter = SpringFilter::new(&scheduler, &target, SpringConfig::tilt()).unwrap();

        target.set(goal);
        let frames = scheduler.run_until_idle(DT, 100_000);

        assert!(frames < 600, "target {goal} still moving after {frames} frames");
        assert!(!scheduler.is_running());
        assert_eq!(filter.position(), goal);
        assert_eq!(filter.velocity(), 0.0);
    }
}

#[test]
fn stagger_delays_are_non_decreasing() {
    let scheduler = FrameScheduler::new();

    for step in [0.0, 0.05, 0.1] {
        let mut sequencer = StaggerSequencer::new(&scheduler, 0.2, step).unwrap();
        for _ in 0..8 {
            sequencer.push(EntranceAnimation::fade_up(0.3, 20.0).unwrap());
        }
        sequencer.trigger();

        let delays = sequencer.delays();
        assert_eq!(delays[0], 0.2);
        for pair in delays.windows(2) {
            if step > 0.0 {
                assert!(pair[1] > pair[0]);
            } else {
                assert_eq!(pair[1], pair[0]);
            }
        }
        sequencer.reset();
    }
    assert!(!scheduler.is_running());
}

#[test]
fn staggered_entrances_all_complete() {
    let scheduler = FrameScheduler::new();
    let mut sequencer = StaggerSequencer::new(&scheduler, 0.0, 0.1).unwrap();
    for _ in 0..3 {
        sequencer.push(EntranceAnimation::fade_up(0.5, 20.0).unwrap());
    }

    sequencer.trigger();
    scheduler.run_until_idle(DT, 1000);

    assert!(sequencer.is_complete());
    for item in sequencer.items() {
        assert_eq!(item.opacity().get(), 1.0);
        assert_eq!(item.translate_y().get(), 0.0);
    }
}
