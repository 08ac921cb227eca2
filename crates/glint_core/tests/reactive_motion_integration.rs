//! Integration tests for motion values + derived values + the animation system
//!
//! These tests verify that:
//! - Host pointer events drive motion values
//! - Spring filters chase those values and derived values follow the springs
//! - Derived values never observe a half-updated set of inputs
//! - Tearing down filters and derived values leaves nothing subscribed

use glint_animation::{FrameScheduler, SpringConfig, SpringFilter};
use glint_core::{DerivedValue, HostEvent, MotionValue, Point2, RangeMap};
use std::cell::RefCell;
use std::rc::Rc;

const DT: f32 = 1.0 / 60.0;

/// Pointer events flow through springs into a tilt transform
#[test]
fn test_pointer_event_drives_tilt_through_springs() {
    let scheduler = FrameScheduler::new();
    let mouse_x = MotionValue::new(0.0);
    let mouse_y = MotionValue::new(0.0);
    let spring_x = SpringFilter::new(&scheduler, &mouse_x, SpringConfig::tilt()).unwrap();
    let spring_y = SpringFilter::new(&scheduler, &mouse_y, SpringConfig::tilt()).unwrap();

    let rotate_x = DerivedValue::remap(spring_y.output(), RangeMap::new([-0.5, 0.5], [4.0, -4.0]));
    let rotate_y = DerivedValue::remap(spring_x.output(), RangeMap::new([-0.5, 0.5], [-4.0, 4.0]));

    // Top-right corner of a 200x100 element
    let sample = HostEvent::pointer_move(200.0, 0.0, 200.0, 100.0)
        .pointer_sample()
        .unwrap();
    mouse_x.set(sample.x);
    mouse_y.set(sample.y);

    // Springs lag behind the pointer
    scheduler.tick(DT);
    assert!(rotate_x.get() > 0.0 && rotate_x.get() < 4.0);

    scheduler.run_until_idle(DT, 2000);
    assert_eq!(rotate_x.get(), 4.0);
    assert_eq!(rotate_y.get(), 4.0);
}

/// A composite derived value sees both inputs from the same tick
#[test]
fn test_composite_reads_are_consistent() {
    let scheduler = FrameScheduler::new();
    let target_x = MotionValue::new(0.0);
    let target_y = MotionValue::new(0.0);
    let x = SpringFilter::new(&scheduler, &target_x, SpringConfig::tilt()).unwrap();
    let y = SpringFilter::new(&scheduler, &target_y, SpringConfig::tilt()).unwrap();

    let centre = DerivedValue::combine(&[x.output().clone(), y.output().clone()], |v| {
        Point2::new(50.0 + v[0] * 80.0, 50.0 + v[1] * 80.0)
    });

    // Both targets move together; springs share a config so they stay in step
    target_x.set(0.5);
    target_y.set(0.5);
    for _ in 0..20 {
        scheduler.tick(DT);
        let point = centre.get();
        assert_eq!(point.x, point.y);
    }
}

/// Recomputation happens on read, not on every input notification
#[test]
fn test_derived_value_recomputes_lazily() {
    let source = MotionValue::new(0.0);
    let calls = Rc::new(RefCell::new(0));
    let calls_clone = calls.clone();
    let doubled = DerivedValue::new(&[source.clone()], move |v| {
        *calls_clone.borrow_mut() += 1;
        v[0] * 2.0
    });

    for i in 0..10 {
        source.set(i as f32);
    }
    assert_eq!(*calls.borrow(), 0);

    assert_eq!(doubled.get(), 18.0);
    assert_eq!(doubled.get(), 18.0);
    assert_eq!(*calls.borrow(), 1);
}

/// Dropping filters and derived values releases every subscription
#[test]
fn test_teardown_releases_subscriptions() {
    let scheduler = FrameScheduler::new();
    let pointer = MotionValue::new(0.0);

    {
        let filter = SpringFilter::new(&scheduler, &pointer, SpringConfig::hover()).unwrap();
        let _scale = DerivedValue::remap(filter.output(), RangeMap::new([0.0, 1.0], [1.0, 1.01]));
        let _raw = DerivedValue::remap(&pointer, RangeMap::new([0.0, 1.0], [0.0, 100.0]));
        assert_eq!(pointer.subscriber_count(), 2);
        pointer.set(1.0);
        scheduler.tick(DT);
    }

    assert_eq!(pointer.subscriber_count(), 0);
    assert_eq!(scheduler.live_count(), 0);
    pointer.set(0.0);
    assert!(!scheduler.is_running());
}

/// Resetting the pointer returns the tilt to neutral
#[test]
fn test_pointer_leave_returns_to_centre() {
    let scheduler = FrameScheduler::new();
    let mouse_x = MotionValue::new(0.0);
    let spring_x = SpringFilter::new(&scheduler, &mouse_x, SpringConfig::tilt()).unwrap();
    let rotate_y = DerivedValue::remap(spring_x.output(), RangeMap::new([-0.5, 0.5], [-4.0, 4.0]));

    mouse_x.set(0.5);
    scheduler.run_until_idle(DT, 2000);
    assert_eq!(rotate_y.get(), 4.0);

    mouse_x.set(0.0);
    scheduler.run_until_idle(DT, 2000);
    assert_eq!(rotate_y.get(), 0.0);
}
